//! Core of the postdeck news reader: post and favorite models, the favorites
//! store with its persistence adapter, and the content API client.

pub mod content;
pub mod error;
pub mod models;
pub mod storage;
pub mod text;

pub use error::{Error, Result};
