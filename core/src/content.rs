mod client;

pub use client::{parse_post_id, ContentClient, ContentSource, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
