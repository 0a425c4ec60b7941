mod kv_store;
mod favorites_store;

pub use kv_store::{KeyValueStore, MemoryKvStore, SqliteKvStore};
pub use favorites_store::{FavoritesSnapshot, FavoritesStore, LoadPhase, FAVORITES_KEY};
