use crate::models::FavoriteItem;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex, OnceCell};
use tracing::{debug, error, warn};

use super::KeyValueStore;

/// Storage key holding the JSON array of favorites.
pub const FAVORITES_KEY: &str = "@postdeck:favorites";

/// Lifecycle of the initial load. Moves forward once and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Uninitialized,
    Loading,
    Ready,
}

/// What subscribers see: the collection plus where the initial load stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesSnapshot {
    pub items: Vec<FavoriteItem>,
    pub phase: LoadPhase,
}

/// Deduplicated, write-through collection of favorite posts.
///
/// One instance is shared (behind an `Arc`) by every screen. Reads come from
/// the in-memory snapshot; each mutation publishes the new snapshot and then
/// writes the complete collection to the key-value store.
pub struct FavoritesStore {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    state: watch::Sender<FavoritesSnapshot>,
    loaded: OnceCell<()>,
    write_gate: Mutex<()>,
}

impl FavoritesStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(storage, FAVORITES_KEY)
    }

    pub fn with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let (state, _) = watch::channel(FavoritesSnapshot::default());
        Self {
            storage,
            key: key.into(),
            state,
            loaded: OnceCell::new(),
            write_gate: Mutex::new(()),
        }
    }

    /// Populate the collection from storage.
    ///
    /// Only the first call reads storage; concurrent and later calls wait for
    /// it to settle. Missing, corrupt or unreadable data leaves the store empty.
    pub async fn load(&self) {
        self.loaded
            .get_or_init(|| async {
                self.state.send_modify(|s| s.phase = LoadPhase::Loading);
                let items = self.read_from_storage().await;
                debug!(count = items.len(), "favorites loaded");
                self.state.send_modify(|s| {
                    s.items = items;
                    s.phase = LoadPhase::Ready;
                });
            })
            .await;
    }

    async fn read_from_storage(&self) -> Vec<FavoriteItem> {
        match self.storage.get(&self.key).await {
            Ok(None) => Vec::new(),
            Ok(Some(raw)) => match decode_favorites(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "resetting favorites");
                    Vec::new()
                }
            },
            Err(e) => {
                error!(key = %self.key, error = %e, "failed to read favorites");
                Vec::new()
            }
        }
    }

    /// Append `item` unless its id is already present. Returns whether the
    /// collection changed.
    pub async fn add(&self, item: FavoriteItem) -> bool {
        self.load().await;
        let _gate = self.write_gate.lock().await;

        let mut next = None;
        self.state.send_if_modified(|s| {
            if s.items.iter().any(|f| f.id == item.id) {
                return false;
            }
            s.items.push(item.clone());
            next = Some(s.items.clone());
            true
        });

        match next {
            Some(items) => {
                self.persist(&items).await;
                true
            }
            None => false,
        }
    }

    /// Drop the favorite with `id`. Returns whether the collection changed.
    pub async fn remove(&self, id: i64) -> bool {
        self.load().await;
        let _gate = self.write_gate.lock().await;

        let mut next = None;
        self.state.send_if_modified(|s| {
            let before = s.items.len();
            s.items.retain(|f| f.id != id);
            if s.items.len() == before {
                return false;
            }
            next = Some(s.items.clone());
            true
        });

        match next {
            Some(items) => {
                self.persist(&items).await;
                true
            }
            None => false,
        }
    }

    // Memory is not rolled back on failure; the next successful write resyncs.
    async fn persist(&self, items: &[FavoriteItem]) {
        let payload = match serde_json::to_string(items) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to encode favorites");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &payload).await {
            error!(key = %self.key, error = %e, "failed to save favorites");
        }
    }

    pub fn is_favorite(&self, id: i64) -> bool {
        self.state.borrow().items.iter().any(|f| f.id == id)
    }

    pub fn favorites(&self) -> Vec<FavoriteItem> {
        self.state.borrow().items.clone()
    }

    pub fn snapshot(&self) -> FavoritesSnapshot {
        self.state.borrow().clone()
    }

    pub fn phase(&self) -> LoadPhase {
        self.state.borrow().phase
    }

    /// True until the initial load has settled
    pub fn is_loading(&self) -> bool {
        self.phase() != LoadPhase::Ready
    }

    /// Receive every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<FavoritesSnapshot> {
        self.state.subscribe()
    }
}

/// Parse a stored payload, keeping the first entry for any repeated id.
fn decode_favorites(raw: &str) -> Result<Vec<FavoriteItem>> {
    let items: Vec<FavoriteItem> =
        serde_json::from_str(raw).map_err(|e| Error::StorageCorrupt(e.to_string()))?;

    let mut seen = HashSet::new();
    Ok(items.into_iter().filter(|f| seen.insert(f.id)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryKvStore, SqliteKvStore};
    use tempfile::tempdir;

    async fn loaded_store() -> (Arc<MemoryKvStore>, FavoritesStore) {
        let kv = Arc::new(MemoryKvStore::new());
        let store = FavoritesStore::new(kv.clone());
        store.load().await;
        (kv, store)
    }

    #[tokio::test]
    async fn test_load_without_entry() {
        let (_kv, store) = loaded_store().await;
        assert!(store.favorites().is_empty());
        assert!(!store.is_loading());
        assert_eq!(store.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_loading_until_load_settles() {
        let store = FavoritesStore::new(Arc::new(MemoryKvStore::new()));
        assert_eq!(store.phase(), LoadPhase::Uninitialized);
        assert!(store.is_loading());

        store.load().await;
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_load_existing_entry() {
        let kv = Arc::new(MemoryKvStore::with_entry(
            FAVORITES_KEY,
            r#"[{"id":1,"title":"One"},{"id":2,"title":"Two"}]"#,
        ));
        let store = FavoritesStore::new(kv);
        store.load().await;

        assert_eq!(
            store.favorites(),
            vec![FavoriteItem::new(1, "One"), FavoriteItem::new(2, "Two")]
        );
    }

    #[tokio::test]
    async fn test_load_object_payload_resets_to_empty() {
        let kv = Arc::new(MemoryKvStore::with_entry(FAVORITES_KEY, r#"{"id":1,"title":"One"}"#));
        let store = FavoritesStore::new(kv);
        store.load().await;

        assert!(store.favorites().is_empty());
        assert_eq!(store.phase(), LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_load_garbage_payload_resets_to_empty() {
        let kv = Arc::new(MemoryKvStore::with_entry(FAVORITES_KEY, "not json at all"));
        let store = FavoritesStore::new(kv);
        store.load().await;

        assert!(store.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_load_read_failure_resets_to_empty() {
        let kv = Arc::new(MemoryKvStore::with_entry(FAVORITES_KEY, r#"[{"id":1,"title":"One"}]"#));
        kv.set_fail_reads(true);
        let store = FavoritesStore::new(kv.clone());
        store.load().await;

        assert!(store.favorites().is_empty());
        assert_eq!(store.phase(), LoadPhase::Ready);
        assert!(!store.is_loading());

        // Loading never writes, so the unreadable entry is left alone
        kv.set_fail_reads(false);
        assert_eq!(
            kv.get(FAVORITES_KEY).await.unwrap().as_deref(),
            Some(r#"[{"id":1,"title":"One"}]"#)
        );
    }

    #[tokio::test]
    async fn test_load_drops_duplicate_ids() {
        let kv = Arc::new(MemoryKvStore::with_entry(
            FAVORITES_KEY,
            r#"[{"id":4,"title":"First"},{"id":4,"title":"Again"}]"#,
        ));
        let store = FavoritesStore::new(kv);
        store.load().await;

        assert_eq!(store.favorites(), vec![FavoriteItem::new(4, "First")]);
    }

    #[tokio::test]
    async fn test_load_runs_once() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = FavoritesStore::new(kv.clone());
        store.load().await;

        // A value written behind the store's back is not picked up again
        kv.set(FAVORITES_KEY, r#"[{"id":9,"title":"Late"}]"#).await.unwrap();
        store.load().await;

        assert!(store.favorites().is_empty());
    }

    #[tokio::test]
    async fn test_add_then_is_favorite() {
        let (_kv, store) = loaded_store().await;

        assert!(store.add(FavoriteItem::new(5, "X")).await);
        assert!(store.is_favorite(5));
        assert!(!store.is_favorite(6));
    }

    #[tokio::test]
    async fn test_add_is_idempotent() {
        let (_kv, store) = loaded_store().await;

        assert!(store.add(FavoriteItem::new(5, "X")).await);
        assert!(!store.add(FavoriteItem::new(5, "X")).await);
        assert!(!store.add(FavoriteItem::new(5, "Renamed")).await);

        assert_eq!(store.favorites(), vec![FavoriteItem::new(5, "X")]);
    }

    #[tokio::test]
    async fn test_remove_then_is_favorite() {
        let (_kv, store) = loaded_store().await;

        store.add(FavoriteItem::new(5, "X")).await;
        assert!(store.remove(5).await);
        assert!(!store.is_favorite(5));
        assert!(!store.remove(5).await);
    }

    #[tokio::test]
    async fn test_mutations_write_through() {
        let (kv, store) = loaded_store().await;

        store.add(FavoriteItem::new(1, "One")).await;
        store.add(FavoriteItem::new(2, "Two")).await;
        store.remove(1).await;

        let raw = kv.get(FAVORITES_KEY).await.unwrap().unwrap();
        assert_eq!(raw, r#"[{"id":2,"title":"Two"}]"#);
    }

    #[tokio::test]
    async fn test_noop_remove_does_not_write() {
        let (kv, store) = loaded_store().await;

        store.remove(42).await;
        assert_eq!(kv.get(FAVORITES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_mixed_sequence_keeps_ids_unique() {
        let (_kv, store) = loaded_store().await;

        let ops: [(bool, i64); 10] = [
            (true, 1), (true, 2), (true, 1), (false, 2), (true, 3),
            (true, 2), (true, 3), (false, 9), (true, 1), (true, 2),
        ];
        for (is_add, id) in ops {
            if is_add {
                store.add(FavoriteItem::new(id, format!("post {}", id))).await;
            } else {
                store.remove(id).await;
            }
        }

        let ids: Vec<i64> = store.favorites().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[tokio::test]
    async fn test_add_before_load_keeps_stored_items() {
        let kv = Arc::new(MemoryKvStore::with_entry(FAVORITES_KEY, r#"[{"id":1,"title":"One"}]"#));
        let store = FavoritesStore::new(kv.clone());

        store.add(FavoriteItem::new(2, "Two")).await;

        assert_eq!(
            store.favorites(),
            vec![FavoriteItem::new(1, "One"), FavoriteItem::new(2, "Two")]
        );
    }

    #[tokio::test]
    async fn test_write_failure_keeps_memory() {
        let (kv, store) = loaded_store().await;
        kv.set_fail_writes(true);

        assert!(store.add(FavoriteItem::new(7, "Seven")).await);
        assert!(store.is_favorite(7));
        assert_eq!(kv.get(FAVORITES_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (_kv, store) = loaded_store().await;
        let mut rx = store.subscribe();

        store.add(FavoriteItem::new(3, "Three")).await;

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.items, vec![FavoriteItem::new(3, "Three")]);
        assert_eq!(snapshot.phase, LoadPhase::Ready);
    }

    #[tokio::test]
    async fn test_concurrent_adds_persist_full_collection() {
        let (kv, store) = loaded_store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for id in 1..=8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.add(FavoriteItem::new(id, format!("post {}", id))).await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        let raw = kv.get(FAVORITES_KEY).await.unwrap().unwrap();
        let mut stored: Vec<FavoriteItem> = serde_json::from_str(&raw).unwrap();
        let mut in_memory = store.favorites();
        stored.sort_by_key(|f| f.id);
        in_memory.sort_by_key(|f| f.id);
        assert_eq!(stored.len(), 8);
        assert_eq!(stored, in_memory);
    }

    #[tokio::test]
    async fn test_round_trip_through_sqlite() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("favorites.db");

        {
            let kv = Arc::new(SqliteKvStore::open(&db_path).unwrap());
            let store = FavoritesStore::new(kv);
            store.load().await;
            store.add(FavoriteItem::new(10, "Ten")).await;
            store.add(FavoriteItem::new(11, "Eleven")).await;
        }

        // Simulated restart
        let kv = Arc::new(SqliteKvStore::open(&db_path).unwrap());
        let store = FavoritesStore::new(kv);
        store.load().await;

        assert_eq!(
            store.favorites(),
            vec![FavoriteItem::new(10, "Ten"), FavoriteItem::new(11, "Eleven")]
        );
    }
}
