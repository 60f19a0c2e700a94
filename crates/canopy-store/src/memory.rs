use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use canopy_types::{PayloadDigest, TreeId};

use crate::error::{StoreError, StoreResult};
use crate::traits::TreeStore;

/// In-memory tree store.
///
/// Intended for tests and embedding. Payloads are kept in insertion order so
/// that ids are assigned from 1 like the SQLite backend; a digest index
/// provides the payload uniqueness constraint.
pub struct InMemoryTreeStore {
    tables: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    payloads: Vec<String>,
    index: HashMap<PayloadDigest, TreeId>,
}

impl InMemoryTreeStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Number of trees currently stored.
    pub fn len(&self) -> usize {
        self.lock().payloads.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().payloads.is_empty()
    }

    // Poisoning is recovered. `insert` stores the payload before indexing it,
    // so an interrupted insert can leave an unindexed payload but never an
    // indexed id without one.
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryTreeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeStore for InMemoryTreeStore {
    fn insert(&self, payload: &str) -> StoreResult<TreeId> {
        let digest = PayloadDigest::of(payload);
        let mut tables = self.lock();
        if let Some(id) = tables.index.get(&digest) {
            return Ok(*id);
        }
        tables.payloads.push(payload.to_string());
        let id = TreeId::new(tables.payloads.len() as i64);
        tables.index.insert(digest, id);
        tracing::debug!(%id, digest = %digest.short_hex(), bytes = payload.len(), "stored tree");
        Ok(id)
    }

    fn select(&self, id: TreeId) -> StoreResult<String> {
        let tables = self.lock();
        usize::try_from(id.get())
            .ok()
            .and_then(|raw| raw.checked_sub(1))
            .and_then(|slot| tables.payloads.get(slot))
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }
}

impl std::fmt::Debug for InMemoryTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryTreeStore")
            .field("tree_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn new_store_is_empty() {
        let store = InMemoryTreeStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn ids_start_at_one() {
        let store = InMemoryTreeStore::new();
        assert_eq!(store.insert(r#"{"node":1}"#).unwrap(), TreeId::new(1));
        assert_eq!(store.insert(r#"{"node":2}"#).unwrap(), TreeId::new(2));
    }

    #[test]
    fn insert_and_select() {
        let store = InMemoryTreeStore::new();
        let id = store.insert("Testing").unwrap();
        assert_eq!(store.select(id).unwrap(), "Testing");
    }

    #[test]
    fn duplicate_insert_returns_existing_id() {
        let store = InMemoryTreeStore::new();
        let first = store.insert("Testing").unwrap();
        let second = store.insert("Testing").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn select_unknown_id_is_not_found() {
        let store = InMemoryTreeStore::new();
        store.insert("Testing").unwrap();
        for raw in [0, -1, 2, i64::MAX] {
            let err = store.select(TreeId::new(raw)).unwrap_err();
            assert!(matches!(err, StoreError::NotFound(id) if id == TreeId::new(raw)));
        }
    }

    #[test]
    fn concurrent_identical_inserts_converge() {
        let store = Arc::new(InMemoryTreeStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.insert(r#"{"node":"shared"}"#).unwrap())
            })
            .collect();
        let ids: Vec<TreeId> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn poisoned_lock_keeps_serving() {
        let store = Arc::new(InMemoryTreeStore::new());
        let id = store.insert("before").unwrap();

        let poisoner = Arc::clone(&store);
        let result = thread::spawn(move || {
            let _guard = poisoner.tables.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(result.is_err());
        assert!(store.tables.is_poisoned());

        assert_eq!(store.select(id).unwrap(), "before");
        assert_eq!(store.insert("before").unwrap(), id);
        assert_eq!(store.insert("after").unwrap(), TreeId::new(2));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn debug_shows_count() {
        let store = InMemoryTreeStore::new();
        store.insert("a").unwrap();
        assert!(format!("{store:?}").contains("tree_count: 1"));
    }
}
