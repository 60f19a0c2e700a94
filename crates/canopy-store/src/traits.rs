use canopy_types::TreeId;

use crate::error::StoreResult;

/// Content-addressed tree store.
///
/// All implementations must satisfy these invariants:
/// - The payload is the key: inserting a byte-identical payload again returns
///   the id it was first stored under, and never creates a second record.
/// - Concurrent identical inserts converge on one id.
/// - Stored payloads are immutable and never deleted.
/// - The store never interprets payloads. Validation and canonicalization
///   happen before `insert` is called.
pub trait TreeStore: Send + Sync {
    /// Store `payload` if absent and return the id bound to it.
    fn insert(&self, payload: &str) -> StoreResult<TreeId>;

    /// Return the exact payload stored under `id`.
    ///
    /// Returns `Err(StoreError::NotFound)` if no such id exists.
    fn select(&self, id: TreeId) -> StoreResult<String>;
}
