use std::path::Path;
use std::sync::Arc;

use canopy_model::{ModelResult, TreeModel};
use canopy_store::{InMemoryTreeStore, SqliteTreeStore, StoreResult, TreeStore};
use canopy_types::TreeId;
use serde_json::Value;

use crate::response::{AncestorResponse, CreateTreeResponse};

/// Single entry point for transport code.
///
/// Construction wires store, model and facade in that order. One facade (and
/// therefore one store) is meant to be shared by every transport handler in
/// the process; it is `Send + Sync` and cheap to put behind an `Arc`.
pub struct RequestFacade {
    model: TreeModel,
}

impl RequestFacade {
    pub fn new(model: TreeModel) -> Self {
        Self { model }
    }

    /// Facade over an arbitrary store.
    pub fn with_store(store: Arc<dyn TreeStore>) -> Self {
        Self::new(TreeModel::new(store))
    }

    /// Facade over the SQLite database at `path`.
    ///
    /// Open and schema failures are returned unchanged; they mean the
    /// process cannot serve and should stop.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let store = SqliteTreeStore::open(path)?;
        Ok(Self::with_store(Arc::new(store)))
    }

    /// Facade over a fresh in-memory store.
    pub fn in_memory() -> Self {
        Self::with_store(Arc::new(InMemoryTreeStore::new()))
    }

    // ---- Operations ----

    pub fn create_tree(&self, tree: &Value) -> ModelResult<TreeId> {
        self.model.create_new_tree(tree)
    }

    pub fn find_ancestor(&self, query: &Value) -> ModelResult<Value> {
        self.model.lowest_common_ancestor(query)
    }

    // ---- Wire shapes ----

    pub fn create_tree_response(&self, tree: &Value) -> ModelResult<CreateTreeResponse> {
        self.create_tree(tree).map(|id| CreateTreeResponse { id })
    }

    pub fn find_ancestor_response(&self, query: &Value) -> ModelResult<AncestorResponse> {
        self.find_ancestor(query).map(|node| AncestorResponse { node })
    }
}

impl std::fmt::Debug for RequestFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestFacade").finish_non_exhaustive()
    }
}
