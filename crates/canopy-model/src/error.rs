//! Error types for the tree model.

use canopy_store::StoreError;

/// Errors that can occur while creating or querying trees.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The submitted (or stored) tree is not a well-formed binary tree.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// A required query field is absent.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// No readable tree is stored under the requested id.
    #[error("tree not found: {0}")]
    TreeNotFound(String),

    /// At least one of the queried values does not occur in the tree.
    #[error("ancestor not found: node_a or node_b is not in the tree")]
    AncestorNotFound,

    /// Storage failed while persisting a tree. The message is opaque.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ModelError {
    /// Whether the caller caused this error and may see its message.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

/// Convenience alias for model results.
pub type ModelResult<T> = Result<T, ModelError>;
