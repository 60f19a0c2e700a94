use std::path::PathBuf;

use canopy_types::TreeId;

/// Errors from tree store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No tree is stored under the requested id.
    #[error("tree not found: {0}")]
    NotFound(TreeId),

    /// The database file could not be opened.
    #[error("cannot open tree database at {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// The schema could not be created or a statement could not be prepared.
    #[error("cannot prepare tree database: {0}")]
    Schema(#[source] rusqlite::Error),

    /// A query failed at runtime. Engine detail is logged where the failure
    /// happens and deliberately left out of this error.
    #[error("internal storage error during {operation}")]
    Internal { operation: &'static str },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
