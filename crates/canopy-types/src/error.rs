use thiserror::Error;

/// Errors produced while building or decoding trees.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("node at {path} has no \"node\" value")]
    MissingNode { path: String },

    #[error("expected a JSON object at {path}")]
    NotAnObject { path: String },

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}
