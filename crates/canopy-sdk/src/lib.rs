//! Request facade for Canopy.
//!
//! Transport code depends on [`RequestFacade`] alone: it creates trees and
//! answers ancestor queries, and owns the store behind them.

pub mod facade;
pub mod response;

pub use facade::RequestFacade;
pub use response::{AncestorResponse, CreateTreeResponse};

// Re-export key types
pub use canopy_model::{AncestorQuery, ModelError, ModelResult};
pub use canopy_store::{StoreError, StoreResult};
pub use canopy_types::{TreeId, TreeNode};
