//! Tree model for Canopy.
//!
//! Validates submitted trees, persists them through a
//! [`TreeStore`](canopy_store::TreeStore) under their canonical form, and
//! resolves lowest common ancestor queries against stored trees.

pub mod ancestor;
pub mod error;
pub mod model;
pub mod query;

pub use ancestor::lowest_common_ancestor;
pub use error::{ModelError, ModelResult};
pub use model::TreeModel;
pub use query::AncestorQuery;
