//! Foundation types for Canopy.
//!
//! Every other Canopy crate depends on `canopy-types` for the shared
//! vocabulary of the system.
//!
//! # Key Types
//!
//! - [`TreeNode`] — a validated binary tree node carrying a JSON value
//! - [`TreeId`] — integer identifier assigned to a stored tree
//! - [`PayloadDigest`] — BLAKE3 digest of a canonical tree payload

pub mod digest;
pub mod error;
pub mod id;
pub mod node;

pub use digest::PayloadDigest;
pub use error::TypeError;
pub use id::TreeId;
pub use node::TreeNode;
