//! Content-addressed tree storage for Canopy.
//!
//! A stored tree is keyed by its canonical payload: the same payload always
//! maps to the same [`TreeId`](canopy_types::TreeId), and submitting it twice
//! never creates a second record.
//!
//! # Storage Backends
//!
//! All backends implement the [`TreeStore`] trait:
//!
//! - [`SqliteTreeStore`] -- single-connection SQLite database, the durable backend
//! - [`InMemoryTreeStore`] -- `Mutex`-guarded store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Payloads are immutable once written and are never deleted.
//! 2. Uniqueness is enforced by the backend, not by callers checking first.
//! 3. Each backend serializes its operations behind one lock.
//! 4. The store never interprets payloads.
//! 5. Engine diagnostics are logged where they occur and never returned.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryTreeStore;
pub use sqlite::SqliteTreeStore;
pub use traits::TreeStore;
