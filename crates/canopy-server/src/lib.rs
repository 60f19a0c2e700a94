//! HTTP server for Canopy.
//!
//! Exposes tree creation and ancestor queries over HTTP. Routes come from an
//! explicit [`RouteRegistry`] and all of them share one
//! [`RequestFacade`](canopy_sdk::RequestFacade), and with it one store.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod handler;
pub mod registry;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use endpoint::{endpoints, HealthResponse};
pub use error::{ServerError, ServerResult};
pub use handler::SharedFacade;
pub use registry::{RouteFactory, RouteRegistry};
pub use router::{build_router, build_router_with};
pub use server::CanopyServer;
