use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handler::SharedFacade;
use crate::registry::RouteRegistry;

/// Build the axum router with all standard Canopy endpoints.
pub fn build_router(facade: SharedFacade, config: &ServerConfig) -> Router {
    build_router_with(RouteRegistry::standard(), facade, config)
}

/// Build a router from an explicit registry.
pub fn build_router_with(registry: RouteRegistry, facade: SharedFacade, config: &ServerConfig) -> Router {
    registry
        .into_router(facade)
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .layer(TraceLayer::new_for_http())
}
