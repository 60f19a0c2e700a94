use std::collections::BTreeMap;

use axum::routing::MethodRouter;
use axum::Router;

use crate::endpoint::endpoints;
use crate::handler::{self, SharedFacade};

/// Builds the method router for one path.
pub type RouteFactory = fn() -> MethodRouter<SharedFacade>;

/// Route path to route constructor, filled by explicit `register` calls.
///
/// Every registered route is mounted on one router whose state is the single
/// shared facade, so all handlers go through the same store.
#[derive(Clone, Default)]
pub struct RouteRegistry {
    routes: BTreeMap<&'static str, RouteFactory>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The routes Canopy serves out of the box.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register(endpoints::TREES, handler::trees_route)
            .register(endpoints::ANCESTOR, handler::ancestor_route)
            .register(endpoints::HEALTH, handler::health_route)
            .register(endpoints::INFO, handler::info_route);
        registry
    }

    /// Register `factory` for `path`, replacing any earlier registration.
    pub fn register(&mut self, path: &'static str, factory: RouteFactory) -> &mut Self {
        if self.routes.insert(path, factory).is_some() {
            tracing::warn!(path, "route registered twice; keeping the latest");
        }
        self
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.contains_key(path)
    }

    /// Registered paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Mount every route and bind them all to `facade`.
    pub fn into_router(self, facade: SharedFacade) -> Router {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, (path, factory)| {
                tracing::debug!(path, "mounting route");
                router.route(path, factory())
            })
            .with_state(facade)
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.routes.keys()).finish()
    }
}
