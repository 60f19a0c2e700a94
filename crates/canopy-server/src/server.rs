use std::sync::Arc;

use canopy_sdk::RequestFacade;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::SharedFacade;
use crate::router::build_router;

/// Canopy HTTP server.
pub struct CanopyServer {
    config: ServerConfig,
    facade: SharedFacade,
}

impl CanopyServer {
    pub fn new(config: ServerConfig, facade: RequestFacade) -> Self {
        Self {
            config,
            facade: Arc::new(facade),
        }
    }

    /// Open the configured database and build the server around it.
    ///
    /// A database that cannot be opened is returned as an error; there is
    /// nothing to serve without it.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let facade = RequestFacade::open(&config.db_path)?;
        Ok(Self::new(config, facade))
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn facade(&self) -> &SharedFacade {
        &self.facade
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(Arc::clone(&self.facade), &self.config)
    }

    /// Start serving requests until Ctrl-C.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            addr = %self.config.bind_addr,
            db = %self.config.db_path.display(),
            "Canopy server listening"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
