use crate::config::ServerConfig;
use crate::error::ServerResult;
use std::sync::Arc;
use store::MovieStore;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Store handle, opened once and shared across requests
    pub store: Arc<dyn MovieStore>,
}

impl ServerState {
    /// Open the store named by `config.store` and wrap it into server state.
    pub async fn new(config: ServerConfig) -> ServerResult<Self> {
        let backend = config.store.backend_config();
        let store = backend.build().await?;
        tracing::info!(backend = backend.kind(), "movie store ready");
        Ok(Self::with_store(config, store))
    }

    /// Use an already-built store, e.g. an isolated one per test.
    pub fn with_store(config: ServerConfig, store: Arc<dyn MovieStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
