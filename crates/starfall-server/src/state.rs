use std::sync::Arc;

use crate::config::ServerConfig;
use crate::rate_limit::ApiLimits;
use crate::store::ScoreStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ScoreStore>,
    pub limits: Arc<ApiLimits>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let store = ScoreStore::from_config(&config.store);
        Self::with_store(config, store)
    }

    /// Use a prebuilt store instead of the configured one.
    pub fn with_store(config: ServerConfig, store: ScoreStore) -> Self {
        let limits = ApiLimits::new(&config.limits);
        Self {
            store: Arc::new(store),
            limits: Arc::new(limits),
            config: Arc::new(config),
        }
    }
}
