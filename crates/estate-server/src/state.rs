use crate::config::ServerConfig;
use crate::media::ImageHost;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state, constructed once in `main` and handed to the router
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<ServerConfig>,
    /// `None` when no image hosting credentials are configured
    pub images: Option<Arc<dyn ImageHost>>,
}

impl AppState {
    /// Create a new app state
    pub fn new(pool: PgPool, config: ServerConfig, images: Option<Arc<dyn ImageHost>>) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            images,
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.auth.jwt_secret
    }
}
