//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::services::OrderService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    orders: OrderService,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(config: ServerConfig, orders: OrderService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, orders }),
        }
    }

    /// The loaded server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// The order-placement service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
