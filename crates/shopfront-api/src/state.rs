//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use shopfront_cache::provider::StoreManager;
use shopfront_core::config::AppConfig;
use shopfront_session::identity::IdentityResolver;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Durable-store manager (Redis or in-memory).
    pub store: Arc<StoreManager>,
    /// Visitor identity resolver.
    pub resolver: Arc<IdentityResolver>,
}

impl AppState {
    /// Creates application state from configuration and a store manager.
    pub fn new(config: AppConfig, store: Arc<StoreManager>) -> Self {
        let resolver = Arc::new(IdentityResolver::new(&config.session));
        Self {
            config: Arc::new(config),
            store,
            resolver,
        }
    }
}
