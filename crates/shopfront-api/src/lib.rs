//! # shopfront-api
//!
//! HTTP layer for Shopfront built on Axum.
//!
//! Provides the session middleware (the request-lifecycle hook that
//! resolves the visitor identity, opens the session, saves it exactly once
//! after the handler, and issues the token cookie), the session extractor,
//! the cart/health endpoints, and error mapping.

pub mod app;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use router::build_router;
pub use state::AppState;
