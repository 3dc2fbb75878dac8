//! Route definitions for the Shopfront HTTP API.
//!
//! All routes are mounted under `/api`. Session-scoped routes sit behind
//! the session middleware; the health endpoint stays outside it so probes
//! never mint visitor identities.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{cart, health};
use crate::middleware::session::session_middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route(
            "/cart",
            get(cart::get_cart)
                .put(cart::update_cart)
                .delete(cart::clear_cart),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    let api_routes = session_routes.route("/health", get(health::health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
