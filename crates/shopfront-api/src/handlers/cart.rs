//! Cart handlers — the canonical consumers of the session bag.

use axum::Json;
use axum::http::StatusCode;
use serde_json::Value;

use crate::error::ApiError;
use crate::extractors::session::CurrentSession;

/// Session key holding the cart contents.
const CART_KEY: &str = "cart";

/// GET /api/cart
///
/// Returns the visitor's cart, or `null` when none exists yet — an absent
/// cart is a neutral value, not an error.
pub async fn get_cart(session: CurrentSession) -> Json<Value> {
    Json(session.get(CART_KEY))
}

/// PUT /api/cart
///
/// Replaces the cart with the supplied document. Persisted by the session
/// middleware at the end of the request.
pub async fn update_cart(
    session: CurrentSession,
    Json(cart): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    session.set(CART_KEY, &cart)?;
    Ok(Json(cart))
}

/// DELETE /api/cart
pub async fn clear_cart(session: CurrentSession) -> StatusCode {
    session.delete(CART_KEY);
    StatusCode::NO_CONTENT
}
