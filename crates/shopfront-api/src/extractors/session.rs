//! Session and authenticated-user extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use shopfront_core::error::AppError;
use shopfront_session::store::Session;

use crate::error::ApiError;

/// Inbound host-authentication signal: the verified, stable identifier of
/// the logged-in user. The host's auth layer inserts this as a request
/// extension before the session middleware runs; this crate never performs
/// authentication itself.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub String);

/// Extracts the request's session, opened by the session middleware.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Session);

impl std::ops::Deref for CurrentSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| {
                ApiError(AppError::internal(
                    "Session middleware is not installed on this route",
                ))
            })
    }
}
