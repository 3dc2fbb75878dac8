//! Session lifecycle middleware.
//!
//! The request-lifecycle hook around every routed request:
//!
//! 1. resolve the session identity (authenticated signal, else verified
//!    cookie token, else a freshly minted identity),
//! 2. open the session from the durable store and expose it to handlers
//!    via a request extension,
//! 3. run the inner service,
//! 4. save the session snapshot once, whatever the handler's outcome,
//! 5. attach the `Set-Cookie` header when a new token was issued.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::warn;

use shopfront_core::traits::store::TransientStore;
use shopfront_session::cookie::{SessionCookie, cookie_name};
use shopfront_session::identity::RequestContext;
use shopfront_session::store::Session;

use crate::extractors::session::AuthenticatedUser;
use crate::state::AppState;

/// Resolves the visitor identity, opens the session for the request, and
/// flushes it back to durable storage after the inner service completes.
///
/// Saving happens here, after `next.run`, so it covers every exit path of
/// the handler — normal completion, error response, redirect.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let authenticated = request.extensions().get::<AuthenticatedUser>().cloned();
    let name = cookie_name(&state.config.session);
    let token = jar.get(&name).map(|c| c.value().to_string());

    let ctx = RequestContext {
        authenticated_user: authenticated.as_ref().map(|u| u.0.as_str()),
        token: token.as_deref(),
    };
    let resolution = state.resolver.resolve(&ctx);

    let store: Arc<dyn TransientStore> = state.store.clone();
    let ttl = Duration::from_secs(state.config.session.ttl_seconds);
    let session = Session::open(store, resolution.identity, ttl).await;

    request.extensions_mut().insert(session.clone());
    let response = next.run(request).await;

    // Best-effort: session data is soft state, reconstructible as empty on
    // the next read, so a failed save never fails the request.
    if let Err(e) = session.save().await {
        warn!(identity = %session.identity(), error = %e, "Session save failed");
    }

    match resolution.issued {
        Some(issued) => {
            let cookie = build_cookie(SessionCookie::issue(&state.config.session, &issued));
            (jar.add(cookie), response).into_response()
        }
        None => response,
    }
}

/// Renders the framework-agnostic cookie descriptor as an actual cookie.
fn build_cookie(spec: SessionCookie) -> Cookie<'static> {
    let mut builder = Cookie::build((spec.name, spec.value))
        .path(spec.path)
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(spec.secure)
        .max_age(time::Duration::seconds(spec.max_age_seconds as i64));

    if let Some(domain) = spec.domain {
        builder = builder.domain(domain);
    }

    builder.build()
}
