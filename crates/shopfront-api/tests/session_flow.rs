//! End-to-end session flow through the HTTP layer: cookie issuance,
//! identity reuse, persistence between requests, and the authenticated
//! override.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use shopfront_api::extractors::AuthenticatedUser;
use shopfront_api::{AppState, build_router};
use shopfront_cache::memory::MemoryStoreProvider;
use shopfront_cache::provider::StoreManager;
use shopfront_core::config::AppConfig;
use shopfront_core::config::store::MemoryStoreConfig;
use shopfront_core::traits::store::TransientStore;

fn test_app() -> (Router, Arc<StoreManager>) {
    let provider = MemoryStoreProvider::new(&MemoryStoreConfig { max_capacity: 1000 });
    let store = Arc::new(StoreManager::from_provider(Arc::new(provider)));
    let state = AppState::new(AppConfig::default(), Arc::clone(&store));
    (build_router(state), store)
}

/// First Set-Cookie header on the response, split into (pair, attributes).
fn session_cookie(response: &axum::http::Response<Body>) -> Option<(String, String)> {
    let raw = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    let (pair, attrs) = raw.split_once(';').unwrap_or((raw, ""));
    Some((pair.to_string(), attrs.to_string()))
}

async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn first_contact_issues_hardened_cookie() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let (pair, attrs) = session_cookie(&response).expect("first contact must set a cookie");

    let (name, value) = pair.split_once('=').unwrap();
    assert!(name.starts_with("shopfront_session_"));
    assert_eq!(value.split('|').count(), 3, "token must have three fields");

    let attrs = attrs.to_ascii_lowercase();
    assert!(attrs.contains("httponly"));
    assert!(attrs.contains("samesite=lax"));
    assert!(attrs.contains("max-age=172800"));

    assert_eq!(body_json(response).await, Value::Null);
}

#[tokio::test]
async fn cart_persists_across_requests_for_same_cookie() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (cookie, _) = session_cookie(&response).unwrap();

    let cart = json!({"sku-7": 2, "sku-9": 1});
    let response = app
        .clone()
        .oneshot(
            Request::put("/api/cart")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(cart.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        session_cookie(&response).is_none(),
        "a verified token must be reused, not reissued"
    );

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await, cart);
}

#[tokio::test]
async fn tampered_cookie_is_superseded() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (cookie, _) = session_cookie(&response).unwrap();

    // Corrupt the first character of the identifier field.
    let eq = cookie.find('=').unwrap();
    let replacement = if cookie.as_bytes()[eq + 1] == b'A' { "B" } else { "A" };
    let mut tampered = cookie.clone();
    tampered.replace_range(eq + 1..eq + 2, replacement);

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::COOKIE, &tampered)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let (fresh, _) = session_cookie(&response).expect("forged token must be superseded");
    assert_ne!(fresh, cookie);
}

#[tokio::test]
async fn authenticated_user_gets_no_cookie_and_stable_record() {
    let (app, store) = test_app();

    let mut request = Request::put("/api/cart")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!(["apples"]).to_string()))
        .unwrap();
    request
        .extensions_mut()
        .insert(AuthenticatedUser("user-42".to_string()));

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        session_cookie(&response).is_none(),
        "authenticated identities need no token round-trip"
    );

    // The record is keyed by the stable user identifier.
    assert!(store.exists("session_user-42").await.unwrap());

    let mut request = Request::get("/api/cart").body(Body::empty()).unwrap();
    request
        .extensions_mut()
        .insert(AuthenticatedUser("user-42".to_string()));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(body_json(response).await, json!(["apples"]));
}

#[tokio::test]
async fn clear_cart_persists_deletion() {
    let (app, _store) = test_app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let (cookie, _) = session_cookie(&response).unwrap();

    let request = Request::put("/api/cart")
        .header(header::COOKIE, &cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!(["apples"]).to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap();

    let request = Request::delete("/api/cart")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(
            Request::get("/api/cart")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(body_json(response).await, Value::Null);
}

#[tokio::test]
async fn health_does_not_mint_sessions() {
    let (app, _store) = test_app();

    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(session_cookie(&response).is_none());
}
