//! HTTP API tests
//!
//! Drives the full router (middleware chain included) over in-memory stores.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_MAX_AGE, ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, CONTENT_TYPE,
            ORIGIN,
        },
        Method, Request, StatusCode,
    },
    Router,
};
use common::*;
use krawl::backend::auth::public_endpoints::PublicEndpoints;
use krawl::backend::auth::revocation::{InMemoryRevocationStore, RevocationStore};
use krawl::backend::auth::users::InMemoryIdentityLoader;
use chrono::Utc;
use krawl::backend::routes::create_router;
use krawl::backend::server::config::AppConfig;
use krawl::backend::server::state::AppState;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    state: AppState,
    revocations: Arc<InMemoryRevocationStore>,
    identities: Arc<InMemoryIdentityLoader>,
}

impl TestApp {
    async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    async fn with_config(config: AppConfig) -> Self {
        let revocations = Arc::new(InMemoryRevocationStore::new());
        let identities = identities(&["U1"]).await;
        let state = AppState::with_stores(
            &config,
            revocations.clone(),
            identities.clone(),
            PublicEndpoints::default(),
        );

        Self {
            router: create_router(state.clone()),
            state,
            revocations,
            identities,
        }
    }

    fn access_token(&self, id: &str) -> String {
        self.state.tokens.issue_access_token(&identity(id)).unwrap()
    }

    fn refresh_token(&self, id: &str) -> String {
        self.state.tokens.issue_refresh_token(&identity(id)).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, path, token)).await
    }

    async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/actuator/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "UP" }));
}

#[tokio::test]
async fn health_ignores_revoked_credentials() {
    let app = TestApp::new().await;
    let token = app.access_token("U1");
    app.revocations.revoke(&token, in_one_hour()).await.unwrap();

    let (status, _) = app.get("/actuator/health", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn me_requires_authentication() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/users/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({
            "error": "UNAUTHORIZED",
            "message": "Authentication required",
            "status": 401,
        })
    );

    let (status, _) = app.get("/api/users/me", Some("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn me_returns_resolved_identity() {
    let app = TestApp::new().await;
    let token = app.access_token("U1");

    let (status, body) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "id": "U1",
            "email": "u1@krawl.test",
            "username": "user-u1",
            "authorities": ["ROLE_USER"],
        })
    );
}

#[tokio::test]
async fn me_rejects_deleted_user() {
    let app = TestApp::new().await;
    let token = app.access_token("U1");
    app.identities.remove("U1").await;

    let (status, _) = app.get("/api/users/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoke_invalidates_access_token() {
    let app = TestApp::new().await;
    let access = app.access_token("U1");
    let refresh = app.refresh_token("U1");

    let (status, body) = app
        .post_json(
            "/api/auth/revoke",
            json!({ "accessToken": access, "refreshToken": refresh }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Tokens revoked successfully" }));
    assert_eq!(app.revocations.len().await, 2);

    let (status, _) = app.get("/api/users/me", Some(&access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoke_does_not_reveal_token_validity() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json(
            "/api/auth/revoke",
            json!({ "accessToken": "garbage", "refreshToken": "also-garbage" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Tokens revoked successfully" }));
    assert!(app.revocations.is_empty().await);

    let (status, _) = app.post_json("/api/auth/revoke", json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn revoke_skips_invalid_refresh_token() {
    let app = TestApp::new().await;
    let access = app.access_token("U1");

    let (status, _) = app
        .post_json(
            "/api/auth/revoke",
            // An access token in the refresh slot is not a refresh token
            json!({ "accessToken": access, "refreshToken": access }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.revocations.len().await, 1);
}

#[tokio::test]
async fn refresh_rotates_tokens() {
    let app = TestApp::new().await;
    let refresh = app.refresh_token("U1");

    let (status, body) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    let access = body["accessToken"].as_str().unwrap().to_string();
    let rotated = body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(rotated, refresh);
    assert!(app.revocations.is_revoked(&refresh).await.unwrap());

    let (status, me) = app.get("/api/users/me", Some(&access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], "U1");

    // The spent refresh token cannot be replayed; the rotated one works
    let (status, body) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": rotated })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_rejects_blank_token() {
    let app = TestApp::new().await;

    for body in [json!({ "refreshToken": "" }), json!({ "refreshToken": "   " }), json!({})] {
        let (status, response) = app.post_json("/api/auth/refresh", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "VALIDATION_ERROR");
        assert_eq!(response["status"], 400);
    }
}

#[tokio::test]
async fn refresh_rejects_access_token() {
    let app = TestApp::new().await;
    let access = app.access_token("U1");

    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": access })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.revocations.is_empty().await);
}

#[tokio::test]
async fn refresh_rejects_unknown_user() {
    let app = TestApp::new().await;
    let refresh = app.refresh_token("U7");

    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(!app.revocations.is_revoked(&refresh).await.unwrap());
}

#[tokio::test]
async fn refresh_rejects_garbage() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_json("/api/auth/refresh", json!({ "refreshToken": "invalid.token.here" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let app = TestApp::new().await;
    let token = app.access_token("U1");

    let (status, body) = app.get("/api/nowhere", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "RESOURCE_NOT_FOUND");
    assert_eq!(body["message"], "No route for /api/nowhere");

    // Unknown paths under a public rule stay reachable anonymously
    let (status, _) = app.get("/api/gems/unknown/path", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn anonymous_requests_to_protected_paths_are_denied() {
    let app = TestApp::new().await;

    for (method, path) in [
        (Method::POST, "/api/krawls"),
        (Method::GET, "/api/nowhere"),
        (Method::POST, "/api/gems"),
    ] {
        let (status, body) = app.send(request(method, path, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(body["message"], "Authentication required");
    }

    let (status, _) = app.get("/api/krawls", Some("invalid.token.here")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn revoked_token_stays_rejected_through_clock_skew() {
    let config = AppConfig::builder(TEST_SECRET)
        .access_ttl(Duration::from_secs(1))
        .refresh_ttl(Duration::from_secs(1))
        .build()
        .unwrap();
    let app = TestApp::with_config(config).await;
    let access = app.access_token("U1");
    let refresh = app.refresh_token("U1");

    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.post_json("/api/auth/revoke", json!({ "accessToken": access })).await;
    assert_eq!(status, StatusCode::OK);

    let record = app.revocations.get(&access).await.unwrap();
    assert!(record.expires_at > Utc::now() + chrono::Duration::seconds(290));

    // Past `exp` but inside the clock skew the tokens still validate
    tokio::time::sleep(Duration::from_millis(2100)).await;

    let (status, _) = app.get("/api/users/me", Some(&access)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.post_json("/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let app = TestApp::new().await;
    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/users/me")
        .header(ORIGIN, "http://localhost:3000")
        .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
        .header(ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(preflight).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
    assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "3600");
    assert!(headers[ACCESS_CONTROL_ALLOW_HEADERS]
        .to_str()
        .unwrap()
        .contains("authorization"));
}

#[tokio::test]
async fn cors_ignores_unlisted_origin() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .uri("/actuator/health")
        .header(ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

async fn failing_store_app() -> (Router, AppState) {
    let state = AppState::with_stores(
        &test_config(),
        Arc::new(FailingRevocationStore),
        identities(&["U1"]).await,
        PublicEndpoints::default(),
    );
    (create_router(state.clone()), state)
}

async fn post_to(router: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn internal_error_body() -> Value {
    json!({
        "error": "INTERNAL_ERROR",
        "message": "An unexpected error occurred",
        "status": 500,
    })
}

#[tokio::test]
async fn revoke_reports_store_failure() {
    let (router, state) = failing_store_app().await;
    let access = state.tokens.issue_access_token(&identity("U1")).unwrap();

    let (status, body) = post_to(&router, "/api/auth/revoke", json!({ "accessToken": access })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, internal_error_body());

    // Invalid tokens never reach the store
    let (status, _) = post_to(&router, "/api/auth/revoke", json!({ "accessToken": "garbage" })).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn refresh_reports_store_failure() {
    let (router, state) = failing_store_app().await;
    let refresh = state.tokens.issue_refresh_token(&identity("U1")).unwrap();

    let (status, body) = post_to(&router, "/api/auth/refresh", json!({ "refreshToken": refresh })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, internal_error_body());
}
