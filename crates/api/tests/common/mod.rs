//! Shared helpers for HTTP-level integration tests.
//!
//! [`build_test_app`] mirrors the router construction in `main.rs` via
//! [`build_app_router`], so integration tests exercise the same
//! middleware stack (CORS, request ID, timeout, tracing, panic
//! recovery) that production uses.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use wayside_api::auth::jwt::JwtConfig;
use wayside_api::config::ServerConfig;
use wayside_api::router::build_app_router;
use wayside_api::state::AppState;
use wayside_api::ws::WsManager;
use wayside_core::cache::{TtlCache, DASHBOARD_TTL};
use wayside_core::fees::FeeSchedule;
use wayside_payments::{GatewayConfig, PaymentClient};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "integration-test-secret-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        fees: FeeSchedule::default(),
        platform_gateway_account: "acct_wayside_test".to_string(),
    }
}

/// Gateway config pointing at a closed local port, so any charge call
/// fails fast with a transport error instead of hanging.
fn test_gateway_config() -> GatewayConfig {
    GatewayConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        webhook_secret: "whsec_test".to_string(),
        token_refresh_margin_secs: 60,
    }
}

/// Build the full application router with all middleware layers, using
/// the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        event_bus: Arc::new(wayside_events::EventBus::default()),
        payments: Arc::new(PaymentClient::new(test_gateway_config())),
        dashboard_cache: Arc::new(TtlCache::new(DASHBOARD_TTL)),
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, path: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn get_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("GET")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn post_json(app: Router, path: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn post_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn post_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn put_json_auth(
    app: Router,
    path: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

pub async fn delete_auth(app: Router, path: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request should build");
    app.oneshot(request).await.expect("request should complete")
}

/// Collect a response body as parsed JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be valid JSON")
}

// ---------------------------------------------------------------------------
// Account helpers
// ---------------------------------------------------------------------------

/// Register an account through the API, returning `(user_id, access_token)`.
pub async fn register_user(app: Router, username: &str, role: &str) -> (i64, String) {
    let body = serde_json::json!({
        "username": username,
        "email": format!("{username}@test.com"),
        "password": "integration-password-1",
        "role": role,
        "full_name": format!("Test {username}"),
        "phone": null,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "registration failed");

    let json = body_json(response).await;
    let user_id = json["user"]["id"].as_i64().expect("user id");
    let token = json["access_token"].as_str().expect("access token").to_string();
    (user_id, token)
}

/// Register a client and add a vehicle, returning `(user_id, token, vehicle_id)`.
pub async fn register_client_with_vehicle(
    app: Router,
    username: &str,
) -> (i64, String, i64) {
    let (user_id, token) = register_user(app.clone(), username, "client").await;

    let body = serde_json::json!({
        "plate": "ABC1D23",
        "brand": "VW",
        "model": "Gol",
        "year": 2019,
        "mileage_km": 68000,
        "fuel_type": "flex",
    });
    let response = post_json_auth(app, "/api/v1/vehicles", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "vehicle creation failed");
    let json = body_json(response).await;
    let vehicle_id = json["data"]["id"].as_i64().expect("vehicle id");

    (user_id, token, vehicle_id)
}
