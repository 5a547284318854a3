//! HTTP-level integration tests for registration, login, token refresh,
//! logout, and RBAC enforcement.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth, register_user};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

/// Registration returns 201 with tokens and the created user.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_success(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "maria",
        "email": "maria@test.com",
        "password": "a-long-enough-password",
        "role": "client",
        "full_name": "Maria Souza",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["username"], "maria");
    assert_eq!(json["user"]["role"], "client");
}

/// Admin accounts cannot be self-registered.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_admin_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "wannabe",
        "email": "wannabe@test.com",
        "password": "a-long-enough-password",
        "role": "admin",
        "full_name": "Wannabe Admin",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// A duplicate username surfaces as 409 via the unique constraint.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_duplicate_username_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "joao", "client").await;

    let body = serde_json::json!({
        "username": "joao",
        "email": "other@test.com",
        "password": "a-long-enough-password",
        "role": "client",
        "full_name": "Another Joao",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// A too-short password is rejected before touching the database.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_register_weak_password_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "weak",
        "email": "weak@test.com",
        "password": "short",
        "role": "client",
        "full_name": "Weak Password",
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Login / refresh / logout
// ---------------------------------------------------------------------------

/// Login with correct credentials returns tokens.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "logme", "mechanic").await;

    let body = serde_json::json!({ "username": "logme", "password": "integration-password-1" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert_eq!(json["user"]["role"], "mechanic");
}

/// Login with an incorrect password returns 401.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "wrongpw", "client").await;

    let body = serde_json::json!({ "username": "wrongpw", "password": "incorrect-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Five consecutive failures lock the account; the correct password then
/// gets 403 until the lock expires.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_lockout_after_failures(pool: PgPool) {
    let app = common::build_test_app(pool);
    register_user(app.clone(), "locked", "client").await;

    for _ in 0..5 {
        let body = serde_json::json!({ "username": "locked", "password": "bad-password-try" });
        let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let body = serde_json::json!({ "username": "locked", "password": "integration-password-1" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Refresh rotates the token: the new pair works, the old refresh token
/// is dead.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_rotation(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "rotator",
        "email": "rotator@test.com",
        "password": "a-long-enough-password",
        "role": "client",
        "full_name": "Rotator",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    let json = body_json(response).await;
    let old_refresh = json["refresh_token"].as_str().unwrap().to_string();

    // First refresh succeeds.
    let body = serde_json::json!({ "refresh_token": old_refresh });
    let response = post_json(app.clone(), "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Replaying the consumed token fails.
    let body = serde_json::json!({ "refresh_token": old_refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Logout revokes sessions so the refresh token stops working.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_logout_revokes_sessions(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({
        "username": "leaver",
        "email": "leaver@test.com",
        "password": "a-long-enough-password",
        "role": "client",
        "full_name": "Leaver",
    });
    let response = post_json(app.clone(), "/api/v1/auth/register", body).await;
    let json = body_json(response).await;
    let token = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = common::post_auth(app.clone(), "/api/v1/auth/logout", &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = serde_json::json!({ "refresh_token": refresh });
    let response = post_json(app, "/api/v1/auth/refresh", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Session context & RBAC
// ---------------------------------------------------------------------------

/// `/auth/me` returns the resolved identity for the bearer.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_me_returns_profile(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (user_id, token) = register_user(app.clone(), "whoami", "tow").await;

    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], user_id);
    assert_eq!(json["data"]["role"], "tow");
    // The password hash must never leave the server.
    assert!(json["data"].get("password_hash").is_none());
}

/// Requests without a token are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_token_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/v1/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// A client cannot call provider-only endpoints.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_client_cannot_list_open_requests(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "justaclient", "client").await;

    let response = get_auth(app, "/api/v1/requests/open", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A provider cannot create service requests.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_provider_cannot_create_request(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "justamech", "mechanic").await;

    let body = serde_json::json!({ "vehicle_id": 1, "description": "engine noise" });
    let response = post_json_auth(app, "/api/v1/requests", &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
