//! HTTP-level integration tests for the service-request lifecycle and
//! its state machine guards.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, post_json_auth, register_client_with_vehicle, register_user,
};
use sqlx::PgPool;

/// Helper: open a request, returning its id.
async fn create_request(app: axum::Router, token: &str, vehicle_id: i64, description: &str) -> i64 {
    let body = serde_json::json!({
        "vehicle_id": vehicle_id,
        "description": description,
        "lat": -23.56,
        "lng": -46.65,
    });
    let response = post_json_auth(app, "/api/v1/requests", token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// A new request starts in `pending` with no provider or price.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_starts_pending(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token, vehicle_id) = register_client_with_vehicle(app.clone(), "fresh").await;

    let body = serde_json::json!({ "vehicle_id": vehicle_id, "description": "flat tire" });
    let response = post_json_auth(app, "/api/v1/requests", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["assigned_provider_id"].is_null());
    assert!(json["data"]["price_cents"].is_null());
}

/// Requests against someone else's vehicle are rejected.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_requires_own_vehicle(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_a, _token_a, vehicle_a) = register_client_with_vehicle(app.clone(), "car_owner").await;
    let (_b, token_b) = register_user(app.clone(), "no_car", "client").await;

    let body = serde_json::json!({ "vehicle_id": vehicle_a, "description": "dead battery" });
    let response = post_json_auth(app, "/api/v1/requests", &token_b, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// `?status=` filters the listing to exactly the matching subset,
/// preserving order.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_filter(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token, vehicle_id) = register_client_with_vehicle(app.clone(), "filterer").await;

    let first = create_request(app.clone(), &token, vehicle_id, "first").await;
    let second = create_request(app.clone(), &token, vehicle_id, "second").await;
    let third = create_request(app.clone(), &token, vehicle_id, "third").await;

    // Cancel the middle one.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{second}/cancel"),
        &token,
        serde_json::json!({ "reason": "resolved it myself" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), "/api/v1/requests?status=pending", &token).await;
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    // Newest first, cancelled row absent.
    assert_eq!(ids, vec![third, first]);

    let response = get_auth(app, "/api/v1/requests?status=cancelled", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], second);
    assert_eq!(json["data"][0]["cancelled_reason"], "resolved it myself");
}

/// An unknown status value in the filter is a 400, not an empty list.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_status_filter_rejects_unknown_value(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token, _vehicle) = register_client_with_vehicle(app.clone(), "typo").await;

    let response = get_auth(app, "/api/v1/requests?status=bogus", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Cancelling twice is an illegal transition and surfaces as 409.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_double_cancel_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token, vehicle_id) = register_client_with_vehicle(app.clone(), "canceller").await;
    let request_id = create_request(app.clone(), &token, vehicle_id, "stuck in mud").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/requests/{request_id}/cancel"),
        &token,
        serde_json::json!({ "reason": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app,
        &format!("/api/v1/requests/{request_id}/cancel"),
        &token,
        serde_json::json!({ "reason": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Only the requester may cancel.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_requires_requester(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_a, token_a, vehicle_id) = register_client_with_vehicle(app.clone(), "req_owner").await;
    let (_b, token_b) = register_user(app.clone(), "intruder", "client").await;
    let request_id = create_request(app.clone(), &token_a, vehicle_id, "overheating").await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/requests/{request_id}/cancel"),
        &token_b,
        serde_json::json!({ "reason": null }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// A provider cannot start a request that was never assigned to them,
/// and a pending request cannot jump straight to in_progress.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_start_requires_assignment(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_c, token_c, vehicle_id) = register_client_with_vehicle(app.clone(), "stranded").await;
    let (_m, token_m) = register_user(app.clone(), "eager_mech", "mechanic").await;
    let request_id = create_request(app.clone(), &token_c, vehicle_id, "won't start").await;

    let response = common::post_auth(
        app,
        &format!("/api/v1/requests/{request_id}/start"),
        &token_m,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Providers see open requests oldest first.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_open_listing_for_providers(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_c, token_c, vehicle_id) = register_client_with_vehicle(app.clone(), "lister").await;
    let (_m, token_m) = register_user(app.clone(), "browser_mech", "mechanic").await;

    let first = create_request(app.clone(), &token_c, vehicle_id, "first").await;
    let second = create_request(app.clone(), &token_c, vehicle_id, "second").await;

    let response = get_auth(app, "/api/v1/requests/open", &token_m).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![first, second], "oldest first");
}
