//! HTTP-level integration tests for plans and subscriptions.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth, register_user};
use sqlx::PgPool;

/// The seeded plan catalog is visible, cheapest first.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_plans(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "planshopper", "client").await;

    let response = get_auth(app, "/api/v1/plans", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let plans = json["data"].as_array().unwrap();
    assert_eq!(plans.len(), 2);
    assert_eq!(plans[0]["code"], "basic_monthly");
    assert_eq!(plans[1]["code"], "pro_yearly");
}

/// Subscribing opens an active subscription with a period end derived
/// from the billing period; a second subscribe conflicts.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_subscribe_and_one_active_invariant(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "subscriber", "client").await;

    // Find the monthly plan id from the catalog.
    let response = get_auth(app.clone(), "/api/v1/plans", &token).await;
    let json = body_json(response).await;
    let plan_id = json["data"][0]["id"].as_i64().unwrap();

    let body = serde_json::json!({ "plan_id": plan_id });
    let response = post_json_auth(app.clone(), "/api/v1/subscription", &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "active");
    assert_eq!(json["data"]["cancel_at_period_end"], false);

    // One active subscription per user: the partial unique index wins.
    let body = serde_json::json!({ "plan_id": plan_id });
    let response = post_json_auth(app.clone(), "/api/v1/subscription", &token, body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = get_auth(app, "/api/v1/subscription", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Subscribing to a nonexistent plan is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_subscribe_unknown_plan(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "lostshopper", "client").await;

    let body = serde_json::json!({ "plan_id": 9999 });
    let response = post_json_auth(app, "/api/v1/subscription", &token, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// The cancel flag can be set and cleared on the active subscription.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_at_period_end_round_trip(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "flipflopper", "client").await;

    let response = get_auth(app.clone(), "/api/v1/plans", &token).await;
    let json = body_json(response).await;
    let plan_id = json["data"][0]["id"].as_i64().unwrap();

    let body = serde_json::json!({ "plan_id": plan_id });
    post_json_auth(app.clone(), "/api/v1/subscription", &token, body).await;

    let body = serde_json::json!({ "cancel_at_period_end": true });
    let response = put_json_auth(app.clone(), "/api/v1/subscription/cancel", &token, body).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["cancel_at_period_end"], true);

    let body = serde_json::json!({ "cancel_at_period_end": false });
    let response = put_json_auth(app, "/api/v1/subscription/cancel", &token, body).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["cancel_at_period_end"], false);
}

/// Without a subscription, the cancel endpoint is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_without_subscription(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (_id, token) = register_user(app.clone(), "nonsubscriber", "client").await;

    let body = serde_json::json!({ "cancel_at_period_end": true });
    let response = put_json_auth(app, "/api/v1/subscription/cancel", &token, body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
