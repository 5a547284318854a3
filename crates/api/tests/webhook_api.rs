//! HTTP-level integration tests for the payment-gateway webhook:
//! signature enforcement and proposal settlement.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{
    body_json, post_json_auth, register_client_with_vehicle, register_user,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::PgPool;
use tower::ServiceExt;
use wayside_db::repositories::ProposalRepo;

type HmacSha256 = Hmac<Sha256>;

/// Must match the webhook secret in `common::test_gateway_config`.
const WEBHOOK_SECRET: &str = "whsec_test";

/// Build a signed webhook request for the given JSON body.
fn signed_webhook(body: &serde_json::Value) -> Request<Body> {
    let payload = body.to_string();
    let timestamp = chrono::Utc::now().timestamp();

    let mut mac = HmacSha256::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/v1/payments/webhook")
        .header("content-type", "application/json")
        .header("gateway-signature", format!("t={timestamp},v1={signature}"))
        .body(Body::from(payload))
        .unwrap()
}

/// Seed a proposal in `accepted` state with a gateway charge attached.
async fn seed_accepted_proposal(app: axum::Router, pool: &PgPool, charge_id: &str) -> i64 {
    let (_c, token_c, vehicle_id) =
        register_client_with_vehicle(app.clone(), &format!("wh_client_{charge_id}")).await;
    let (_m, token_m) =
        register_user(app.clone(), &format!("wh_mech_{charge_id}"), "mechanic").await;

    let body = serde_json::json!({ "vehicle_id": vehicle_id, "description": "no spark" });
    let response = post_json_auth(app.clone(), "/api/v1/requests", &token_c, body).await;
    let request_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let body = serde_json::json!({ "service_request_id": request_id, "amount_cents": 9000 });
    let response = post_json_auth(app, "/api/v1/proposals", &token_m, body).await;
    let json = body_json(response).await;
    let proposal_id = json["data"]["id"].as_i64().unwrap();
    let client_id = json["data"]["client_id"].as_i64().unwrap();

    // Move it to accepted-with-charge directly, as the accept flow would.
    ProposalRepo::accept(pool, proposal_id, client_id)
        .await
        .unwrap()
        .expect("proposal should accept");
    ProposalRepo::set_external_payment(pool, proposal_id, charge_id)
        .await
        .unwrap();

    proposal_id
}

/// A correctly signed confirmation settles the proposal.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_confirmed_webhook_settles_proposal(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let proposal_id = seed_accepted_proposal(app.clone(), &pool, "ch_settle").await;

    let request = signed_webhook(&serde_json::json!({
        "charge_id": "ch_settle",
        "status": "confirmed",
    }));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let proposal = ProposalRepo::find_by_id(&pool, proposal_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(proposal.status, "paid");

    // Redelivery is a no-op, not an error.
    let request = signed_webhook(&serde_json::json!({
        "charge_id": "ch_settle",
        "status": "confirmed",
    }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// A bad signature is rejected and nothing changes.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_bad_signature_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let proposal_id = seed_accepted_proposal(app.clone(), &pool, "ch_forged").await;

    let payload = serde_json::json!({ "charge_id": "ch_forged", "status": "confirmed" });
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/payments/webhook")
        .header("content-type", "application/json")
        .header("gateway-signature", "t=0,v1=deadbeef")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let proposal = ProposalRepo::find_by_id(&pool, proposal_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(proposal.status, "accepted", "forged webhook must not settle");
}

/// A webhook for a charge we do not track is acknowledged so the
/// gateway stops retrying.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_charge_acknowledged(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = signed_webhook(&serde_json::json!({
        "charge_id": "ch_nobody",
        "status": "confirmed",
    }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

/// A failure event leaves the proposal unsettled.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_failed_webhook_keeps_proposal_accepted(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let proposal_id = seed_accepted_proposal(app.clone(), &pool, "ch_fail").await;

    let request = signed_webhook(&serde_json::json!({
        "charge_id": "ch_fail",
        "status": "failed",
    }));
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let proposal = ProposalRepo::find_by_id(&pool, proposal_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(proposal.status, "accepted");
}
