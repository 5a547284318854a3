//! HTTP-level integration tests for the notification feed.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_auth, register_user};
use sqlx::PgPool;
use wayside_db::models::notification::CreateNotification;
use wayside_db::repositories::NotificationRepo;

/// Helper: insert a notification row directly.
async fn seed_notification(pool: &PgPool, recipient_id: i64, title: &str) -> i64 {
    NotificationRepo::create(
        pool,
        &CreateNotification {
            recipient_id,
            title: title.to_string(),
            message: "test message".to_string(),
            kind: "system".to_string(),
            reference_id: None,
        },
    )
    .await
    .expect("seed should insert")
    .id
}

/// Listing returns the user's notifications newest first, and the
/// unread filter narrows to unread rows.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_and_unread_filter(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user_id, token) = register_user(app.clone(), "notified", "client").await;

    let first = seed_notification(&pool, user_id, "first").await;
    let second = seed_notification(&pool, user_id, "second").await;

    // Mark the first as read.
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/notifications/{first}/read"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(app.clone(), "/api/v1/notifications", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get_auth(app, "/api/v1/notifications?unread_only=true", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["id"], second);
}

/// Marking another user's notification is a 404, not a silent success.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_mark_read_scoped_to_recipient(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner_id, _owner_token) = register_user(app.clone(), "note_owner", "client").await;
    let (_other_id, other_token) = register_user(app.clone(), "note_other", "client").await;

    let note = seed_notification(&pool, owner_id, "private").await;

    let response = post_auth(
        app,
        &format!("/api/v1/notifications/{note}/read"),
        &other_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Unread count and read-all work together.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_unread_count_and_read_all(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (user_id, token) = register_user(app.clone(), "counted", "mechanic").await;

    seed_notification(&pool, user_id, "a").await;
    seed_notification(&pool, user_id, "b").await;
    seed_notification(&pool, user_id, "c").await;

    let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 3);

    let response = post_auth(app.clone(), "/api/v1/notifications/read-all", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["marked_read"], 3);

    let response = get_auth(app, "/api/v1/notifications/unread-count", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["count"], 0);
}
