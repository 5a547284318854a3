//! Handler for the `/dashboard` aggregate view.
//!
//! The summary is served from a shared TTL cache with a five-minute
//! freshness window; mutating endpoints invalidate the caller's entry so
//! their next dashboard read is recomputed immediately.

use axum::extract::State;
use axum::Json;
use wayside_core::roles::{is_provider_role, ROLE_CLIENT};
use wayside_db::repositories::{NotificationRepo, ServiceRequestRepo, SubscriptionRepo};

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Per-role summary counts: requests by status, unread notifications,
/// and the active subscription, if any.
pub async fn get_dashboard(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    // 1. Fresh cache entry: serve without touching the database.
    if let Some(cached) = state.dashboard_cache.get(&auth.user_id).await {
        return Ok(Json(DataResponse { data: cached }));
    }

    // 2. Recompute.
    let counts = if auth.role == ROLE_CLIENT {
        ServiceRequestRepo::count_by_status_for_requester(&state.pool, auth.user_id).await?
    } else if is_provider_role(&auth.role) {
        ServiceRequestRepo::count_by_status_for_provider(&state.pool, auth.user_id).await?
    } else {
        Vec::new()
    };
    let requests_by_status: serde_json::Map<String, serde_json::Value> = counts
        .into_iter()
        .map(|(status, count)| (status, serde_json::Value::from(count)))
        .collect();

    let unread = NotificationRepo::unread_count(&state.pool, auth.user_id).await?;
    let subscription = SubscriptionRepo::current_for_user(&state.pool, auth.user_id).await?;

    let summary = serde_json::json!({
        "requests_by_status": requests_by_status,
        "unread_notifications": unread,
        "subscription": subscription,
    });

    // 3. Cache for the next five minutes of reads.
    state
        .dashboard_cache
        .insert(auth.user_id, summary.clone())
        .await;

    Ok(Json(DataResponse { data: summary }))
}
