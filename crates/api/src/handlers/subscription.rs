//! Handlers for the `/plans` and `/subscription` resources.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use wayside_core::error::CoreError;
use wayside_db::models::subscription::{CreateSubscription, Plan, Subscription};
use wayside_db::repositories::SubscriptionRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /subscription/cancel`.
#[derive(Debug, Deserialize)]
pub struct CancelSubscription {
    /// `true` to cancel at period end, `false` to undo a pending cancel.
    pub cancel_at_period_end: bool,
}

/// GET /api/v1/plans
///
/// The plan catalog, cheapest first.
pub async fn list_plans(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Plan>>>> {
    let plans = SubscriptionRepo::list_active_plans(&state.pool).await?;
    Ok(Json(DataResponse { data: plans }))
}

/// POST /api/v1/subscription
///
/// Subscribe the caller to a plan. The period end is derived from the
/// plan's billing period; a second active subscription is rejected with
/// 409 by the partial unique index.
pub async fn subscribe(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateSubscription>,
) -> AppResult<(StatusCode, Json<DataResponse<Subscription>>)> {
    let plan = SubscriptionRepo::find_plan(&state.pool, input.plan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Plan",
            id: input.plan_id,
        }))?;

    let period_start = Utc::now();
    let period_end = match plan.billing_period.as_str() {
        "monthly" => period_start + chrono::Duration::days(30),
        "yearly" => period_start + chrono::Duration::days(365),
        other => {
            return Err(AppError::InternalError(format!(
                "Plan {} has unknown billing period '{other}'",
                plan.id
            )))
        }
    };

    let subscription =
        SubscriptionRepo::create(&state.pool, auth.user_id, plan.id, period_start, period_end)
            .await?;
    state.dashboard_cache.invalidate(&auth.user_id).await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: subscription }),
    ))
}

/// GET /api/v1/subscription
///
/// The caller's active subscription, or 404 if there is none.
pub async fn current_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let subscription = SubscriptionRepo::current_for_user(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Subscription",
            id: auth.user_id,
        }))?;

    Ok(Json(DataResponse { data: subscription }))
}

/// PUT /api/v1/subscription/cancel
///
/// Set or clear the cancel-at-period-end flag on the active subscription.
pub async fn cancel_subscription(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CancelSubscription>,
) -> AppResult<Json<DataResponse<Subscription>>> {
    let subscription = SubscriptionRepo::set_cancel_at_period_end(
        &state.pool,
        auth.user_id,
        input.cancel_at_period_end,
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "Subscription",
        id: auth.user_id,
    }))?;

    Ok(Json(DataResponse { data: subscription }))
}
