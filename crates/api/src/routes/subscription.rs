//! Route definitions for the `/plans` and `/subscription` resources.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::subscription;
use crate::state::AppState;

/// Routes mounted at `/plans` and `/subscription`.
///
/// ```text
/// GET    /plans                 -> list_plans
/// POST   /subscription          -> subscribe
/// GET    /subscription          -> current_subscription
/// PUT    /subscription/cancel   -> cancel_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(subscription::list_plans))
        .route(
            "/subscription",
            get(subscription::current_subscription).post(subscription::subscribe),
        )
        .route(
            "/subscription/cancel",
            put(subscription::cancel_subscription),
        )
}
