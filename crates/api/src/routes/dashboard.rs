//! Route definition for the `/dashboard` aggregate view.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard::get_dashboard))
}
