//! Route definitions for geolocation reporting and lookup.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::location;
use crate::state::AppState;

/// Routes mounted at `/location` and `/providers`.
///
/// ```text
/// PUT    /location                  -> report_location
/// GET    /providers/{id}/location   -> get_provider_location
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/location", put(location::report_location))
        .route(
            "/providers/{id}/location",
            get(location::get_provider_location),
        )
}
