//! Route definitions for the `/vehicles` resource.
//!
//! All endpoints require authentication and are scoped to the owner.

use axum::routing::get;
use axum::Router;

use crate::handlers::vehicle;
use crate::state::AppState;

/// Routes mounted at `/vehicles`.
///
/// ```text
/// GET    /vehicles       -> list_vehicles
/// POST   /vehicles       -> create_vehicle
/// GET    /vehicles/{id}  -> get_vehicle
/// PUT    /vehicles/{id}  -> update_vehicle
/// DELETE /vehicles/{id}  -> delete_vehicle
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/vehicles",
            get(vehicle::list_vehicles).post(vehicle::create_vehicle),
        )
        .route(
            "/vehicles/{id}",
            get(vehicle::get_vehicle)
                .put(vehicle::update_vehicle)
                .delete(vehicle::delete_vehicle),
        )
}
