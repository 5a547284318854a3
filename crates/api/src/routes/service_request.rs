//! Route definitions for the `/requests` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{proposal, service_request};
use crate::state::AppState;

/// Routes mounted at `/requests`.
///
/// ```text
/// GET    /requests                 -> list_requests (role-scoped)
/// POST   /requests                 -> create_request (client)
/// GET    /requests/open            -> list_open_requests (providers)
/// GET    /requests/{id}            -> get_request
/// POST   /requests/{id}/cancel     -> cancel_request (requester)
/// POST   /requests/{id}/start      -> start_request (assigned provider)
/// POST   /requests/{id}/complete   -> complete_request (assigned provider)
/// GET    /requests/{id}/proposals  -> proposals against the request
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/requests",
            get(service_request::list_requests).post(service_request::create_request),
        )
        .route("/requests/open", get(service_request::list_open_requests))
        .route("/requests/{id}", get(service_request::get_request))
        .route("/requests/{id}/cancel", post(service_request::cancel_request))
        .route("/requests/{id}/start", post(service_request::start_request))
        .route(
            "/requests/{id}/complete",
            post(service_request::complete_request),
        )
        .route("/requests/{id}/proposals", get(proposal::list_for_request))
}
