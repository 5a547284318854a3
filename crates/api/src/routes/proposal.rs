//! Route definitions for the `/proposals` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::proposal;
use crate::state::AppState;

/// Routes mounted at `/proposals`.
///
/// ```text
/// GET    /proposals                -> list_my_proposals (providers)
/// POST   /proposals                -> create_proposal (providers)
/// POST   /proposals/{id}/accept    -> accept_proposal (client)
/// POST   /proposals/{id}/reject    -> reject_proposal (client)
/// POST   /proposals/{id}/complete  -> complete_proposal (mechanic)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/proposals",
            get(proposal::list_my_proposals).post(proposal::create_proposal),
        )
        .route("/proposals/{id}/accept", post(proposal::accept_proposal))
        .route("/proposals/{id}/reject", post(proposal::reject_proposal))
        .route(
            "/proposals/{id}/complete",
            post(proposal::complete_proposal),
        )
}
