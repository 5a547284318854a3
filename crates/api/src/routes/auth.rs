//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/auth` (plus the sibling `/profile` pair).
///
/// ```text
/// POST   /register  -> register
/// POST   /login     -> login
/// POST   /refresh   -> refresh
/// POST   /logout    -> logout
/// GET    /me        -> me
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Routes mounted at `/profile`.
pub fn profile_router() -> Router<AppState> {
    Router::new().route(
        "/profile",
        get(profile::get_profile).put(profile::update_profile),
    )
}
