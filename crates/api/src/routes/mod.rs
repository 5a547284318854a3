pub mod auth;
pub mod dashboard;
pub mod health;
pub mod location;
pub mod notification;
pub mod payments;
pub mod proposal;
pub mod service_request;
pub mod subscription;
pub mod vehicle;

use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                                WebSocket (token via query param)
///
/// /auth/register                     register (public)
/// /auth/login                        login (public)
/// /auth/refresh                      refresh (public)
/// /auth/logout                       logout (requires auth)
/// /auth/me                           session context (requires auth)
///
/// /profile                           get, update own profile
///
/// /vehicles                          list, create
/// /vehicles/{id}                     get, update, delete
///
/// /requests                          list (role-scoped), create (client)
/// /requests/open                     open for quoting (providers)
/// /requests/{id}                     get
/// /requests/{id}/cancel              cancel (requester, pre-engagement)
/// /requests/{id}/start               start work (assigned provider)
/// /requests/{id}/complete            finish work (assigned provider)
/// /requests/{id}/proposals           proposals against a request
///
/// /proposals                         list own (providers), create (providers)
/// /proposals/{id}/accept             accept + charge (client)
/// /proposals/{id}/reject             reject (client)
/// /proposals/{id}/complete           close out (mechanic)
///
/// /notifications                     list
/// /notifications/read-all            mark all read
/// /notifications/unread-count        unread count
/// /notifications/{id}/read           mark one read
///
/// /plans                             plan catalog
/// /subscription                      subscribe, current
/// /subscription/cancel               set cancel-at-period-end
///
/// /location                          report own position
/// /providers/{id}/location           provider last-known position
///
/// /dashboard                         cached per-role summary
///
/// /payments/webhook                  gateway callback (HMAC-verified)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", axum::routing::get(ws::handler::ws_upgrade))
        .nest("/auth", auth::router())
        .merge(auth::profile_router())
        .merge(vehicle::router())
        .merge(service_request::router())
        .merge(proposal::router())
        .nest("/notifications", notification::router())
        .merge(subscription::router())
        .merge(location::router())
        .merge(dashboard::router())
        .merge(payments::router())
}
