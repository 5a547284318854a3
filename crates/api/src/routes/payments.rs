//! Route definition for the payment-gateway webhook.

use axum::routing::post;
use axum::Router;

use crate::handlers::payment_webhook;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// POST   /payments/webhook  -> gateway_webhook (HMAC-verified, no JWT)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/payments/webhook", post(payment_webhook::gateway_webhook))
}
