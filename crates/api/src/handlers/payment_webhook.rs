//! Inbound payment-gateway webhook: signature verification and proposal
//! reconciliation.
//!
//! The webhook and the polling worker are alternative delivery paths for
//! the same settlement fact; both funnel into the conditional
//! `accepted -> paid` update, so whichever lands second is a no-op.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use wayside_core::notifications as kinds;
use wayside_db::repositories::ProposalRepo;
use wayside_events::PlatformEvent;
use wayside_payments::webhook::{parse_event, verify_signature};
use wayside_payments::{ChargeStatus, PaymentError};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Header carrying the gateway's HMAC signature.
const SIGNATURE_HEADER: &str = "gateway-signature";

/// POST /api/v1/payments/webhook
///
/// Unauthenticated route; trust comes from the HMAC signature over the
/// raw body. Returns 204 even for charges we no longer track, so the
/// gateway does not retry forever.
pub async fn gateway_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<StatusCode> {
    // 1. Verify before parsing anything out of the body.
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Payment(PaymentError::InvalidSignature))?;

    verify_signature(
        &body,
        signature,
        state.payments.webhook_secret(),
        chrono::Utc::now().timestamp(),
    )?;

    let event = parse_event(&body)?;

    // 2. Reconcile the matching proposal.
    let proposal = match ProposalRepo::find_by_external_payment(&state.pool, &event.charge_id)
        .await?
    {
        Some(p) => p,
        None => {
            tracing::warn!(charge_id = %event.charge_id, "Webhook for unknown charge");
            return Ok(StatusCode::NO_CONTENT);
        }
    };

    match event.status {
        ChargeStatus::Confirmed => {
            let settled = ProposalRepo::mark_paid(&state.pool, proposal.id).await?;
            if settled {
                state.event_bus.publish(
                    PlatformEvent::new("payment.confirmed")
                        .with_source("proposal", proposal.id)
                        .with_payload(serde_json::json!({
                            "client_id": proposal.client_id,
                            "mechanic_id": proposal.mechanic_id,
                            "charge_id": event.charge_id,
                            "kind": kinds::KIND_PAYMENT,
                        })),
                );
            }
        }
        ChargeStatus::Failed => {
            tracing::warn!(
                proposal_id = proposal.id,
                charge_id = %event.charge_id,
                "Charge failed, proposal remains unsettled"
            );
            state.event_bus.publish(
                PlatformEvent::new("payment.failed")
                    .with_source("proposal", proposal.id)
                    .with_payload(serde_json::json!({
                        "client_id": proposal.client_id,
                        "charge_id": event.charge_id,
                    })),
            );
        }
        ChargeStatus::Pending | ChargeStatus::Refunded => {
            tracing::debug!(
                proposal_id = proposal.id,
                status = ?event.status,
                "Ignoring non-terminal webhook status"
            );
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
