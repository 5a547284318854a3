//! Charge settlement poller.
//!
//! The gateway webhook is the fast path for settlement; this poller is
//! the safety net for missed or delayed callbacks. Both funnel into the
//! same conditional `accepted -> paid` update, so double delivery is
//! harmless: whichever path lands second affects zero rows.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use wayside_core::notifications::KIND_PAYMENT;
use wayside_db::models::notification::CreateNotification;
use wayside_db::models::proposal::Proposal;
use wayside_db::repositories::{EventRepo, NotificationRepo, ProposalRepo, SubscriptionRepo};
use wayside_db::DbPool;
use wayside_payments::{ChargeStatus, PaymentClient};

/// How many unsettled proposals to examine per tick.
const SETTLEMENT_BATCH_SIZE: i64 = 100;

/// Background service reconciling accepted proposals against the gateway.
pub struct SettlementPoller {
    pool: DbPool,
    payments: Arc<PaymentClient>,
    poll_interval: Duration,
}

impl SettlementPoller {
    pub fn new(pool: DbPool, payments: Arc<PaymentClient>, poll_interval: Duration) -> Self {
        Self {
            pool,
            payments,
            poll_interval,
        }
    }

    /// Run the polling loop until `cancel` fires.
    ///
    /// Each tick also closes lapsed subscriptions; the two sweeps share
    /// a cadence because neither is latency-sensitive.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.settle_pending_charges().await {
                        tracing::error!(error = %e, "Settlement sweep failed");
                    }
                    if let Err(e) = self.close_lapsed_subscriptions().await {
                        tracing::error!(error = %e, "Subscription sweep failed");
                    }
                }
                () = cancel.cancelled() => {
                    tracing::info!("Settlement poller shutting down");
                    break;
                }
            }
        }
    }

    /// Poll the gateway for every proposal awaiting settlement.
    async fn settle_pending_charges(&self) -> Result<(), sqlx::Error> {
        let pending =
            ProposalRepo::list_awaiting_settlement(&self.pool, SETTLEMENT_BATCH_SIZE).await?;
        if pending.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = pending.len(), "Polling gateway for settlement");

        for proposal in pending {
            // One gateway failure must not stall the rest of the batch.
            let charge_id = match proposal.external_payment_id.as_deref() {
                Some(id) => id,
                None => continue,
            };

            match self.payments.get_charge(charge_id).await {
                Ok(charge) => {
                    self.apply_charge_status(&proposal, charge_id, charge.status)
                        .await?;
                }
                Err(e) => {
                    tracing::warn!(
                        proposal_id = proposal.id,
                        charge_id,
                        error = %e,
                        "Gateway poll failed, will retry next tick"
                    );
                }
            }
        }

        Ok(())
    }

    /// Transition a proposal according to the gateway's reported status.
    async fn apply_charge_status(
        &self,
        proposal: &Proposal,
        charge_id: &str,
        status: ChargeStatus,
    ) -> Result<(), sqlx::Error> {
        match status {
            ChargeStatus::Confirmed => {
                let settled = ProposalRepo::mark_paid(&self.pool, proposal.id).await?;
                if !settled {
                    return Ok(()); // The webhook beat us to it.
                }
                tracing::info!(proposal_id = proposal.id, charge_id, "Charge settled");

                EventRepo::insert(
                    &self.pool,
                    "payment.confirmed",
                    Some("proposal"),
                    Some(proposal.id),
                    None,
                    &serde_json::json!({
                        "client_id": proposal.client_id,
                        "mechanic_id": proposal.mechanic_id,
                        "charge_id": charge_id,
                        "via": "poller",
                    }),
                )
                .await?;

                for (recipient_id, message) in [
                    (proposal.client_id, "Your payment went through."),
                    (
                        proposal.mechanic_id,
                        "The client's payment settled. Your share is on the way.",
                    ),
                ] {
                    NotificationRepo::create(
                        &self.pool,
                        &CreateNotification {
                            recipient_id,
                            title: "Payment confirmed".to_string(),
                            message: message.to_string(),
                            kind: KIND_PAYMENT.to_string(),
                            reference_id: Some(proposal.id),
                        },
                    )
                    .await?;
                }
            }
            ChargeStatus::Failed => {
                tracing::warn!(
                    proposal_id = proposal.id,
                    charge_id,
                    "Charge failed, proposal remains unsettled"
                );
                EventRepo::insert(
                    &self.pool,
                    "payment.failed",
                    Some("proposal"),
                    Some(proposal.id),
                    None,
                    &serde_json::json!({
                        "client_id": proposal.client_id,
                        "charge_id": charge_id,
                        "via": "poller",
                    }),
                )
                .await?;
                NotificationRepo::create(
                    &self.pool,
                    &CreateNotification {
                        recipient_id: proposal.client_id,
                        title: "Payment failed".to_string(),
                        message: "Your payment did not go through. Please try another method."
                            .to_string(),
                        kind: KIND_PAYMENT.to_string(),
                        reference_id: Some(proposal.id),
                    },
                )
                .await?;
            }
            ChargeStatus::Pending => {}
            ChargeStatus::Refunded => {
                tracing::warn!(
                    proposal_id = proposal.id,
                    charge_id,
                    "Charge refunded out-of-band"
                );
            }
        }
        Ok(())
    }

    /// Close subscriptions whose period has lapsed.
    async fn close_lapsed_subscriptions(&self) -> Result<(), sqlx::Error> {
        let closed = SubscriptionRepo::close_lapsed(&self.pool, chrono::Utc::now()).await?;
        if closed > 0 {
            tracing::info!(closed, "Closed lapsed subscriptions");
        }
        Ok(())
    }
}
