//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the platform event bus and, for
//! each event, derives the notification rows to insert (recipient,
//! title, message, kind) and pushes a JSON frame to the recipient's live
//! WebSocket connections. Wayside events carry their recipients in the
//! payload, so routing is a pure function over the event.

use std::sync::Arc;

use axum::extract::ws::Message;
use tokio::sync::broadcast;
use wayside_core::notifications::{KIND_PAYMENT, KIND_PROPOSAL, KIND_REQUEST};
use wayside_core::types::DbId;
use wayside_db::models::notification::CreateNotification;
use wayside_db::repositories::NotificationRepo;
use wayside_db::DbPool;
use wayside_events::PlatformEvent;

use crate::ws::WsManager;

/// Routes platform events to user notifications.
pub struct NotificationRouter {
    pool: DbPool,
    ws_manager: Arc<WsManager>,
}

impl NotificationRouter {
    /// Create a new router with the given database pool and WebSocket manager.
    pub fn new(pool: DbPool, ws_manager: Arc<WsManager>) -> Self {
        Self { pool, ws_manager }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](wayside_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Persist and deliver every notification the event gives rise to.
    async fn route_event(&self, event: &PlatformEvent) -> Result<(), sqlx::Error> {
        for input in notifications_for(event) {
            let notification = NotificationRepo::create(&self.pool, &input).await?;

            // Push the stored row so the client renders exactly what a
            // later feed fetch would return.
            let frame = serde_json::json!({
                "type": "notification",
                "notification": notification,
            });
            self.ws_manager
                .send_to_user(notification.recipient_id, Message::Text(frame.to_string().into()))
                .await;
        }
        Ok(())
    }
}

/// Derive the notification rows an event gives rise to.
///
/// Unknown event types produce nothing: the event log is wider than the
/// notification feed.
pub fn notifications_for(event: &PlatformEvent) -> Vec<CreateNotification> {
    let reference_id = event.source_entity_id;

    match event.event_type.as_str() {
        "proposal.created" => payload_id(event, "client_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "New quote received".to_string(),
                message: "A provider sent a quote for your service request.".to_string(),
                kind: KIND_PROPOSAL.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "proposal.accepted" => payload_id(event, "mechanic_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Proposal accepted".to_string(),
                message: "Your quote was accepted. Head out when you are ready.".to_string(),
                kind: KIND_PROPOSAL.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "proposal.rejected" => payload_id(event, "mechanic_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Proposal rejected".to_string(),
                message: "The client declined your quote.".to_string(),
                kind: KIND_PROPOSAL.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "payment.confirmed" => {
            let mut out = Vec::new();
            if let Some(client_id) = payload_id(event, "client_id") {
                out.push(CreateNotification {
                    recipient_id: client_id,
                    title: "Payment confirmed".to_string(),
                    message: "Your payment went through.".to_string(),
                    kind: KIND_PAYMENT.to_string(),
                    reference_id,
                });
            }
            if let Some(mechanic_id) = payload_id(event, "mechanic_id") {
                out.push(CreateNotification {
                    recipient_id: mechanic_id,
                    title: "Payment confirmed".to_string(),
                    message: "The client's payment settled. Your share is on the way.".to_string(),
                    kind: KIND_PAYMENT.to_string(),
                    reference_id,
                });
            }
            out
        }

        "payment.failed" => payload_id(event, "client_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Payment failed".to_string(),
                message: "Your payment did not go through. Please try another method.".to_string(),
                kind: KIND_PAYMENT.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "request.started" => payload_id(event, "requester_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Provider on the job".to_string(),
                message: "Your provider started working on the request.".to_string(),
                kind: KIND_REQUEST.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "request.completed" => payload_id(event, "requester_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Service completed".to_string(),
                message: "Your service request was marked completed.".to_string(),
                kind: KIND_REQUEST.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        "request.cancelled" => payload_id(event, "provider_id")
            .map(|recipient_id| CreateNotification {
                recipient_id,
                title: "Request cancelled".to_string(),
                message: "The client cancelled the service request.".to_string(),
                kind: KIND_REQUEST.to_string(),
                reference_id,
            })
            .into_iter()
            .collect(),

        _ => Vec::new(),
    }
}

/// Pull a user id out of the event payload.
fn payload_id(event: &PlatformEvent, key: &str) -> Option<DbId> {
    event.payload.get(key).and_then(|v| v.as_i64())
}
