//! Proposal entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::types::{Cents, DbId, Timestamp};

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Proposal {
    pub id: DbId,
    pub service_request_id: DbId,
    pub mechanic_id: DbId,
    pub client_id: DbId,
    pub amount_cents: Cents,
    pub platform_fee_cents: Cents,
    pub total_cents: Cents,
    pub status: String,
    pub external_payment_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for submitting a proposal. Fee and total are computed server-side
/// from the configured schedule, never taken from the caller.
#[derive(Debug, Deserialize)]
pub struct CreateProposal {
    pub service_request_id: DbId,
    pub amount_cents: Cents,
}
