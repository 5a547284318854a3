//! Plan and subscription entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::types::{Cents, DbId, Timestamp};

/// A row from the `plans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Plan {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub price_cents: Cents,
    pub billing_period: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// A row from the `subscriptions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub user_id: DbId,
    pub plan_id: DbId,
    pub status: String,
    pub current_period_start: Timestamp,
    pub current_period_end: Timestamp,
    pub cancel_at_period_end: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for subscribing to a plan.
#[derive(Debug, Deserialize)]
pub struct CreateSubscription {
    pub plan_id: DbId,
}
