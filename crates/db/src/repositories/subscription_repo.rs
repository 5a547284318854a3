//! Repository for the `plans` and `subscriptions` tables.
//!
//! "One active subscription per user" is enforced by the partial unique
//! index `uq_subscriptions_one_active`; a second subscribe attempt fails
//! with a 23505 that the API layer maps to 409.

use sqlx::PgPool;
use wayside_core::types::{DbId, Timestamp};

use crate::models::subscription::{Plan, Subscription};

/// Column list for `plans` queries.
const PLAN_COLUMNS: &str =
    "id, code, name, description, price_cents, billing_period, is_active, created_at";

/// Column list for `subscriptions` queries.
const SUB_COLUMNS: &str = "id, user_id, plan_id, status, current_period_start, \
     current_period_end, cancel_at_period_end, created_at, updated_at";

/// Provides plan-catalog reads and subscription lifecycle writes.
pub struct SubscriptionRepo;

impl SubscriptionRepo {
    /// List plans currently offered for sale.
    pub async fn list_active_plans(pool: &PgPool) -> Result<Vec<Plan>, sqlx::Error> {
        let query =
            format!("SELECT {PLAN_COLUMNS} FROM plans WHERE is_active = true ORDER BY price_cents");
        sqlx::query_as::<_, Plan>(&query).fetch_all(pool).await
    }

    pub async fn find_plan(pool: &PgPool, plan_id: DbId) -> Result<Option<Plan>, sqlx::Error> {
        let query = format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = $1 AND is_active = true");
        sqlx::query_as::<_, Plan>(&query)
            .bind(plan_id)
            .fetch_optional(pool)
            .await
    }

    /// Open an active subscription for a user.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        plan_id: DbId,
        period_start: Timestamp,
        period_end: Timestamp,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions (user_id, plan_id, current_period_start, current_period_end) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {SUB_COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(plan_id)
            .bind(period_start)
            .bind(period_end)
            .fetch_one(pool)
            .await
    }

    /// The user's active subscription, if any.
    pub async fn current_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "SELECT {SUB_COLUMNS} FROM subscriptions \
             WHERE user_id = $1 AND status = 'active'"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Flip the cancel-at-period-end flag on the user's active
    /// subscription. Returns the updated row if one existed.
    pub async fn set_cancel_at_period_end(
        pool: &PgPool,
        user_id: DbId,
        cancel: bool,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET cancel_at_period_end = $2, updated_at = NOW() \
             WHERE user_id = $1 AND status = 'active' \
             RETURNING {SUB_COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(user_id)
            .bind(cancel)
            .fetch_optional(pool)
            .await
    }

    /// Expire subscriptions whose period has lapsed: flagged ones become
    /// `cancelled`, unflagged ones `expired` (renewal is a new row).
    /// Returns the number of rows closed. Run periodically by the worker.
    pub async fn close_lapsed(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE subscriptions \
             SET status = CASE WHEN cancel_at_period_end THEN 'cancelled' ELSE 'expired' END, \
                 updated_at = NOW() \
             WHERE status = 'active' AND current_period_end <= $1",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
