//! Repository for the `proposals` table.
//!
//! Same conditional-update discipline as the service-request repo: the
//! accept path races on `status = 'pending'`, so a double-accept loses
//! and surfaces as a conflict.

use sqlx::PgPool;
use wayside_core::types::{Cents, DbId};

use crate::models::proposal::Proposal;

/// Column list for `proposals` queries.
const COLUMNS: &str = "id, service_request_id, mechanic_id, client_id, amount_cents, \
     platform_fee_cents, total_cents, status, external_payment_id, created_at, updated_at";

/// Provides lifecycle operations for proposals.
pub struct ProposalRepo;

impl ProposalRepo {
    /// Insert a proposal in `pending` state. Fee columns come from the
    /// configured schedule, computed by the caller.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        service_request_id: DbId,
        mechanic_id: DbId,
        client_id: DbId,
        amount_cents: Cents,
        platform_fee_cents: Cents,
        total_cents: Cents,
    ) -> Result<Proposal, sqlx::Error> {
        let query = format!(
            "INSERT INTO proposals \
             (service_request_id, mechanic_id, client_id, amount_cents, platform_fee_cents, total_cents) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(service_request_id)
            .bind(mechanic_id)
            .bind(client_id)
            .bind(amount_cents)
            .bind(platform_fee_cents)
            .bind(total_cents)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all proposals against a request, oldest first.
    pub async fn list_for_request(
        pool: &PgPool,
        service_request_id: DbId,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE service_request_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(service_request_id)
            .fetch_all(pool)
            .await
    }

    /// List proposals submitted by a mechanic, newest first.
    pub async fn list_for_mechanic(
        pool: &PgPool,
        mechanic_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE mechanic_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(mechanic_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Accept: `pending -> accepted`, guarded by the proposal's client.
    ///
    /// Returns the updated row, or `None` if the proposal was not
    /// pending (already accepted/rejected) or not addressed to the
    /// caller -- the double-accept guard.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        client_id: DbId,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!(
            "UPDATE proposals SET status = 'accepted', updated_at = NOW() \
             WHERE id = $1 AND client_id = $2 AND status = 'pending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(id)
            .bind(client_id)
            .fetch_optional(pool)
            .await
    }

    /// Reject: `pending -> rejected`, guarded by the proposal's client.
    pub async fn reject(pool: &PgPool, id: DbId, client_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proposals SET status = 'rejected', updated_at = NOW() \
             WHERE id = $1 AND client_id = $2 AND status = 'pending'",
        )
        .bind(id)
        .bind(client_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record the gateway charge id on a freshly accepted proposal.
    pub async fn set_external_payment(
        pool: &PgPool,
        id: DbId,
        external_payment_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE proposals SET external_payment_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(external_payment_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Settle: `accepted -> paid`. Idempotent between the polling worker
    /// and the webhook -- whichever lands second affects zero rows.
    pub async fn mark_paid(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proposals SET status = 'paid', updated_at = NOW() \
             WHERE id = $1 AND status = 'accepted'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Close out: `paid -> completed`, guarded by the proposal's mechanic.
    pub async fn complete(pool: &PgPool, id: DbId, mechanic_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE proposals SET status = 'completed', updated_at = NOW() \
             WHERE id = $1 AND mechanic_id = $2 AND status = 'paid'",
        )
        .bind(id)
        .bind(mechanic_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a proposal by its gateway charge id (webhook reconciliation).
    pub async fn find_by_external_payment(
        pool: &PgPool,
        external_payment_id: &str,
    ) -> Result<Option<Proposal>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM proposals WHERE external_payment_id = $1");
        sqlx::query_as::<_, Proposal>(&query)
            .bind(external_payment_id)
            .fetch_optional(pool)
            .await
    }

    /// Proposals accepted but not yet settled, for the polling worker.
    pub async fn list_awaiting_settlement(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<Proposal>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM proposals \
             WHERE status = 'accepted' AND external_payment_id IS NOT NULL \
             ORDER BY updated_at ASC \
             LIMIT $1"
        );
        sqlx::query_as::<_, Proposal>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
