//! Repository for the `service_requests` table.
//!
//! Status mutations are conditional updates (`WHERE status = $expected`,
//! plus an actor guard where the transition is role-restricted). A
//! `false` return means the row was not in the expected state -- callers
//! surface that as a conflict, never as a silent overwrite.

use sqlx::PgPool;
use wayside_core::request_status::RequestStatus;
use wayside_core::types::{Cents, DbId};

use crate::models::service_request::ServiceRequest;

/// Column list for `service_requests` queries.
const COLUMNS: &str = "id, requester_id, vehicle_id, description, status, assigned_provider_id, \
     price_cents, lat, lng, cancelled_reason, created_at, updated_at";

/// Provides lifecycle operations for service requests.
pub struct ServiceRequestRepo;

impl ServiceRequestRepo {
    /// Open a new request in `pending` state.
    pub async fn create(
        pool: &PgPool,
        requester_id: DbId,
        vehicle_id: DbId,
        description: &str,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> Result<ServiceRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO service_requests (requester_id, vehicle_id, description, lat, lng) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(requester_id)
            .bind(vehicle_id)
            .bind(description)
            .bind(lat)
            .bind(lng)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ServiceRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM service_requests WHERE id = $1");
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a requester's own requests, optionally filtered by status,
    /// newest first.
    pub async fn list_for_requester(
        pool: &PgPool,
        requester_id: DbId,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let filter = if status.is_some() { "AND status = $4" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests \
             WHERE requester_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let mut q = sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(requester_id)
            .bind(limit)
            .bind(offset);
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }
        q.fetch_all(pool).await
    }

    /// List requests open for quoting (`pending` or `quoted`), oldest
    /// first so providers see the longest-waiting clients at the top.
    pub async fn list_open(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests \
             WHERE status IN ('pending', 'quoted') \
             ORDER BY created_at ASC, id ASC \
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// List requests assigned to a provider, optionally filtered by status.
    pub async fn list_for_provider(
        pool: &PgPool,
        provider_id: DbId,
        status: Option<RequestStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ServiceRequest>, sqlx::Error> {
        let filter = if status.is_some() { "AND status = $4" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM service_requests \
             WHERE assigned_provider_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        let mut q = sqlx::query_as::<_, ServiceRequest>(&query)
            .bind(provider_id)
            .bind(limit)
            .bind(offset);
        if let Some(status) = status {
            q = q.bind(status.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Move a request between two statuses with no extra side effects.
    ///
    /// Returns `false` when the row was not in `from` (lost race or
    /// illegal precondition).
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        from: RequestStatus,
        to: RequestStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Accept a proposal's terms: assign the provider, record the agreed
    /// price, and move the request to `accepted` in one statement.
    pub async fn accept(
        pool: &PgPool,
        id: DbId,
        from: RequestStatus,
        provider_id: DbId,
        price_cents: Cents,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests \
             SET status = 'accepted', assigned_provider_id = $3, price_cents = $4, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(from.as_str())
        .bind(provider_id)
        .bind(price_cents)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cancel a request. Guarded by requester and current status.
    pub async fn cancel(
        pool: &PgPool,
        id: DbId,
        requester_id: DbId,
        from: RequestStatus,
        reason: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests \
             SET status = 'cancelled', cancelled_reason = $4, updated_at = NOW() \
             WHERE id = $1 AND requester_id = $2 AND status = $3",
        )
        .bind(id)
        .bind(requester_id)
        .bind(from.as_str())
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Start work: `accepted -> in_progress`, guarded by the assigned
    /// provider.
    pub async fn start(pool: &PgPool, id: DbId, provider_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests SET status = 'in_progress', updated_at = NOW() \
             WHERE id = $1 AND assigned_provider_id = $2 AND status = 'accepted'",
        )
        .bind(id)
        .bind(provider_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Finish work: `in_progress -> completed`, guarded by the assigned
    /// provider.
    pub async fn complete(pool: &PgPool, id: DbId, provider_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE service_requests SET status = 'completed', updated_at = NOW() \
             WHERE id = $1 AND assigned_provider_id = $2 AND status = 'in_progress'",
        )
        .bind(id)
        .bind(provider_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count a requester's rows per status (dashboard aggregate).
    pub async fn count_by_status_for_requester(
        pool: &PgPool,
        requester_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM service_requests \
             WHERE requester_id = $1 GROUP BY status",
        )
        .bind(requester_id)
        .fetch_all(pool)
        .await
    }

    /// Count a provider's assigned rows per status (dashboard aggregate).
    pub async fn count_by_status_for_provider(
        pool: &PgPool,
        provider_id: DbId,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM service_requests \
             WHERE assigned_provider_id = $1 GROUP BY status",
        )
        .bind(provider_id)
        .fetch_all(pool)
        .await
    }
}
