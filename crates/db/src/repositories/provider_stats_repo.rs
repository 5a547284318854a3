//! Repository for the `provider_stats` table.

use sqlx::PgPool;
use wayside_core::types::{DbId, Timestamp};

use crate::models::provider_stats::ProviderStats;

/// Column list for `provider_stats` queries.
const COLUMNS: &str =
    "user_id, completed_jobs, active_jobs, last_lat, last_lng, last_location_at, updated_at";

/// Provides upsert-style writes for provider operational stats.
pub struct ProviderStatsRepo;

impl ProviderStatsRepo {
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<ProviderStats>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM provider_stats WHERE user_id = $1");
        sqlx::query_as::<_, ProviderStats>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Record a provider's position, creating the stats row on first
    /// report.
    pub async fn upsert_location(
        pool: &PgPool,
        user_id: DbId,
        lat: f64,
        lng: f64,
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO provider_stats (user_id, last_lat, last_lng, last_location_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id) DO UPDATE \
             SET last_lat = $2, last_lng = $3, last_location_at = $4, updated_at = NOW()",
        )
        .bind(user_id)
        .bind(lat)
        .bind(lng)
        .bind(recorded_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Count a newly assigned job.
    pub async fn record_assignment(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO provider_stats (user_id, active_jobs) VALUES ($1, 1) \
             ON CONFLICT (user_id) DO UPDATE \
             SET active_jobs = provider_stats.active_jobs + 1, updated_at = NOW()",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Move one job from active to completed.
    pub async fn record_completion(pool: &PgPool, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO provider_stats (user_id, completed_jobs) VALUES ($1, 1) \
             ON CONFLICT (user_id) DO UPDATE \
             SET completed_jobs = provider_stats.completed_jobs + 1, \
                 active_jobs = GREATEST(provider_stats.active_jobs - 1, 0), \
                 updated_at = NOW()",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(())
    }
}
