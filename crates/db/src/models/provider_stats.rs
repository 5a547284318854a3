//! Provider operational stats models.

use serde::Serialize;
use sqlx::FromRow;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `provider_stats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProviderStats {
    pub user_id: DbId,
    pub completed_jobs: i32,
    pub active_jobs: i32,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_location_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}
