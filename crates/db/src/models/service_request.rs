//! Service-request entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::types::{Cents, DbId, Timestamp};

/// A row from the `service_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ServiceRequest {
    pub id: DbId,
    pub requester_id: DbId,
    pub vehicle_id: DbId,
    pub description: String,
    pub status: String,
    pub assigned_provider_id: Option<DbId>,
    pub price_cents: Option<Cents>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub cancelled_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for opening a service request. The breakdown location is optional;
/// when omitted, providers see the requester's last profile position.
#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub vehicle_id: DbId,
    pub description: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
