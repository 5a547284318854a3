//! Vehicle entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `vehicles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Vehicle {
    pub id: DbId,
    pub owner_id: DbId,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage_km: Option<i32>,
    pub fuel_type: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a vehicle. The plate is validated and normalized
/// before insert; `fuel_type` must be one of the core fuel-type values.
#[derive(Debug, Deserialize)]
pub struct CreateVehicle {
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage_km: Option<i32>,
    pub fuel_type: String,
}

/// DTO for updating mutable vehicle fields.
#[derive(Debug, Deserialize)]
pub struct UpdateVehicle {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage_km: Option<i32>,
    pub fuel_type: Option<String>,
}
