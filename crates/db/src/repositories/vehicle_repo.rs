//! Repository for the `vehicles` table.
//!
//! Every query is scoped by `owner_id`, so ownership is enforced at the
//! query level rather than trusted from the caller.

use sqlx::PgPool;
use wayside_core::types::DbId;

use crate::models::vehicle::{UpdateVehicle, Vehicle};

/// Column list for `vehicles` queries.
const COLUMNS: &str =
    "id, owner_id, plate, brand, model, year, mileage_km, fuel_type, created_at, updated_at";

/// Provides owner-scoped CRUD operations for vehicles.
pub struct VehicleRepo;

impl VehicleRepo {
    /// Insert a vehicle for an owner. The plate must already be normalized.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        plate: &str,
        brand: &str,
        model: &str,
        year: i32,
        mileage_km: Option<i32>,
        fuel_type: &str,
    ) -> Result<Vehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO vehicles (owner_id, plate, brand, model, year, mileage_km, fuel_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(owner_id)
            .bind(plate)
            .bind(brand)
            .bind(model)
            .bind(year)
            .bind(mileage_km)
            .bind(fuel_type)
            .fetch_one(pool)
            .await
    }

    /// List all vehicles registered to an owner, newest first.
    pub async fn list_for_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Vehicle>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM vehicles WHERE owner_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch one vehicle, scoped to its owner.
    pub async fn find_for_owner(
        pool: &PgPool,
        vehicle_id: DbId,
        owner_id: DbId,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM vehicles WHERE id = $1 AND owner_id = $2");
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(vehicle_id)
            .bind(owner_id)
            .fetch_optional(pool)
            .await
    }

    /// Update mutable fields; absent fields keep their value.
    pub async fn update(
        pool: &PgPool,
        vehicle_id: DbId,
        owner_id: DbId,
        input: &UpdateVehicle,
    ) -> Result<Option<Vehicle>, sqlx::Error> {
        let query = format!(
            "UPDATE vehicles \
             SET brand = COALESCE($3, brand), \
                 model = COALESCE($4, model), \
                 year = COALESCE($5, year), \
                 mileage_km = COALESCE($6, mileage_km), \
                 fuel_type = COALESCE($7, fuel_type), \
                 updated_at = NOW() \
             WHERE id = $1 AND owner_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Vehicle>(&query)
            .bind(vehicle_id)
            .bind(owner_id)
            .bind(&input.brand)
            .bind(&input.model)
            .bind(input.year)
            .bind(input.mileage_km)
            .bind(&input.fuel_type)
            .fetch_optional(pool)
            .await
    }

    /// Delete a vehicle, scoped to its owner. Returns `true` when a row
    /// was removed.
    pub async fn delete(
        pool: &PgPool,
        vehicle_id: DbId,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1 AND owner_id = $2")
            .bind(vehicle_id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
