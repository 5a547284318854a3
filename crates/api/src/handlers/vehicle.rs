//! Handlers for the `/vehicles` resource.
//!
//! All endpoints are scoped to the authenticated owner; plate format and
//! model year are validated server-side before any insert or update.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Datelike;
use wayside_core::error::CoreError;
use wayside_core::types::DbId;
use wayside_core::vehicle::{normalize_plate, validate_year, FuelType};
use wayside_db::models::vehicle::{CreateVehicle, UpdateVehicle, Vehicle};
use wayside_db::repositories::VehicleRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/vehicles
///
/// Register a vehicle. The plate is normalized to its canonical form.
pub async fn create_vehicle(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVehicle>,
) -> AppResult<(StatusCode, Json<DataResponse<Vehicle>>)> {
    // 1. Validate before insert.
    let plate = normalize_plate(&input.plate)?;
    validate_year(input.year, chrono::Utc::now().year())?;
    let fuel_type = FuelType::parse(&input.fuel_type)?;
    if let Some(km) = input.mileage_km {
        if km < 0 {
            return Err(AppError::Core(CoreError::Validation(
                "Mileage cannot be negative".into(),
            )));
        }
    }

    // 2. Insert. A duplicate plate for the same owner surfaces as 409.
    let vehicle = VehicleRepo::create(
        &state.pool,
        auth.user_id,
        &plate,
        &input.brand,
        &input.model,
        input.year,
        input.mileage_km,
        fuel_type.as_str(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: vehicle })))
}

/// GET /api/v1/vehicles
///
/// List the caller's vehicles, newest first.
pub async fn list_vehicles(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Vehicle>>>> {
    let vehicles = VehicleRepo::list_for_owner(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: vehicles }))
}

/// GET /api/v1/vehicles/{id}
pub async fn get_vehicle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vehicle_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    let vehicle = VehicleRepo::find_for_owner(&state.pool, vehicle_id, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id: vehicle_id,
        }))?;

    Ok(Json(DataResponse { data: vehicle }))
}

/// PUT /api/v1/vehicles/{id}
///
/// Update mutable fields. The plate is immutable once registered.
pub async fn update_vehicle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vehicle_id): Path<DbId>,
    Json(input): Json<UpdateVehicle>,
) -> AppResult<Json<DataResponse<Vehicle>>> {
    if let Some(year) = input.year {
        validate_year(year, chrono::Utc::now().year())?;
    }
    if let Some(fuel) = &input.fuel_type {
        FuelType::parse(fuel)?;
    }

    let vehicle = VehicleRepo::update(&state.pool, vehicle_id, auth.user_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id: vehicle_id,
        }))?;

    Ok(Json(DataResponse { data: vehicle }))
}

/// DELETE /api/v1/vehicles/{id}
///
/// Remove a vehicle. Returns 204 No Content on success.
pub async fn delete_vehicle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(vehicle_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = VehicleRepo::delete(&state.pool, vehicle_id, auth.user_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Vehicle",
            id: vehicle_id,
        }));
    }

    Ok(StatusCode::NO_CONTENT)
}
