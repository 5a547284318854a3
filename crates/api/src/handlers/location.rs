//! Handlers for geolocation reporting and provider position lookup.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use wayside_core::error::CoreError;
use wayside_core::geo::{resolve_position, GeoFailure, PositionFix, ResolvedPosition};
use wayside_core::roles::is_provider_role;
use wayside_core::types::{DbId, Timestamp};
use wayside_db::repositories::{ProviderStatsRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `PUT /location`: either a fix or a failure reason.
///
/// Exactly one of `fix` / `failure` must be present; a failure report
/// still results in a stored position (the fallback coordinate).
#[derive(Debug, Deserialize)]
pub struct LocationReport {
    pub fix: Option<PositionFix>,
    pub failure: Option<GeoFailure>,
}

/// A provider's last-known position.
#[derive(Debug, Serialize)]
pub struct ProviderLocation {
    pub provider_id: DbId,
    pub lat: f64,
    pub lng: f64,
    pub recorded_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// PUT /api/v1/location
///
/// Record the caller's position. Provider roles additionally update
/// their `provider_stats` row so dispatch views see a live position.
pub async fn report_location(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<LocationReport>,
) -> AppResult<Json<DataResponse<ResolvedPosition>>> {
    if input.fix.is_none() && input.failure.is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "Report must carry either a fix or a failure reason".into(),
        )));
    }

    let resolved = resolve_position(input.fix, chrono::Utc::now())?;
    if resolved.is_fallback {
        tracing::debug!(
            user_id = auth.user_id,
            reason = ?input.failure,
            "Position fix failed, storing fallback coordinate"
        );
    }

    UserRepo::update_location(
        &state.pool,
        auth.user_id,
        resolved.coords.lat,
        resolved.coords.lng,
        resolved.recorded_at,
    )
    .await?;

    if is_provider_role(&auth.role) {
        ProviderStatsRepo::upsert_location(
            &state.pool,
            auth.user_id,
            resolved.coords.lat,
            resolved.coords.lng,
            resolved.recorded_at,
        )
        .await?;
    }

    Ok(Json(DataResponse { data: resolved }))
}

/// GET /api/v1/providers/{id}/location
///
/// A provider's last-known position, for clients tracking an en-route
/// mechanic or tow truck.
pub async fn get_provider_location(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(provider_id): Path<DbId>,
) -> AppResult<Json<DataResponse<ProviderLocation>>> {
    let stats = ProviderStatsRepo::get(&state.pool, provider_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Provider",
            id: provider_id,
        }))?;

    match (stats.last_lat, stats.last_lng, stats.last_location_at) {
        (Some(lat), Some(lng), Some(recorded_at)) => Ok(Json(DataResponse {
            data: ProviderLocation {
                provider_id,
                lat,
                lng,
                recorded_at,
            },
        })),
        _ => Err(AppError::Core(CoreError::NotFound {
            entity: "Provider location",
            id: provider_id,
        })),
    }
}
