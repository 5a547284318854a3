//! Geolocation types and the fallback-substitution rule.
//!
//! Clients report either a position fix or a failure reason. A failed
//! fix never leaves the profile's location unset: the platform
//! substitutes a fixed fallback coordinate (São Paulo city center) with
//! the current server time. The substitution happens here, in one place.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Fallback position reported when the client cannot obtain a fix:
/// São Paulo city center.
pub const FALLBACK_COORDINATES: Coordinates = Coordinates {
    lat: -23.5505,
    lng: -46.6333,
};

impl Coordinates {
    /// Validate latitude/longitude ranges.
    pub fn validated(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoreError::Validation(format!("Latitude out of range: {lat}")));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(CoreError::Validation(format!(
                "Longitude out of range: {lng}"
            )));
        }
        Ok(Self { lat, lng })
    }
}

// ---------------------------------------------------------------------------
// Position reports
// ---------------------------------------------------------------------------

/// Why a client could not obtain a position fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoFailure {
    PermissionDenied,
    Unavailable,
    Timeout,
}

/// A successful position fix as reported by a client.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionFix {
    pub lat: f64,
    pub lng: f64,
    /// Reported horizontal accuracy in meters, if the device supplied one.
    pub accuracy_m: Option<f64>,
    /// When the device recorded the fix. Defaults to the server clock.
    pub recorded_at: Option<Timestamp>,
}

/// The position actually written to the profile row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResolvedPosition {
    pub coords: Coordinates,
    pub recorded_at: Timestamp,
    /// True when the fallback coordinate was substituted for a failed fix.
    pub is_fallback: bool,
}

/// Resolve a client report into the position to persist.
///
/// A fix is validated and used as-is (with the server clock when the
/// device omitted a timestamp). A failure substitutes
/// [`FALLBACK_COORDINATES`] and the server clock, so the stored location
/// and its timestamp are always set.
pub fn resolve_position(
    fix: Option<PositionFix>,
    now: Timestamp,
) -> Result<ResolvedPosition, CoreError> {
    match fix {
        Some(fix) => {
            let coords = Coordinates::validated(fix.lat, fix.lng)?;
            Ok(ResolvedPosition {
                coords,
                recorded_at: fix.recorded_at.unwrap_or(now),
                is_fallback: false,
            })
        }
        None => Ok(ResolvedPosition {
            coords: FALLBACK_COORDINATES,
            recorded_at: now,
            is_fallback: true,
        }),
    }
}
