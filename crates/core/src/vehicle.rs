//! Vehicle field validation: plate formats, model year, fuel types.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Plate validation
// ---------------------------------------------------------------------------

/// Legacy Brazilian plate: three letters + four digits, optional hyphen
/// (`ABC1234`, `ABC-1234`).
fn legacy_plate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}-?\d{4}$").unwrap())
}

/// Mercosul plate: `ABC1D23`.
fn mercosul_plate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3}\d[A-Z]\d{2}$").unwrap())
}

/// Validate and normalize a license plate.
///
/// Accepts legacy (`ABC1234`, `ABC-1234`) and Mercosul (`ABC1D23`)
/// formats, case-insensitively. Returns the canonical form: uppercase,
/// no hyphen.
pub fn normalize_plate(input: &str) -> Result<String, CoreError> {
    let candidate = input.trim().to_uppercase();
    if legacy_plate_re().is_match(&candidate) || mercosul_plate_re().is_match(&candidate) {
        Ok(candidate.replace('-', ""))
    } else {
        Err(CoreError::Validation(format!(
            "Invalid license plate: {input}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Year validation
// ---------------------------------------------------------------------------

/// Oldest model year the platform accepts.
pub const MIN_VEHICLE_YEAR: i32 = 1900;

/// Validate a model year against the allowed range
/// (`MIN_VEHICLE_YEAR ..= current_year + 1`; next-year models are sold
/// before the calendar turns).
pub fn validate_year(year: i32, current_year: i32) -> Result<(), CoreError> {
    let max = current_year + 1;
    if (MIN_VEHICLE_YEAR..=max).contains(&year) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Vehicle year {year} outside allowed range {MIN_VEHICLE_YEAR}..={max}"
        )))
    }
}

// ---------------------------------------------------------------------------
// Fuel types
// ---------------------------------------------------------------------------

/// Fuel type of a registered vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FuelType {
    Gasoline,
    Ethanol,
    Flex,
    Diesel,
    Electric,
    Hybrid,
}

impl FuelType {
    /// The stored column value for this fuel type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gasoline => "gasoline",
            Self::Ethanol => "ethanol",
            Self::Flex => "flex",
            Self::Diesel => "diesel",
            Self::Electric => "electric",
            Self::Hybrid => "hybrid",
        }
    }

    /// Parse a stored column value.
    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "gasoline" => Ok(Self::Gasoline),
            "ethanol" => Ok(Self::Ethanol),
            "flex" => Ok(Self::Flex),
            "diesel" => Ok(Self::Diesel),
            "electric" => Ok(Self::Electric),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(CoreError::Validation(format!("Unknown fuel type: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plate_accepts_known_formats() {
        assert_eq!(normalize_plate("ABC1234").unwrap(), "ABC1234");
        assert_eq!(normalize_plate("ABC-1234").unwrap(), "ABC1234");
        assert_eq!(normalize_plate("ABC1D23").unwrap(), "ABC1D23");
    }

    #[test]
    fn test_plate_normalizes_case_and_whitespace() {
        assert_eq!(normalize_plate(" abc1d23 ").unwrap(), "ABC1D23");
        assert_eq!(normalize_plate("abc-1234").unwrap(), "ABC1234");
    }

    #[test]
    fn test_plate_rejects_malformed() {
        assert!(normalize_plate("AB123").is_err());
        assert!(normalize_plate("1234ABC").is_err());
        assert!(normalize_plate("ABCD123").is_err());
        assert!(normalize_plate("").is_err());
    }

    #[test]
    fn test_year_range_boundaries() {
        let current = 2026;
        assert!(validate_year(1900, current).is_ok());
        assert!(validate_year(current + 1, current).is_ok());
        assert!(validate_year(1899, current).is_err());
        assert!(validate_year(current + 2, current).is_err());
    }

    #[test]
    fn test_fuel_type_round_trips() {
        for fuel in [
            FuelType::Gasoline,
            FuelType::Ethanol,
            FuelType::Flex,
            FuelType::Diesel,
            FuelType::Electric,
            FuelType::Hybrid,
        ] {
            assert_eq!(FuelType::parse(fuel.as_str()).unwrap(), fuel);
        }
        assert!(FuelType::parse("steam").is_err());
    }
}
