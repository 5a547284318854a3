//! User entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `users` table.
///
/// The password hash is deliberately excluded from serialization.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Payout account at the payment gateway. Required before a provider
    /// can have a proposal accepted (the charge split needs a recipient).
    pub gateway_account_id: Option<String>,
    pub last_lat: Option<f64>,
    pub last_lng: Option<f64>,
    pub last_location_at: Option<Timestamp>,
    pub is_active: bool,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting a new user row.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub full_name: String,
    pub phone: Option<String>,
}

/// DTO for updating the caller's own profile fields.
#[derive(Debug, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub gateway_account_id: Option<String>,
}
