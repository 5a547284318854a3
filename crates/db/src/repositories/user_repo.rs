//! Repository for the `users` table.

use sqlx::PgPool;
use wayside_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateProfile, User};

/// Column list for `users` queries.
const COLUMNS: &str = "id, username, email, password_hash, role, full_name, phone, \
     gateway_account_id, last_lat, last_lng, last_location_at, is_active, \
     failed_login_count, locked_until, last_login_at, created_at, updated_at";

/// Provides CRUD and auth-bookkeeping operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user and return the full row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, role, full_name, phone) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .bind(&input.full_name)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Bump the consecutive failed-login counter.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock the account until the given instant.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        locked_until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(locked_until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Reset the failure counter, clear any lock, and stamp `last_login_at`.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users \
             SET failed_login_count = 0, locked_until = NULL, last_login_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Update the caller's profile fields. Absent fields keep their value.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users \
             SET full_name = COALESCE($2, full_name), \
                 phone = COALESCE($3, phone), \
                 gateway_account_id = COALESCE($4, gateway_account_id), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.phone)
            .bind(&input.gateway_account_id)
            .fetch_optional(pool)
            .await
    }

    /// Write a resolved position onto the user row.
    pub async fn update_location(
        pool: &PgPool,
        id: DbId,
        lat: f64,
        lng: f64,
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users \
             SET last_lat = $2, last_lng = $3, last_location_at = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(lat)
        .bind(lng)
        .bind(recorded_at)
        .execute(pool)
        .await?;
        Ok(())
    }
}
