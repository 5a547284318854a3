//! Notification entity models.

use serde::Serialize;
use sqlx::FromRow;
use wayside_core::types::{DbId, Timestamp};

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub reference_id: Option<DbId>,
    pub is_read: bool,
    pub read_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// Input for inserting a notification row.
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub recipient_id: DbId,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub reference_id: Option<DbId>,
}
