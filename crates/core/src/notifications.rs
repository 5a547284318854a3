//! Well-known notification kind constants.
//!
//! These must match the check constraint on `notifications.kind` and the
//! `kind` field rendered by clients.

/// Service-request lifecycle updates (new quote, status change).
pub const KIND_REQUEST: &str = "request";

/// Proposal lifecycle updates (received, accepted, rejected).
pub const KIND_PROPOSAL: &str = "proposal";

/// Payment settlement updates (confirmed, failed, refunded).
pub const KIND_PAYMENT: &str = "payment";

/// Platform announcements not tied to a specific entity.
pub const KIND_SYSTEM: &str = "system";
