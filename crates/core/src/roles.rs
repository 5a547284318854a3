//! Well-known role name constants.
//!
//! These must match the check constraint on `users.role` in
//! `0001_create_users.sql`.

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_MECHANIC: &str = "mechanic";
pub const ROLE_TOW: &str = "tow";
pub const ROLE_INSURER: &str = "insurer";
pub const ROLE_ADMIN: &str = "admin";

/// Roles that may be chosen at self-registration. Admin accounts are seeded.
pub const REGISTERABLE_ROLES: &[&str] = &[ROLE_CLIENT, ROLE_MECHANIC, ROLE_TOW, ROLE_INSURER];

/// Whether the role is a service provider (receives assignments and
/// reports its position into `provider_stats`).
pub fn is_provider_role(role: &str) -> bool {
    role == ROLE_MECHANIC || role == ROLE_TOW
}

/// Whether the role may be selected in the registration flow.
pub fn is_registerable_role(role: &str) -> bool {
    REGISTERABLE_ROLES.contains(&role)
}
