//! Well-known role name constants.
//!
//! These must match the CHECK constraint on `users.role` in the
//! `create_users_table` migration.

pub const ROLE_USER: &str = "user";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_VOLUNTEER: &str = "volunteer";
