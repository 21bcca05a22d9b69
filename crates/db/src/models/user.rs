//! User entity model and DTOs.

use basho_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses
/// directly. Use [`UserResponse`] or [`ProfileResponse`] for output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub billing_address1: Option<String>,
    pub billing_address2: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_zip: Option<String>,
    pub billing_country: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Compact user representation for auth responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Full profile representation including contact and billing details.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub billing_address1: Option<String>,
    pub billing_address2: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_zip: Option<String>,
    pub billing_country: Option<String>,
    pub created_at: Timestamp,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            phone: user.phone,
            billing_address1: user.billing_address1,
            billing_address2: user.billing_address2,
            billing_city: user.billing_city,
            billing_state: user.billing_state,
            billing_zip: user.billing_zip,
            billing_country: user.billing_country,
            created_at: user.created_at,
        }
    }
}

/// DTO for creating a new user. The hash is computed by the caller.
#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: String,
}

/// DTO for partially updating profile fields. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address1: Option<String>,
    pub billing_address2: Option<String>,
    pub billing_city: Option<String>,
    pub billing_state: Option<String>,
    pub billing_zip: Option<String>,
    pub billing_country: Option<String>,
}

impl UpdateProfile {
    /// True when at least one field is present.
    pub fn has_changes(&self) -> bool {
        self.full_name.is_some()
            || self.email.is_some()
            || self.phone.is_some()
            || self.billing_address1.is_some()
            || self.billing_address2.is_some()
            || self.billing_city.is_some()
            || self.billing_state.is_some()
            || self.billing_zip.is_some()
            || self.billing_country.is_some()
    }
}
