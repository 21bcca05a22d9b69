//! Event entity model and DTOs.

use basho_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full event row from the `events` table.
///
/// Every field is public information, so the row serializes directly.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub location: String,
    pub price_cents: i64,
    pub image_url: String,
    /// `None` means unlimited seating.
    pub capacity: Option<i32>,
    pub category: String,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an event.
///
/// Unknown fields are rejected rather than ignored; admin payloads must
/// match this shape exactly.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEvent {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Timestamp,
    pub location: String,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub capacity: Option<i32>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// DTO for partially updating an event. Only non-`None` fields apply.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub location: Option<String>,
    pub price_cents: Option<i64>,
    pub image_url: Option<String>,
    pub capacity: Option<i32>,
    pub category: Option<String>,
    pub status: Option<String>,
}

/// Event row joined with sales totals for the admin dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventSales {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: Timestamp,
    pub location: String,
    pub price_cents: i64,
    pub image_url: String,
    pub capacity: Option<i32>,
    pub category: String,
    pub status: String,
    pub created_at: Timestamp,
    pub tickets_sold: i64,
    pub revenue_cents: i64,
}
