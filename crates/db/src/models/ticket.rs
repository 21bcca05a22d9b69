//! Ticket entity model and joined projections.

use basho_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full ticket row from the `tickets` table.
///
/// Internal shape; external responses use [`TicketWithEvent`] or the
/// verification snapshot built by the API layer.
#[derive(Debug, Clone, FromRow)]
pub struct Ticket {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub verification_code: String,
    /// Gateway payment intent recorded at issue time; refund callbacks
    /// correlate through this.
    pub payment_intent: Option<String>,
    pub created_at: Timestamp,
    pub used_at: Option<Timestamp>,
}

/// Ticket joined with its event for the holder's own listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketWithEvent {
    pub id: DbId,
    pub event_id: DbId,
    pub status: String,
    pub verification_code: String,
    pub created_at: Timestamp,
    pub used_at: Option<Timestamp>,
    pub event_title: String,
    pub event_starts_at: Timestamp,
    pub event_location: String,
    pub price_cents: i64,
}

/// Ticket joined with event info for door verification.
#[derive(Debug, Clone, FromRow)]
pub struct TicketVerifyRow {
    pub id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub used_at: Option<Timestamp>,
    pub event_title: String,
    pub event_location: String,
}
