//! Event and ticket lifecycle status constants.
//!
//! Statuses are stored as text and constrained by CHECKs in the
//! corresponding migrations; these constants must match the seed SQL.

/// Event lifecycle. Only `active` events are listed publicly or sellable.
pub mod event_status {
    pub const DRAFT: &str = "draft";
    pub const ACTIVE: &str = "active";
    pub const CANCELLED: &str = "cancelled";
    pub const ARCHIVED: &str = "archived";

    pub const ALL: [&str; 4] = [DRAFT, ACTIVE, CANCELLED, ARCHIVED];

    pub fn is_valid(status: &str) -> bool {
        ALL.contains(&status)
    }
}

/// Ticket lifecycle. `refunded` tickets release their capacity.
pub mod ticket_status {
    pub const VALID: &str = "valid";
    pub const USED: &str = "used";
    pub const REFUNDED: &str = "refunded";
}
