//! Repository for the `tickets` table.
//!
//! Creation goes through [`crate::repositories::LedgerRepo`]; this
//! repository covers lookups and the non-capacity state transitions.

use basho_core::status::ticket_status;
use basho_core::types::DbId;
use sqlx::PgPool;

use crate::models::ticket::{Ticket, TicketVerifyRow, TicketWithEvent};

/// Column list shared across queries (and with the ledger's insert).
pub(crate) const COLUMNS: &str = "id, event_id, user_id, status, verification_code, \
                                   payment_intent, created_at, used_at";

/// SQL fragment matching tickets that still consume a seat. Must agree
/// with the `ticket_status` constants.
pub(crate) const ACTIVE_STATUSES: &str = "('valid', 'used')";

/// Outcome of a manual mark-used attempt.
#[derive(Debug)]
pub enum MarkUsedOutcome {
    /// Transitioned `valid` -> `used` and stamped `used_at`.
    Used(Box<Ticket>),
    /// The ticket was already redeemed.
    AlreadyUsed,
    /// The ticket was refunded and can no longer be redeemed.
    Refunded,
    NotFound,
}

/// Provides lookups and state transitions for issued tickets.
pub struct TicketRepo;

impl TicketRepo {
    /// Find a ticket by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Ticket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tickets WHERE id = $1");
        sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// True if the user already holds a live (valid or used) ticket for
    /// the event.
    pub async fn has_active(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let query = format!(
            "SELECT EXISTS(
                 SELECT 1 FROM tickets
                 WHERE user_id = $1 AND event_id = $2 AND status IN {ACTIVE_STATUSES}
             )"
        );
        sqlx::query_scalar(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(pool)
            .await
    }

    /// List a user's tickets joined with event details, newest event first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<TicketWithEvent>, sqlx::Error> {
        sqlx::query_as::<_, TicketWithEvent>(
            "SELECT t.id, t.event_id, t.status, t.verification_code, t.created_at, t.used_at,
                    e.title AS event_title, e.starts_at AS event_starts_at,
                    e.location AS event_location, e.price_cents
             FROM tickets t
             JOIN events e ON e.id = t.event_id
             WHERE t.user_id = $1
             ORDER BY e.starts_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Load a ticket with the event fields the door check displays.
    pub async fn find_verify_row(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TicketVerifyRow>, sqlx::Error> {
        sqlx::query_as::<_, TicketVerifyRow>(
            "SELECT t.id, t.event_id, t.user_id, t.status, t.used_at,
                    e.title AS event_title, e.location AS event_location
             FROM tickets t
             JOIN events e ON e.id = t.event_id
             WHERE t.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Atomically redeem a ticket.
    ///
    /// The conditional UPDATE means two concurrent redemptions cannot both
    /// succeed; the loser falls through to the status probe.
    pub async fn mark_used(pool: &PgPool, id: DbId) -> Result<MarkUsedOutcome, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = $2, used_at = NOW()
             WHERE id = $1 AND status = $3
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Ticket>(&query)
            .bind(id)
            .bind(ticket_status::USED)
            .bind(ticket_status::VALID)
            .fetch_optional(pool)
            .await?;

        if let Some(ticket) = updated {
            return Ok(MarkUsedOutcome::Used(Box::new(ticket)));
        }

        let status: Option<String> = sqlx::query_scalar("SELECT status FROM tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(match status.as_deref() {
            Some(s) if s == ticket_status::USED => MarkUsedOutcome::AlreadyUsed,
            Some(s) if s == ticket_status::REFUNDED => MarkUsedOutcome::Refunded,
            // Lost a race to another transition between the two statements.
            Some(_) => MarkUsedOutcome::AlreadyUsed,
            None => MarkUsedOutcome::NotFound,
        })
    }

    /// Mark every live ticket paid for by `payment_intent` as refunded.
    ///
    /// Returns the refunded rows so callers can drop cache entries.
    pub async fn refund_by_payment_intent(
        pool: &PgPool,
        payment_intent: &str,
    ) -> Result<Vec<Ticket>, sqlx::Error> {
        let query = format!(
            "UPDATE tickets SET status = $2, used_at = NULL
             WHERE payment_intent = $1 AND status IN {ACTIVE_STATUSES}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ticket>(&query)
            .bind(payment_intent)
            .bind(ticket_status::REFUNDED)
            .fetch_all(pool)
            .await
    }

    /// Count valid tickets (admin stats).
    pub async fn count_valid(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tickets WHERE status = $1")
            .bind(ticket_status::VALID)
            .fetch_one(pool)
            .await
    }

    /// Gross revenue in cents across live tickets (admin stats).
    pub async fn revenue_cents(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COALESCE(SUM(e.price_cents), 0)::BIGINT
             FROM tickets t
             JOIN events e ON e.id = t.event_id
             WHERE t.status IN {ACTIVE_STATUSES}"
        );
        sqlx::query_scalar(&query).fetch_one(pool).await
    }
}
