//! Capacity ledger for ticket issuance.
//!
//! Every path that can consume seats funnels through these operations.
//! Counting always happens inside a transaction that holds the event row
//! `FOR UPDATE`, so two concurrent buyers of the last seat serialize and
//! exactly one wins. Refunded tickets are excluded from every count,
//! which is how refunds return capacity to the pool.

use basho_core::status::event_status;
use basho_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::ticket::Ticket;
use crate::repositories::ticket_repo::{ACTIVE_STATUSES, COLUMNS as TICKET_COLUMNS};

/// Outcome of a reservation attempt at purchase-intent time.
#[derive(Debug, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// Seats are held (or the event is uncapped); checkout may proceed.
    Reserved,
    EventNotFound,
    EventNotAvailable,
    CapacityExceeded,
}

/// Outcome of issuing tickets for a paid checkout session.
#[derive(Debug)]
pub enum IssueOutcome {
    /// Tickets created and the buyer's hold consumed.
    Issued(Vec<Ticket>),
    /// The buyer already holds live tickets for this event (replayed or
    /// duplicated callback); nothing was written.
    AlreadyFulfilled,
    EventNotFound,
    EventNotAvailable,
    /// Payment succeeded but the seats are gone. Nothing was written;
    /// the caller decides how loudly to escalate.
    CapacityExceeded,
}

/// Capacity and lifecycle fields read under the event-row lock.
#[derive(sqlx::FromRow)]
struct EventGate {
    capacity: Option<i32>,
    status: String,
}

/// Serialized seat accounting for events.
pub struct LedgerRepo;

impl LedgerRepo {
    /// Reserve `quantity` seats for a buyer before checkout redirection.
    ///
    /// Counts committed tickets plus live holds of *other* buyers; this
    /// buyer's own earlier hold is replaced, not stacked, so re-asking for
    /// a different quantity never double-books. Uncapped events skip the
    /// arithmetic and take no hold.
    pub async fn reserve(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
        quantity: u32,
        hold_ttl_mins: i32,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(event) = Self::lock_event(&mut tx, event_id).await? else {
            return Ok(ReserveOutcome::EventNotFound);
        };
        if event.status != event_status::ACTIVE {
            return Ok(ReserveOutcome::EventNotAvailable);
        }

        if let Some(capacity) = event.capacity {
            let committed = Self::count_committed(&mut tx, event_id).await?;
            let held = Self::count_held_by_others(&mut tx, event_id, user_id).await?;
            if committed + held + i64::from(quantity) > i64::from(capacity) {
                return Ok(ReserveOutcome::CapacityExceeded);
            }

            sqlx::query(
                "INSERT INTO ticket_holds (event_id, user_id, quantity, expires_at)
                 VALUES ($1, $2, $3, NOW() + make_interval(mins => $4))
                 ON CONFLICT ON CONSTRAINT uq_ticket_holds_event_user
                 DO UPDATE SET quantity = EXCLUDED.quantity, expires_at = EXCLUDED.expires_at",
            )
            .bind(event_id)
            .bind(user_id)
            .bind(quantity as i32)
            .bind(hold_ttl_mins)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(ReserveOutcome::Reserved)
    }

    /// Issue tickets after the gateway confirms payment.
    ///
    /// Re-checks capacity under the lock even though payment succeeded: a
    /// replayed callback, an expired hold raced by another sale, or an
    /// admin capacity cut must never oversell. `codes` length is the
    /// quantity being issued.
    pub async fn issue(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
        codes: &[String],
        payment_intent: Option<&str>,
    ) -> Result<IssueOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(event) = Self::lock_event(&mut tx, event_id).await? else {
            return Ok(IssueOutcome::EventNotFound);
        };
        if event.status != event_status::ACTIVE {
            return Ok(IssueOutcome::EventNotAvailable);
        }

        let existing_query = format!(
            "SELECT COUNT(*) FROM tickets
             WHERE event_id = $1 AND user_id = $2 AND status IN {ACTIVE_STATUSES}"
        );
        let existing: i64 = sqlx::query_scalar(&existing_query)
            .bind(event_id)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(IssueOutcome::AlreadyFulfilled);
        }

        if let Some(capacity) = event.capacity {
            let committed = Self::count_committed(&mut tx, event_id).await?;
            if committed + codes.len() as i64 > i64::from(capacity) {
                return Ok(IssueOutcome::CapacityExceeded);
            }
        }

        let insert = format!(
            "INSERT INTO tickets (event_id, user_id, verification_code, payment_intent)
             SELECT $1, $2, c.code, $4 FROM unnest($3::text[]) AS c(code)
             RETURNING {TICKET_COLUMNS}"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&insert)
            .bind(event_id)
            .bind(user_id)
            .bind(codes)
            .bind(payment_intent)
            .fetch_all(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM ticket_holds WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(IssueOutcome::Issued(tickets))
    }

    /// Drop a buyer's hold (failed session creation, cancelled intent).
    pub async fn release(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM ticket_holds WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Seats still open on an event right now, `None` when uncapped.
    ///
    /// Aggregates without locking; for display only, never for admission
    /// decisions.
    pub async fn seats_remaining(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let query = format!(
            "SELECT
                 e.capacity,
                 (SELECT COUNT(*) FROM tickets t
                  WHERE t.event_id = e.id AND t.status IN {ACTIVE_STATUSES}) AS committed,
                 (SELECT COALESCE(SUM(h.quantity), 0) FROM ticket_holds h
                  WHERE h.event_id = e.id AND h.expires_at > NOW()) AS held
             FROM events e WHERE e.id = $1"
        );
        let row: Option<(Option<i32>, i64, i64)> = sqlx::query_as(&query)
            .bind(event_id)
            .fetch_optional(pool)
            .await?;

        Ok(row.and_then(|(capacity, committed, held)| {
            capacity.map(|cap| (i64::from(cap) - committed - held).max(0))
        }))
    }

    async fn lock_event(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
    ) -> Result<Option<EventGate>, sqlx::Error> {
        sqlx::query_as::<_, EventGate>("SELECT capacity, status FROM events WHERE id = $1 FOR UPDATE")
            .bind(event_id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn count_committed(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM tickets WHERE event_id = $1 AND status IN {ACTIVE_STATUSES}"
        );
        sqlx::query_scalar(&query)
            .bind(event_id)
            .fetch_one(&mut **tx)
            .await
    }

    async fn count_held_by_others(
        tx: &mut Transaction<'_, Postgres>,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM ticket_holds
             WHERE event_id = $1 AND user_id <> $2 AND expires_at > NOW()",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut **tx)
        .await
    }
}
