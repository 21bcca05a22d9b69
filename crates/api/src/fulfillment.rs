//! The ticket issuance and fulfillment pipeline.
//!
//! A purchase moves through: intent (capacity reserved, checkout session
//! created, client redirected) -> external payment -> signed callback ->
//! ticket materialization. This module owns every transition that touches
//! ticket state; handlers are thin wrappers around the functions here.
//!
//! Callback processing is idempotent twice over: the webhook handler
//! drops already-recorded delivery ids, and [`LedgerRepo::issue`]
//! short-circuits when the buyer already holds tickets for the event. A
//! replayed delivery therefore produces zero new rows.

use std::sync::Arc;

use basho_cache::verification::{FULFILLMENT_TTL_SECS, LOOKUP_TTL_SECS};
use basho_cache::TicketSnapshot;
use basho_core::error::CoreError;
use basho_core::types::DbId;
use basho_core::{correlation, validation, verification};
use basho_db::models::event::Event;
use basho_db::models::ticket::{Ticket, TicketVerifyRow};
use basho_db::repositories::{
    EventRepo, IssueOutcome, LedgerRepo, MarkUsedOutcome, ReserveOutcome, TicketRepo, UserRepo,
};
use basho_gateway::webhook::{CompletedSession, RefundedCharge};
use basho_gateway::{CheckoutSession, CheckoutSessionParams};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::notifier::Notifier;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Purchase intent
// ---------------------------------------------------------------------------

/// Create a checkout session for `quantity` tickets to an event.
///
/// Order of checks matters: quantity bounds fail before any I/O, business
/// rules fail before the gateway is contacted, and a gateway failure
/// releases the seat hold so abandoned attempts do not pin capacity for
/// the full hold TTL.
pub async fn purchase(
    state: &AppState,
    user: &AuthUser,
    event_id: DbId,
    quantity: u32,
) -> AppResult<CheckoutSession> {
    validation::validate_purchase_quantity(quantity).map_err(CoreError::Validation)?;

    let event = EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "event",
            id: event_id,
        })?;

    if TicketRepo::has_active(&state.pool, user.user_id, event_id).await? {
        return Err(CoreError::AlreadyHasTicket.into());
    }

    match LedgerRepo::reserve(
        &state.pool,
        event_id,
        user.user_id,
        quantity,
        state.config.hold_ttl_mins,
    )
    .await?
    {
        ReserveOutcome::Reserved => {}
        ReserveOutcome::EventNotFound => {
            return Err(CoreError::NotFound {
                entity: "event",
                id: event_id,
            }
            .into())
        }
        ReserveOutcome::EventNotAvailable => return Err(CoreError::EventNotAvailable.into()),
        ReserveOutcome::CapacityExceeded => return Err(CoreError::CapacityExceeded.into()),
    }

    let expires_at =
        chrono::Utc::now().timestamp() + i64::from(state.config.hold_ttl_mins) * 60;
    let params = CheckoutSessionParams {
        product_name: event.title.clone(),
        unit_amount_cents: event.price_cents,
        quantity,
        client_reference_id: Some(correlation::encode(user.user_id, event_id, quantity)),
        customer_email: Some(user.email.clone()),
        success_url: state.config.checkout_success_url(),
        cancel_url: state.config.checkout_cancel_url(),
        expires_at: Some(expires_at),
    };

    match state.gateway.create_checkout_session(&params).await {
        Ok(session) => {
            tracing::info!(
                user_id = %user.user_id,
                event_id = %event_id,
                quantity,
                session_id = %session.id,
                "Checkout session created"
            );
            Ok(session)
        }
        Err(err) => {
            // The hold would lapse on its own, but releasing it now lets
            // the buyer retry immediately.
            LedgerRepo::release(&state.pool, event_id, user.user_id).await?;
            Err(err.into())
        }
    }
}

// ---------------------------------------------------------------------------
// Fulfillment (callback-driven)
// ---------------------------------------------------------------------------

/// Materialize tickets for a paid checkout session.
///
/// Only called with a signature-verified payload. Sessions without a
/// correlation reference (donations) are acknowledged untouched. Outcomes
/// that indicate a replay or a lost race are logged and swallowed -- the
/// gateway gets its 200 either way, since retrying cannot improve things.
pub async fn fulfill_session(state: &AppState, session: &CompletedSession) -> AppResult<()> {
    let Some(reference) = &session.client_reference_id else {
        tracing::info!(session_id = %session.id, "Completed session without purchase reference (donation)");
        return Ok(());
    };

    let parsed = match correlation::decode(reference) {
        Ok(parsed) => parsed,
        Err(err) => {
            // Only our own sessions reach here (the signature proves
            // origin), so a bad reference is a server-side bug.
            tracing::error!(session_id = %session.id, %reference, %err, "Unparseable purchase reference");
            return Ok(());
        }
    };

    if validation::validate_purchase_quantity(parsed.quantity).is_err() {
        tracing::error!(
            session_id = %session.id,
            quantity = parsed.quantity,
            "Purchase reference carries an out-of-bounds quantity"
        );
        return Ok(());
    }

    let codes: Vec<String> = (0..parsed.quantity)
        .map(|_| verification::generate_verification_code())
        .collect();

    let outcome = LedgerRepo::issue(
        &state.pool,
        parsed.event_id,
        parsed.user_id,
        &codes,
        session.payment_intent.as_deref(),
    )
    .await?;

    let tickets = match outcome {
        IssueOutcome::Issued(tickets) => tickets,
        IssueOutcome::AlreadyFulfilled => {
            tracing::info!(
                session_id = %session.id,
                user_id = %parsed.user_id,
                event_id = %parsed.event_id,
                "Session already fulfilled, skipping"
            );
            return Ok(());
        }
        IssueOutcome::CapacityExceeded => {
            // Paid but the seats are gone. Needs a human: refund or
            // reinstate capacity.
            tracing::error!(
                session_id = %session.id,
                user_id = %parsed.user_id,
                event_id = %parsed.event_id,
                quantity = parsed.quantity,
                "Paid session exceeds remaining capacity; tickets NOT issued"
            );
            return Ok(());
        }
        IssueOutcome::EventNotFound | IssueOutcome::EventNotAvailable => {
            tracing::error!(
                session_id = %session.id,
                event_id = %parsed.event_id,
                "Paid session references an unavailable event; tickets NOT issued"
            );
            return Ok(());
        }
    };

    tracing::info!(
        session_id = %session.id,
        user_id = %parsed.user_id,
        event_id = %parsed.event_id,
        count = tickets.len(),
        "Tickets issued"
    );

    let event = EventRepo::find_by_id(&state.pool, parsed.event_id).await?;
    if let Some(event) = &event {
        populate_cache(state, event, &tickets).await;
    }

    if let Some(notifier) = &state.notifier {
        send_confirmation(state, Arc::clone(notifier), parsed.user_id, event, tickets).await;
    }

    Ok(())
}

/// Write fulfillment-time snapshots for a batch of new tickets.
///
/// Cache failures are logged and ignored; verification falls back to the
/// database on a miss.
async fn populate_cache(state: &AppState, event: &Event, tickets: &[Ticket]) {
    for ticket in tickets {
        let snapshot = TicketSnapshot {
            ticket_id: ticket.id,
            event_id: ticket.event_id,
            user_id: ticket.user_id,
            status: ticket.status.clone(),
            used_at: ticket.used_at,
            event_title: event.title.clone(),
            event_location: event.location.clone(),
        };
        if let Err(err) = state.cache.put(&snapshot, FULFILLMENT_TTL_SECS).await {
            tracing::warn!(ticket_id = %ticket.id, %err, "Failed to cache ticket snapshot");
        }
    }
}

/// Fire off the confirmation email without blocking callback processing.
async fn send_confirmation(
    state: &AppState,
    notifier: Arc<Notifier>,
    user_id: DbId,
    event: Option<Event>,
    tickets: Vec<Ticket>,
) {
    let user = match UserRepo::find_by_id(&state.pool, user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::warn!(%user_id, "Ticket buyer no longer exists; skipping confirmation email");
            return;
        }
        Err(err) => {
            tracing::warn!(%user_id, %err, "Failed to load buyer for confirmation email");
            return;
        }
    };
    let event_title = event.map(|e| e.title).unwrap_or_else(|| "your event".to_string());

    tokio::spawn(async move {
        if let Err(err) = notifier
            .send_ticket_confirmation(&user.email, &event_title, &tickets)
            .await
        {
            tracing::warn!(%err, "Failed to send ticket confirmation email");
        }
    });
}

// ---------------------------------------------------------------------------
// Refunds
// ---------------------------------------------------------------------------

/// Transition every ticket paid by a refunded charge to `refunded`.
///
/// Counts exclude refunded tickets, so capacity flows back to the pool
/// without explicit decrement. Cache entries are dropped rather than
/// rewritten; the next door check reads the authoritative row.
pub async fn refund_charge(state: &AppState, charge: &RefundedCharge) -> AppResult<()> {
    let Some(payment_intent) = &charge.payment_intent else {
        tracing::warn!(charge_id = %charge.id, "Refunded charge has no payment intent");
        return Ok(());
    };

    let refunded = TicketRepo::refund_by_payment_intent(&state.pool, payment_intent).await?;
    if refunded.is_empty() {
        tracing::info!(charge_id = %charge.id, %payment_intent, "Refund matched no live tickets");
        return Ok(());
    }

    tracing::info!(
        charge_id = %charge.id,
        %payment_intent,
        count = refunded.len(),
        "Tickets refunded"
    );

    for ticket in &refunded {
        if let Err(err) = state.cache.remove(ticket.id).await {
            tracing::warn!(ticket_id = %ticket.id, %err, "Failed to evict refunded ticket from cache");
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Look up a ticket for the door check, cache first.
///
/// On a miss the authoritative row is fetched and the snapshot is
/// repopulated with the shorter lookup TTL.
pub async fn verify_ticket(state: &AppState, ticket_id: DbId) -> AppResult<TicketSnapshot> {
    match state.cache.get(ticket_id).await {
        Ok(Some(snapshot)) => return Ok(snapshot),
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(%ticket_id, %err, "Cache read failed; falling back to database");
        }
    }

    let row = TicketRepo::find_verify_row(&state.pool, ticket_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "ticket",
            id: ticket_id,
        })?;

    let snapshot = snapshot_from_row(row);
    if let Err(err) = state.cache.put(&snapshot, LOOKUP_TTL_SECS).await {
        tracing::warn!(%ticket_id, %err, "Failed to repopulate ticket snapshot");
    }

    Ok(snapshot)
}

/// Redeem a ticket at the door: `valid -> used`, exactly once.
///
/// The database transitions first; only then is the cache refreshed from
/// the updated row. If that refresh fails the stale entry is deleted so
/// the next read cannot see a phantom `valid`.
pub async fn mark_used(state: &AppState, ticket_id: DbId) -> AppResult<TicketSnapshot> {
    match TicketRepo::mark_used(&state.pool, ticket_id).await? {
        MarkUsedOutcome::Used(ticket) => {
            tracing::info!(%ticket_id, "Ticket redeemed");

            let row = TicketRepo::find_verify_row(&state.pool, ticket.id)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!("Redeemed ticket {ticket_id} vanished"))
                })?;
            let snapshot = snapshot_from_row(row);

            if let Err(err) = state.cache.put(&snapshot, LOOKUP_TTL_SECS).await {
                tracing::warn!(%ticket_id, %err, "Cache refresh failed; evicting entry");
                if let Err(err) = state.cache.remove(ticket_id).await {
                    tracing::warn!(%ticket_id, %err, "Cache eviction also failed");
                }
            }

            Ok(snapshot)
        }
        MarkUsedOutcome::AlreadyUsed => Err(CoreError::AlreadyUsed.into()),
        MarkUsedOutcome::Refunded => Err(CoreError::Conflict(
            "Ticket has been refunded and cannot be used".into(),
        )
        .into()),
        MarkUsedOutcome::NotFound => Err(CoreError::NotFound {
            entity: "ticket",
            id: ticket_id,
        }
        .into()),
    }
}

fn snapshot_from_row(row: TicketVerifyRow) -> TicketSnapshot {
    TicketSnapshot {
        ticket_id: row.id,
        event_id: row.event_id,
        user_id: row.user_id,
        status: row.status,
        used_at: row.used_at,
        event_title: row.event_title,
        event_location: row.event_location,
    }
}
