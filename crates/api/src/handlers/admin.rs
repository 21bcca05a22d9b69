//! Handlers for the `/admin` resource (stats, event management, door
//! redemption).
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. Admin
//! payloads use `deny_unknown_fields` DTOs -- a misspelled field is a
//! 400, never silently dropped.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use basho_core::error::CoreError;
use basho_core::status::event_status;
use basho_core::types::DbId;
use basho_db::models::event::{CreateEvent, Event, EventSales, UpdateEvent};
use basho_db::repositories::{EventRepo, TicketRepo, UserRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::fulfillment;
use crate::handlers::tickets::VerifyResponse;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Platform totals for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub active_events: i64,
    pub valid_tickets: i64,
    pub revenue_cents: i64,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_event_fields(
    title: Option<&str>,
    location: Option<&str>,
    price_cents: Option<i64>,
    capacity: Option<i32>,
    status: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(title) = title {
        if title.trim().is_empty() {
            return Err(CoreError::Validation("Title must not be empty".into()));
        }
    }
    if let Some(location) = location {
        if location.trim().is_empty() {
            return Err(CoreError::Validation("Location must not be empty".into()));
        }
    }
    if let Some(price) = price_cents {
        if price < 0 {
            return Err(CoreError::Validation("Price must not be negative".into()));
        }
    }
    if let Some(capacity) = capacity {
        if capacity <= 0 {
            return Err(CoreError::Validation(
                "Capacity must be positive (omit for unlimited)".into(),
            ));
        }
    }
    if let Some(status) = status {
        if !event_status::is_valid(status) {
            return Err(CoreError::Validation(format!(
                "Unknown event status: {status}"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<StatsResponse>>> {
    let total_users = UserRepo::count(&state.pool).await?;
    let active_events = EventRepo::count_active(&state.pool).await?;
    let valid_tickets = TicketRepo::count_valid(&state.pool).await?;
    let revenue_cents = TicketRepo::revenue_cents(&state.pool).await?;

    Ok(Json(DataResponse {
        data: StatsResponse {
            total_users,
            active_events,
            valid_tickets,
            revenue_cents,
        },
    }))
}

/// GET /admin/events
///
/// Every event (any status) with sold counts and revenue.
pub async fn list_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<EventSales>>>> {
    let events = EventRepo::list_with_sales(&state.pool).await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /admin/events
pub async fn create_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppJson(input): AppJson<CreateEvent>,
) -> AppResult<(StatusCode, Json<DataResponse<Event>>)> {
    validate_event_fields(
        Some(&input.title),
        Some(&input.location),
        input.price_cents,
        input.capacity,
        input.status.as_deref(),
    )?;

    let event = EventRepo::create(&state.pool, Some(admin.user_id), &input).await?;
    tracing::info!(event_id = %event.id, admin_id = %admin.user_id, "Event created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// PUT /admin/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateEvent>,
) -> AppResult<Json<DataResponse<Event>>> {
    validate_event_fields(
        input.title.as_deref(),
        input.location.as_deref(),
        input.price_cents,
        input.capacity,
        input.status.as_deref(),
    )?;

    let event = EventRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "event",
            id,
        })?;

    tracing::info!(event_id = %event.id, admin_id = %admin.user_id, "Event updated");
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /admin/events/{id}
///
/// Soft delete: archives the event so its tickets stay auditable.
pub async fn archive_event(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !EventRepo::archive(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "event",
            id,
        }
        .into());
    }

    tracing::info!(event_id = %id, admin_id = %admin.user_id, "Event archived");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /admin/tickets/{id}
///
/// Redeem a ticket at the door. Fails with 400 if it was already used
/// and 409 if it was refunded.
pub async fn mark_ticket_used(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VerifyResponse>>> {
    let snapshot = fulfillment::mark_used(&state, id).await?;
    tracing::info!(ticket_id = %id, admin_id = %admin.user_id, "Ticket marked used");

    Ok(Json(DataResponse {
        data: snapshot.into(),
    }))
}
