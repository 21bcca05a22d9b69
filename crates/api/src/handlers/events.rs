//! Handlers for the public `/events` resource.

use axum::extract::{Path, State};
use axum::Json;
use basho_core::error::CoreError;
use basho_core::types::DbId;
use basho_db::models::event::Event;
use basho_db::repositories::{EventRepo, LedgerRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Event detail with live availability.
#[derive(Debug, Serialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    /// Seats still open right now; `None` for uncapped events. Advisory
    /// only -- admission is decided by the ledger at purchase time.
    pub seats_remaining: Option<i64>,
}

/// GET /events
///
/// List active upcoming events, soonest first.
pub async fn list_events(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let events = EventRepo::list_upcoming(&state.pool).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /events/{id}
///
/// Fetch a single event with its remaining-seat count.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<EventDetail>>> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "event",
            id,
        })?;

    let seats_remaining = LedgerRepo::seats_remaining(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: EventDetail {
            event,
            seats_remaining,
        },
    }))
}
