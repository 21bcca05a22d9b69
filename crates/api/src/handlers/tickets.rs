//! Handlers for the `/tickets` resource: purchase intent and door-side
//! verification.

use axum::extract::{Path, State};
use axum::Json;
use basho_cache::TicketSnapshot;
use basho_core::status::ticket_status;
use basho_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::fulfillment;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /tickets/purchase`.
#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub event_id: DbId,
    pub quantity: u32,
}

/// Response for a created checkout session: where to send the buyer.
#[derive(Debug, Serialize)]
pub struct PurchaseResponse {
    pub session_id: String,
    pub url: String,
}

/// Door-check response derived from a [`TicketSnapshot`].
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub ticket_id: DbId,
    /// True only for an unredeemed `valid` ticket.
    pub valid: bool,
    pub status: String,
    pub used_at: Option<Timestamp>,
    pub event_title: String,
    pub event_location: String,
}

impl From<TicketSnapshot> for VerifyResponse {
    fn from(snapshot: TicketSnapshot) -> Self {
        Self {
            ticket_id: snapshot.ticket_id,
            valid: snapshot.status == ticket_status::VALID,
            status: snapshot.status,
            used_at: snapshot.used_at,
            event_title: snapshot.event_title,
            event_location: snapshot.event_location,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /tickets/purchase
///
/// Reserve seats and create a checkout session for the authenticated
/// buyer. The heavy lifting is in [`fulfillment::purchase`].
pub async fn purchase(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<PurchaseRequest>,
) -> AppResult<Json<PurchaseResponse>> {
    let session = fulfillment::purchase(&state, &user, input.event_id, input.quantity).await?;
    Ok(Json(PurchaseResponse {
        session_id: session.id,
        url: session.url,
    }))
}

/// GET /tickets/verify/{id}
///
/// Public cache-first door lookup. No auth: the ticket id is an
/// unguessable UUID and the response carries nothing sensitive.
pub async fn verify(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<VerifyResponse>> {
    let snapshot = fulfillment::verify_ticket(&state, id).await?;
    Ok(Json(snapshot.into()))
}
