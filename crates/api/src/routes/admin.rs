//! Route definitions for the `/admin` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin` (all require the admin role).
///
/// ```text
/// GET    /stats          -> platform totals
/// GET    /events         -> all events with sales
/// POST   /events         -> create event
/// PUT    /events/{id}    -> update event
/// DELETE /events/{id}    -> archive event
/// PUT    /tickets/{id}   -> mark ticket used
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(admin::stats))
        .route("/events", get(admin::list_events).post(admin::create_event))
        .route(
            "/events/{id}",
            put(admin::update_event).delete(admin::archive_event),
        )
        .route("/tickets/{id}", put(admin::mark_ticket_used))
}
