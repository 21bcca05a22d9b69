//! Route definitions for the public `/events` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::events;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET /      -> list active upcoming events
/// GET /{id}  -> event detail with availability
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events))
        .route("/{id}", get(events::get_event))
}
