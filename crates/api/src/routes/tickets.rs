//! Route definitions for the `/tickets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tickets;
use crate::state::AppState;

/// Routes mounted at `/tickets`.
///
/// ```text
/// POST /purchase      -> create checkout session (requires auth)
/// GET  /verify/{id}   -> door lookup (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchase", post(tickets::purchase))
        .route("/verify/{id}", get(tickets::verify))
}
