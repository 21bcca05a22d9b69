//! Route definitions for the `/user` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::user;
use crate::state::AppState;

/// Routes mounted at `/user` (all require auth).
///
/// ```text
/// GET /profile   -> own profile
/// PUT /profile   -> partial profile update
/// GET /tickets   -> own tickets
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(user::get_profile).put(user::update_profile))
        .route("/tickets", get(user::list_tickets))
}
