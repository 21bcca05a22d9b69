pub mod admin;
pub mod auth;
pub mod events;
pub mod health;
pub mod tickets;
pub mod user;
pub mod webhooks;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree, mounted at the root.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register               register (public, rate-limited)
/// /auth/login                  login (public, rate-limited)
///
/// /events                      list active upcoming events (public)
/// /events/{id}                 event detail with availability (public)
///
/// /tickets/purchase            create checkout session (auth)
/// /tickets/verify/{id}         door lookup, cache-first (public)
///
/// /user/profile                get, update own profile (auth)
/// /user/tickets                list own tickets (auth)
///
/// /donate                      donation checkout session (public)
///
/// /admin/stats                 platform totals (admin)
/// /admin/events                list with sales, create (admin)
/// /admin/events/{id}           update, archive (admin)
/// /admin/tickets/{id}          mark used (admin)
///
/// /webhooks/payment            gateway fulfillment callback (signed)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/tickets", tickets::router())
        .nest("/user", user::router())
        .route("/donate", post(handlers::donations::donate))
        .nest("/admin", admin::router())
        .nest("/webhooks", webhooks::router())
}
