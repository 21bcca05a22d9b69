use std::sync::Arc;

use basho_cache::{RateLimit, TicketCache};
use basho_gateway::PaymentProvider;

use crate::config::ServerConfig;
use crate::notifier::Notifier;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: basho_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Request throttle shared across server instances.
    pub limiter: Arc<dyn RateLimit>,
    /// Ticket verification snapshot cache.
    pub cache: Arc<dyn TicketCache>,
    /// Hosted checkout session provider.
    pub gateway: Arc<dyn PaymentProvider>,
    /// Outbound transactional email; `None` when SMTP is not configured.
    pub notifier: Option<Arc<Notifier>>,
}
