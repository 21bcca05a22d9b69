//! Redis-backed shared state: request rate limiting and the ticket
//! verification cache.
//!
//! Both concerns sit behind small traits so every server instance can
//! share one connection manager while tests swap in in-memory doubles.

use redis::aio::ConnectionManager;

pub mod rate_limiter;
pub mod verification;

pub use rate_limiter::{RateLimit, RedisRateLimiter};
pub use verification::{RedisTicketCache, TicketCache, TicketSnapshot};

/// Errors from cache-backed operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("snapshot serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Open a managed connection to Redis.
///
/// The manager multiplexes commands over a single connection and
/// reconnects after failures, so one instance serves the whole process.
/// Cloning it is cheap.
pub async fn connect(redis_url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let client = redis::Client::open(redis_url)?;
    ConnectionManager::new(client).await
}
