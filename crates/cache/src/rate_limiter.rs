//! Fixed-window request throttling shared across server instances.
//!
//! The counter lives in Redis so horizontally scaled servers draw from
//! the same budget. `INCR` plus `EXPIRE NX` runs as one atomic pipeline:
//! the window starts at the first attempt and resets exactly
//! `window_secs` later. Requires Redis 7 for the `NX` expiry flag.

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::CacheError;

/// Per-action request budget enforcement.
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Record an attempt by `client` against `action` and report whether
    /// it fits within `limit` attempts per window.
    ///
    /// Attempts over the limit still increment the counter but never
    /// extend the window, so hammering a closed window does not push the
    /// reset further out.
    async fn allow(
        &self,
        action: &str,
        client: &str,
        limit: u32,
        window_secs: i64,
    ) -> Result<bool, CacheError>;
}

/// Redis implementation used in production.
#[derive(Clone)]
pub struct RedisRateLimiter {
    conn: ConnectionManager,
}

impl RedisRateLimiter {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(action: &str, client: &str) -> String {
        format!("ratelimit:{action}:{client}")
    }
}

#[async_trait]
impl RateLimit for RedisRateLimiter {
    async fn allow(
        &self,
        action: &str,
        client: &str,
        limit: u32,
        window_secs: i64,
    ) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let key = Self::key(action, client);

        // NX keeps the TTL set by the first attempt; later attempts in
        // the same window only bump the counter.
        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .cmd("EXPIRE")
            .arg(&key)
            .arg(window_secs)
            .arg("NX")
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= u64::from(limit))
    }
}
