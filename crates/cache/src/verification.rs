//! Ticket verification snapshot cache.
//!
//! Door checks are the hot path at event start, so fulfillment writes a
//! snapshot that lets verification skip the database entirely. The
//! database row stays authoritative: every state change re-serializes
//! the fresh row, and a missing or unreadable snapshot just falls back
//! to a lookup.

use async_trait::async_trait;
use basho_core::types::{DbId, Timestamp};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::CacheError;

/// TTL for snapshots written at fulfillment time (30 days).
pub const FULFILLMENT_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// TTL for snapshots re-populated after a verification miss (24 hours).
pub const LOOKUP_TTL_SECS: u64 = 24 * 60 * 60;

/// What the door check needs to know about a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub ticket_id: DbId,
    pub event_id: DbId,
    pub user_id: DbId,
    pub status: String,
    pub used_at: Option<Timestamp>,
    pub event_title: String,
    pub event_location: String,
}

/// Keyed access to ticket snapshots.
#[async_trait]
pub trait TicketCache: Send + Sync {
    async fn get(&self, ticket_id: DbId) -> Result<Option<TicketSnapshot>, CacheError>;

    async fn put(&self, snapshot: &TicketSnapshot, ttl_secs: u64) -> Result<(), CacheError>;

    async fn remove(&self, ticket_id: DbId) -> Result<(), CacheError>;

    /// Liveness probe for the health endpoint.
    async fn ping(&self) -> bool;
}

/// Redis implementation used in production.
#[derive(Clone)]
pub struct RedisTicketCache {
    conn: ConnectionManager,
}

impl RedisTicketCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    fn key(ticket_id: DbId) -> String {
        format!("ticket:{ticket_id}")
    }
}

#[async_trait]
impl TicketCache for RedisTicketCache {
    async fn get(&self, ticket_id: DbId) -> Result<Option<TicketSnapshot>, CacheError> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(ticket_id)).await?;

        // A snapshot that no longer parses is treated as a miss so the
        // next database lookup rewrites it.
        Ok(raw.and_then(|json| serde_json::from_str(&json).ok()))
    }

    async fn put(&self, snapshot: &TicketSnapshot, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(snapshot)?;
        let _: () = conn.set_ex(Self::key(snapshot.ticket_id), json, ttl_secs).await?;
        Ok(())
    }

    async fn remove(&self, ticket_id: DbId) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(Self::key(ticket_id)).await?;
        Ok(())
    }

    async fn ping(&self) -> bool {
        let mut conn = self.conn.clone();
        let reply: Result<String, redis::RedisError> =
            redis::cmd("PING").query_async(&mut conn).await;
        reply.is_ok()
    }
}
