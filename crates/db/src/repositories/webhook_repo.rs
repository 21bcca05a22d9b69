//! Processed-callback bookkeeping for webhook deduplication.
//!
//! Rows are written only after a delivery has been fully handled, so a
//! crash mid-processing leaves the id unrecorded and the gateway's retry
//! runs the (idempotent) handlers again.

use sqlx::PgPool;

/// Tracks gateway callback ids that completed processing.
pub struct WebhookRepo;

impl WebhookRepo {
    /// True if this delivery id has already been fully processed.
    pub async fn is_processed(pool: &PgPool, callback_id: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM webhook_events WHERE id = $1)")
            .bind(callback_id)
            .fetch_one(pool)
            .await
    }

    /// Record a processed delivery.
    ///
    /// Returns `false` if the id was already recorded (concurrent
    /// duplicate finished first).
    pub async fn record(
        pool: &PgPool,
        callback_id: &str,
        event_type: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO webhook_events (id, event_type) VALUES ($1, $2)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(callback_id)
        .bind(event_type)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
