//! Repository for the `events` table.

use basho_core::status::event_status;
use basho_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{CreateEvent, Event, EventSales, UpdateEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, starts_at, location, price_cents, \
                        image_url, capacity, category, status, created_by, \
                        created_at, updated_at";

/// Maximum rows returned by the public listing.
const LISTING_LIMIT: i64 = 100;

/// Category applied when the creator does not pick one.
const DEFAULT_CATEGORY: &str = "general";

/// Provides CRUD and reporting queries for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    ///
    /// Optional fields fall back to their defaults here so the row never
    /// carries NULL text columns.
    pub async fn create(
        pool: &PgPool,
        created_by: Option<DbId>,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events (title, description, starts_at, location, price_cents,
                                 image_url, capacity, category, status, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(input.description.as_deref().unwrap_or(""))
            .bind(input.starts_at)
            .bind(&input.location)
            .bind(input.price_cents.unwrap_or(0))
            .bind(input.image_url.as_deref().unwrap_or(""))
            .bind(input.capacity)
            .bind(input.category.as_deref().unwrap_or(DEFAULT_CATEGORY))
            .bind(input.status.as_deref().unwrap_or(event_status::ACTIVE))
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find an event by ID, regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List upcoming active events, soonest first.
    pub async fn list_upcoming(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events
             WHERE status = $1 AND starts_at >= NOW()
             ORDER BY starts_at ASC
             LIMIT {LISTING_LIMIT}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(event_status::ACTIVE)
            .fetch_all(pool)
            .await
    }

    /// Update an event. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEvent,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                starts_at = COALESCE($4, starts_at),
                location = COALESCE($5, location),
                price_cents = COALESCE($6, price_cents),
                image_url = COALESCE($7, image_url),
                capacity = COALESCE($8, capacity),
                category = COALESCE($9, category),
                status = COALESCE($10, status),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(&input.location)
            .bind(input.price_cents)
            .bind(&input.image_url)
            .bind(input.capacity)
            .bind(&input.category)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an event by setting `status = 'archived'`.
    ///
    /// Returns `true` if the row was updated.
    pub async fn archive(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(event_status::ARCHIVED)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List every event with sales totals, newest first (admin dashboard).
    ///
    /// Refunded tickets are excluded from both count and revenue.
    pub async fn list_with_sales(pool: &PgPool) -> Result<Vec<EventSales>, sqlx::Error> {
        sqlx::query_as::<_, EventSales>(
            "SELECT e.id, e.title, e.description, e.starts_at, e.location, e.price_cents,
                    e.image_url, e.capacity, e.category, e.status, e.created_at,
                    COALESCE(s.sold, 0) AS tickets_sold,
                    COALESCE(s.sold, 0) * e.price_cents AS revenue_cents
             FROM events e
             LEFT JOIN (
                 SELECT event_id, COUNT(*) AS sold
                 FROM tickets
                 WHERE status IN ('valid', 'used')
                 GROUP BY event_id
             ) s ON s.event_id = e.id
             ORDER BY e.starts_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Count active events (admin stats).
    pub async fn count_active(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE status = $1")
            .bind(event_status::ACTIVE)
            .fetch_one(pool)
            .await
    }
}
