/// All database primary keys are PostgreSQL `gen_random_uuid()` UUIDs.
///
/// Ticket ids double as the public verification handle, so ids must be
/// unguessable rather than sequential.
pub type DbId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
