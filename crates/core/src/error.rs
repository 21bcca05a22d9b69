use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Event is at capacity")]
    CapacityExceeded,

    #[error("Event is not available for purchase")]
    EventNotAvailable,

    #[error("You already have a ticket for this event")]
    AlreadyHasTicket,

    #[error("Ticket has already been used")]
    AlreadyUsed,

    #[error("Internal error: {0}")]
    Internal(String),
}
