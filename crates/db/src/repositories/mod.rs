//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Capacity-sensitive writes live
//! in [`ledger_repo`] and nowhere else.

pub mod event_repo;
pub mod ledger_repo;
pub mod ticket_repo;
pub mod user_repo;
pub mod webhook_repo;

pub use event_repo::EventRepo;
pub use ledger_repo::{IssueOutcome, LedgerRepo, ReserveOutcome};
pub use ticket_repo::{MarkUsedOutcome, TicketRepo};
pub use user_repo::UserRepo;
pub use webhook_repo::WebhookRepo;
