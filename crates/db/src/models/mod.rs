//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - Create/update DTOs for inserts and patches
//! - `Serialize` response shapes where the entity itself is not safe or
//!   not sufficient to return

pub mod event;
pub mod ticket;
pub mod user;
