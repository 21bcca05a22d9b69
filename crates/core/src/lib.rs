//! Domain core for the basho ticketing backend.
//!
//! This crate has no database or network dependencies so every layer
//! (API, repositories, workers, CLI tooling) can share its types and
//! policy without pulling in their stacks.

pub mod correlation;
pub mod error;
pub mod roles;
pub mod signature;
pub mod status;
pub mod types;
pub mod validation;
pub mod verification;

pub use error::CoreError;
pub use types::{DbId, Timestamp};
