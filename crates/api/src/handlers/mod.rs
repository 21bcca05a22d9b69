//! HTTP handlers, one module per resource.

pub mod admin;
pub mod auth;
pub mod donations;
pub mod events;
pub mod tickets;
pub mod user;
pub mod webhooks;
