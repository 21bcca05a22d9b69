//! Payment gateway integration.
//!
//! [`PaymentProvider`] abstracts checkout-session creation so handlers
//! and tests can run against a double, while [`StripeProvider`] speaks
//! the real Stripe REST API. Callback payload parsing lives in
//! [`webhook`].

pub mod provider;
pub mod stripe;
pub mod webhook;

pub use provider::{CheckoutSession, CheckoutSessionParams, GatewayError, PaymentProvider};
pub use stripe::{StripeConfig, StripeProvider};
