//! Checkout-session abstraction over the payment gateway.

use async_trait::async_trait;
use serde::Deserialize;

/// Errors from the payment gateway layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-2xx status code.
    #[error("gateway error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// Input for creating a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionParams {
    /// Display name on the payment page (event title, or `"Donation"`).
    pub product_name: String,
    /// Price per unit in cents.
    pub unit_amount_cents: i64,
    /// Number of units.
    pub quantity: u32,
    /// Opaque reference carried through to the completion callback.
    /// Ticket purchases set this; donations leave it empty.
    pub client_reference_id: Option<String>,
    /// Pre-fills the payer's email on the payment page.
    pub customer_email: Option<String>,
    /// Where the gateway redirects after successful payment.
    pub success_url: String,
    /// Where the gateway redirects when the payer backs out.
    pub cancel_url: String,
    /// Unix timestamp after which the session can no longer be paid.
    pub expires_at: Option<i64>,
}

/// A created checkout session the client gets redirected to.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    /// Gateway-assigned session identifier (`cs_...`).
    pub id: String,
    /// Hosted payment page URL.
    pub url: String,
}

/// Creates hosted checkout sessions.
///
/// Object-safe so servers can hold an `Arc<dyn PaymentProvider>` and
/// tests can substitute a scripted double.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, GatewayError>;
}
