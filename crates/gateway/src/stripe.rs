//! Stripe REST API provider.
//!
//! Talks to the Checkout Sessions endpoint with the form-encoded bodies
//! Stripe expects (`line_items[0][price_data][...]` bracket keys).

use async_trait::async_trait;

use crate::provider::{CheckoutSession, CheckoutSessionParams, GatewayError, PaymentProvider};

/// Default API base; point `STRIPE_API_BASE` at a mock in tests.
const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Total per-request timeout for outbound Stripe calls. The adapter must
/// never hang longer than this, even when called outside a request
/// context with its own deadline.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Stripe credentials and endpoint configuration.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret API key (`sk_...`).
    pub secret_key: String,
    /// Callback signing secret (`whsec_...`).
    pub webhook_secret: String,
    /// API base URL (default: `https://api.stripe.com`).
    pub api_base: String,
}

impl StripeConfig {
    /// Load Stripe configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default                  |
    /// |-------------------------|----------|--------------------------|
    /// | `STRIPE_SECRET_KEY`     | **yes**  | --                       |
    /// | `STRIPE_WEBHOOK_SECRET` | **yes**  | --                       |
    /// | `STRIPE_API_BASE`       | no       | `https://api.stripe.com` |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is not set.
    pub fn from_env() -> Self {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .expect("STRIPE_SECRET_KEY must be set in the environment");
        let webhook_secret = std::env::var("STRIPE_WEBHOOK_SECRET")
            .expect("STRIPE_WEBHOOK_SECRET must be set in the environment");
        let api_base =
            std::env::var("STRIPE_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into());

        Self {
            secret_key,
            webhook_secret,
            api_base,
        }
    }
}

/// HTTP client for the Stripe API.
pub struct StripeProvider {
    client: reqwest::Client,
    config: StripeConfig,
}

impl StripeProvider {
    /// Build a provider with a timeout-bounded HTTP client.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, which is a
    /// startup-time environment problem.
    pub fn new(config: StripeConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("HTTP client construction failed");
        Self { client, config }
    }

    /// Create a provider reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling).
    pub fn with_client(client: reqwest::Client, config: StripeConfig) -> Self {
        Self { client, config }
    }

    // ---- private helpers ----

    /// Flatten session params into Stripe's bracketed form fields.
    fn session_form(params: &CheckoutSessionParams) -> Vec<(&'static str, String)> {
        let mut form: Vec<(&'static str, String)> = vec![
            ("mode", "payment".into()),
            ("payment_method_types[]", "card".into()),
            ("line_items[0][price_data][currency]", "usd".into()),
            (
                "line_items[0][price_data][product_data][name]",
                params.product_name.clone(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                params.unit_amount_cents.to_string(),
            ),
            ("line_items[0][quantity]", params.quantity.to_string()),
            ("success_url", params.success_url.clone()),
            ("cancel_url", params.cancel_url.clone()),
        ];

        if let Some(reference) = &params.client_reference_id {
            form.push(("client_reference_id", reference.clone()));
        }
        if let Some(email) = &params.customer_email {
            form.push(("customer_email", email.clone()));
        }
        if let Some(expires_at) = params.expires_at {
            form.push(("expires_at", expires_at.to_string()));
        }

        form
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GatewayError::Api`]
    /// containing the status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PaymentProvider for StripeProvider {
    async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams,
    ) -> Result<CheckoutSession, GatewayError> {
        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.config.api_base))
            .bearer_auth(&self.config.secret_key)
            .form(&Self::session_form(params))
            .send()
            .await?;

        Self::parse_response(response).await
    }
}
