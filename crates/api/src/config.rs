use basho_gateway::StripeConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All non-secret fields have sensible defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Public-facing site URL, used to build checkout redirect targets.
    pub public_base_url: String,
    /// Minutes a seat hold taken at purchase-intent time stays live. The
    /// checkout session is given the same deadline so both expire together.
    pub hold_ttl_mins: i32,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Payment gateway credentials and endpoint.
    pub stripe: StripeConfig,
}

/// Default hold lifetime in minutes.
const DEFAULT_HOLD_TTL_MINS: i32 = 30;

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `PUBLIC_BASE_URL`      | `http://localhost:5173`    |
    /// | `HOLD_TTL_MINS`        | `30`                       |
    ///
    /// JWT and Stripe secrets are required; see [`JwtConfig::from_env`] and
    /// [`StripeConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .trim_end_matches('/')
            .to_string();

        let hold_ttl_mins: i32 = std::env::var("HOLD_TTL_MINS")
            .unwrap_or_else(|_| DEFAULT_HOLD_TTL_MINS.to_string())
            .parse()
            .expect("HOLD_TTL_MINS must be a valid i32");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            public_base_url,
            hold_ttl_mins,
            jwt: JwtConfig::from_env(),
            stripe: StripeConfig::from_env(),
        }
    }

    /// Redirect target after a successful checkout.
    pub fn checkout_success_url(&self) -> String {
        format!("{}/purchase/success", self.public_base_url)
    }

    /// Redirect target when the payer backs out of checkout.
    pub fn checkout_cancel_url(&self) -> String {
        format!("{}/purchase/cancelled", self.public_base_url)
    }
}
