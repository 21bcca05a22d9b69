//! Transactional email via SMTP.
//!
//! [`Notifier`] wraps the `lettre` async SMTP transport to send plain-text
//! confirmation emails. Configuration is loaded from environment variables;
//! if `SMTP_HOST` is not set, [`EmailConfig::from_env`] returns `None` and
//! the server runs without outbound email. Every send is best-effort: the
//! caller spawns it and a failure is logged, never surfaced to the client.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use basho_db::models::ticket::Ticket;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@basho.local";

/// Outbound SMTP connection timeout.
const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the SMTP notifier.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and should be skipped.
    ///
    /// | Variable        | Required | Default               |
    /// |-----------------|----------|-----------------------|
    /// | `SMTP_HOST`     | yes      | --                    |
    /// | `SMTP_PORT`     | no       | `587`                 |
    /// | `SMTP_FROM`     | no       | `noreply@basho.local` |
    /// | `SMTP_USER`     | no       | --                    |
    /// | `SMTP_PASSWORD` | no       | --                    |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Sends transactional emails (welcome, ticket confirmation) via SMTP.
pub struct Notifier {
    config: EmailConfig,
}

impl Notifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Greet a freshly registered user.
    pub async fn send_welcome(&self, to_email: &str, full_name: &str) -> Result<(), EmailError> {
        let body = format!(
            "Hi {full_name},\n\n\
             Welcome aboard! Your account is ready -- browse upcoming events\n\
             and grab your tickets any time.\n"
        );
        self.send(to_email, "Welcome!", body).await
    }

    /// Deliver verification codes for freshly issued tickets.
    pub async fn send_ticket_confirmation(
        &self,
        to_email: &str,
        event_title: &str,
        tickets: &[Ticket],
    ) -> Result<(), EmailError> {
        let mut body = format!(
            "Your payment went through -- {} ticket(s) for \"{event_title}\" are confirmed.\n\n\
             Show any of these codes at the door:\n\n",
            tickets.len()
        );
        for ticket in tickets {
            body.push_str(&format!(
                "  {}\n  {}\n\n",
                ticket.verification_code,
                basho_core::verification::qr_code_url(&ticket.verification_code)
            ));
        }

        let subject = format!("Your tickets for {event_title}");
        self.send(to_email, &subject, body).await
    }

    async fn send(&self, to_email: &str, subject: &str, body: String) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(self.config.from_address.parse()?)
            .to(to_email.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| EmailError::Build(e.to_string()))?;

        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)?
                .port(self.config.smtp_port)
                .timeout(Some(SMTP_TIMEOUT));

        if let (Some(user), Some(password)) = (&self.config.smtp_user, &self.config.smtp_password)
        {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        builder.build().send(email).await?;
        Ok(())
    }
}
