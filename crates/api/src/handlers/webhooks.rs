//! Handler for the `/webhooks/payment` callback endpoint.
//!
//! The gateway delivers callbacks at-least-once, so this handler is the
//! first of two idempotency layers: a delivery whose id is already in
//! `webhook_events` is acknowledged without re-processing. Signature
//! verification happens on the raw body before anything else -- an
//! unverified payload is never parsed.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use basho_core::error::CoreError;
use basho_core::signature;
use basho_db::repositories::WebhookRepo;
use basho_gateway::webhook::{self, event_types};
use serde::Serialize;

use crate::error::AppResult;
use crate::fulfillment;
use crate::state::AppState;

/// Signature header set by the gateway on every delivery.
const SIGNATURE_HEADER: &str = "stripe-signature";

/// Acknowledgement body the gateway expects.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// POST /webhooks/payment
pub async fn payment_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> AppResult<Json<WebhookAck>> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            CoreError::Unauthorized("Missing webhook signature header".into())
        })?;

    signature::verify_header(&state.config.stripe.webhook_secret, header, &body).map_err(
        |err| {
            tracing::warn!(%err, "Rejected webhook delivery");
            CoreError::Unauthorized("Invalid webhook signature".into())
        },
    )?;

    // The signature is valid, so a body that does not parse is a contract
    // break on the gateway's side, not an attack.
    let event = webhook::parse_event(&body)
        .map_err(|err| CoreError::Validation(format!("Unparseable webhook payload: {err}")))?;

    if WebhookRepo::is_processed(&state.pool, &event.id).await? {
        tracing::info!(event_id = %event.id, "Duplicate webhook delivery, skipping");
        return Ok(Json(WebhookAck { received: true }));
    }

    match event.event_type.as_str() {
        event_types::CHECKOUT_COMPLETED => {
            if let Some(session) = event.as_completed_session() {
                fulfillment::fulfill_session(&state, &session).await?;
            } else {
                tracing::error!(event_id = %event.id, "Completion event without a parseable session");
            }
        }
        event_types::CHARGE_REFUNDED => {
            if let Some(charge) = event.as_refunded_charge() {
                fulfillment::refund_charge(&state, &charge).await?;
            } else {
                tracing::error!(event_id = %event.id, "Refund event without a parseable charge");
            }
        }
        other => {
            tracing::debug!(event_id = %event.id, event_type = %other, "Ignoring webhook event type");
        }
    }

    // Recorded only after successful processing; a crash above leaves the
    // id unrecorded so the gateway's retry gets another chance.
    WebhookRepo::record(&state.pool, &event.id, &event.event_type).await?;

    Ok(Json(WebhookAck { received: true }))
}
