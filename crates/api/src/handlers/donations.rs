//! Handler for the public `/donate` endpoint.
//!
//! Donations reuse the checkout machinery with a single fixed-amount
//! line item and no purchase reference, so the completion callback
//! acknowledges them without issuing anything.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use basho_core::error::CoreError;
use basho_core::validation;
use basho_gateway::CheckoutSessionParams;
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::handlers::auth::client_ip;
use crate::handlers::tickets::PurchaseResponse;
use crate::state::AppState;

/// Donation budget: session creations per client per window. The
/// endpoint needs no account, so this is the only brake on anonymous
/// session minting.
const DONATE_LIMIT: u32 = 10;
/// Donation window in seconds.
const DONATE_WINDOW_SECS: i64 = 60;

/// Request body for `POST /donate`.
#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    pub amount_cents: i64,
    /// Pre-fills the payment page; donors need no account.
    pub email: Option<String>,
}

/// POST /donate
pub async fn donate(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<DonationRequest>,
) -> AppResult<Json<PurchaseResponse>> {
    let client = client_ip(&headers);
    if !state
        .limiter
        .allow("donate", &client, DONATE_LIMIT, DONATE_WINDOW_SECS)
        .await?
    {
        return Err(CoreError::TooManyRequests(
            "Too many donation attempts. Try again later.".into(),
        )
        .into());
    }

    validation::validate_donation_cents(input.amount_cents).map_err(CoreError::Validation)?;
    if let Some(email) = &input.email {
        validation::validate_email(email).map_err(CoreError::Validation)?;
    }

    let params = CheckoutSessionParams {
        product_name: "Donation".to_string(),
        unit_amount_cents: input.amount_cents,
        quantity: 1,
        client_reference_id: None,
        customer_email: input.email,
        success_url: state.config.checkout_success_url(),
        cancel_url: state.config.checkout_cancel_url(),
        expires_at: None,
    };

    let session = state.gateway.create_checkout_session(&params).await?;
    tracing::info!(session_id = %session.id, amount_cents = input.amount_cents, "Donation session created");

    Ok(Json(PurchaseResponse {
        session_id: session.id,
        url: session.url,
    }))
}
