//! Handlers for the `/user` resource (own profile, own tickets).

use axum::extract::State;
use axum::Json;
use basho_core::error::CoreError;
use basho_core::validation;
use basho_db::models::ticket::TicketWithEvent;
use basho_db::models::user::{ProfileResponse, UpdateProfile};
use basho_db::repositories::{TicketRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /user/profile
pub async fn get_profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    let profile = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| {
            // Token outlived the account; treat as a stale credential.
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    Ok(Json(DataResponse {
        data: profile.into(),
    }))
}

/// PUT /user/profile
///
/// Partial update: only provided fields change. Email and name are
/// re-validated when present; a duplicate email surfaces as 409 via the
/// unique constraint.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<UpdateProfile>,
) -> AppResult<Json<DataResponse<ProfileResponse>>> {
    if !input.has_changes() {
        return Err(CoreError::Validation("No fields to update".into()).into());
    }

    if let Some(email) = &input.email {
        validation::validate_email(email).map_err(CoreError::Validation)?;
    }
    if let Some(full_name) = &input.full_name {
        validation::validate_full_name(full_name).map_err(CoreError::Validation)?;
    }

    let updated = UserRepo::update_profile(&state.pool, user.user_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("User no longer exists".into()))
        })?;

    tracing::info!(user_id = %updated.id, "Profile updated");

    Ok(Json(DataResponse {
        data: updated.into(),
    }))
}

/// GET /user/tickets
///
/// List the caller's tickets with event details, newest event first.
pub async fn list_tickets(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<TicketWithEvent>>>> {
    let tickets = TicketRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: tickets }))
}
