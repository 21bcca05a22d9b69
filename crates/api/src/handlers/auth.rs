//! Handlers for the `/auth` resource (register, login).
//!
//! Both endpoints are public and rate-limited per client IP. Rejections
//! for unknown email and wrong password are indistinguishable to the
//! caller.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use basho_core::error::CoreError;
use basho_core::roles::ROLE_USER;
use basho_core::validation;
use basho_db::models::user::{CreateUser, UserResponse};
use basho_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::state::AppState;

/// Registration budget: attempts per client per window.
const REGISTER_LIMIT: u32 = 3;
/// Registration window in seconds.
const REGISTER_WINDOW_SECS: i64 = 300;

/// Login budget: attempts per client per window.
const LOGIN_LIMIT: u32 = 5;
/// Login window in seconds.
const LOGIN_WINDOW_SECS: i64 = 60;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Client identity
// ---------------------------------------------------------------------------

/// Resolve the rate-limit identity of a request.
///
/// The service always sits behind a proxy, so the first `x-forwarded-for`
/// hop is the client; `x-real-ip` is the fallback. `"unknown"` pools
/// clients that present neither, which throttles them collectively --
/// acceptable for abuse deterrence.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    if let Some(real_ip) = headers.get("x-real-ip").and_then(|v| v.to_str().ok()) {
        let real_ip = real_ip.trim();
        if !real_ip.is_empty() {
            return real_ip.to_string();
        }
    }
    "unknown".to_string()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/register
///
/// Create an account and return a session token immediately.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let client = client_ip(&headers);
    if !state
        .limiter
        .allow("register", &client, REGISTER_LIMIT, REGISTER_WINDOW_SECS)
        .await?
    {
        return Err(CoreError::TooManyRequests(
            "Too many registration attempts. Try again later.".into(),
        )
        .into());
    }

    validation::validate_email(&input.email).map_err(CoreError::Validation)?;
    validation::validate_password(&input.password).map_err(CoreError::Validation)?;
    validation::validate_full_name(&input.full_name).map_err(CoreError::Validation)?;

    // Friendly pre-check; uq_users_email backstops the race.
    if UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .is_some()
    {
        return Err(CoreError::Conflict("Email is already registered".into()).into());
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email,
            password_hash,
            full_name: input.full_name.trim().to_string(),
            role: ROLE_USER.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    if let Some(notifier) = &state.notifier {
        let notifier = Arc::clone(notifier);
        let email = user.email.clone();
        let full_name = user.full_name.clone();
        tokio::spawn(async move {
            if let Err(err) = notifier.send_welcome(&email, &full_name).await {
                tracing::warn!(%err, "Failed to send welcome email");
            }
        });
    }

    let token = generate_access_token(user.id, &user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            expires_in: state.config.jwt.expiry_secs(),
            user: user.into(),
        }),
    ))
}

/// POST /auth/login
///
/// Authenticate with email + password. Returns a session token.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let client = client_ip(&headers);
    if !state
        .limiter
        .allow("login", &client, LOGIN_LIMIT, LOGIN_WINDOW_SECS)
        .await?
    {
        return Err(CoreError::TooManyRequests(
            "Too many login attempts. Try again later.".into(),
        )
        .into());
    }

    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Invalid email or password".into()))
        })?;

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        return Err(CoreError::Unauthorized("Invalid email or password".into()).into());
    }

    let token = generate_access_token(user.id, &user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(Json(AuthResponse {
        token,
        expires_in: state.config.jwt.expiry_secs(),
        user: user.into(),
    }))
}
