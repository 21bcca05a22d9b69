//! Request extractors shared across handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use basho_core::error::CoreError;

use crate::error::AppError;

/// JSON body extractor that reports failures through [`AppError`].
///
/// Axum's own `Json` rejection is plain text; this wrapper funnels
/// malformed bodies through the standard `{ "error": ..., "code": ... }`
/// envelope as a 400 instead.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(AppError::Core(CoreError::Validation(rejection.body_text()))),
        }
    }
}
