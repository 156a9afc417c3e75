//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::{
    extract::{FromRequest, Json, Request},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor that validates the body before the handler runs.
///
/// Deserializes the request body and runs the `validator` crate's
/// `Validate` on it, so malformed input is rejected before any store
/// call. Rejections use the standard [`crate::ErrorResponse`] envelope.
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateComment {
///     #[validate(length(min = 1))]
///     author_name: String,
///     #[validate(length(min = 1))]
///     content: String,
/// }
///
/// async fn create(ValidatedJson(input): ValidatedJson<CreateComment>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedJson(data))
    }
}
