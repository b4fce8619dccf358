//! JSON extractor with automatic validation using the validator crate.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON extractor with automatic validation.
///
/// Every failure is a 400: JSON syntax errors, missing fields, a wrong
/// `Content-Type` and `Validate` failures (with per-field details).
///
/// # Example
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct CreateNote {
///     #[validate(length(min = 1))]
///     title: String,
/// }
///
/// async fn create(ValidatedJson(payload): ValidatedJson<CreateNote>) -> String {
///     payload.title
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}
