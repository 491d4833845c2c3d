//! Validated JSON extractor.
//!
//! Deserializes the body with axum's `Json` and validates it with the
//! `validator` crate. Both a malformed body and a failed validation are
//! answered with 400; the latter carries field-level details.

use crate::responses::bad_request;
use catalog_core::{field_errors, ErrorResponse};
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// JSON extractor that validates the deserialized value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T> std::ops::Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejection type for validated JSON extraction.
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    /// Body missing, not JSON, or not the expected shape.
    JsonError(JsonRejection),
    /// Body parsed but failed validation.
    ValidationError(ValidationErrors),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            Self::JsonError(rejection) => {
                bad_request("INVALID_JSON", format!("Invalid JSON: {}", rejection.body_text()))
            }
            Self::ValidationError(errors) => {
                let body = ErrorResponse::new("VALIDATION_ERROR", "Request validation failed")
                    .with_details(field_errors(&errors));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::JsonError)?;

        value
            .validate()
            .map_err(ValidatedJsonRejection::ValidationError)?;

        Ok(ValidatedJson(value))
    }
}
