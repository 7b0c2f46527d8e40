//! Enhanced JSON extractor with improved error handling.
//!
//! This module provides [`Json`], an enhanced version of [`axum::Json`] whose
//! rejections are rendered as JSON error bodies instead of plain text.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Json as AxumJson, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Deref, DerefMut, From};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::sanitize_error_message;
use crate::handler::{Error, ErrorKind};

/// Maximum JSON payload size in bytes, axum's default body limit (2MB).
pub const MAX_JSON_PAYLOAD_SIZE: usize = 2 * 1024 * 1024;

/// Enhanced JSON extractor with improved error handling.
///
/// Malformed JSON, missing fields, a wrong content type and oversized bodies
/// each map to their own [`ErrorKind`] with a short explanation in the
/// response context.
///
/// [`Json`]: AxumJson
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Creates a new [`Json`] wrapper around the provided value.
    #[inline]
    pub fn new(inner: T) -> Self {
        Self(inner)
    }

    /// Returns the inner value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequest<S> for Json<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let extractor = <AxumJson<T> as FromRequest<S>>::from_request(req, state).await;
        extractor.map(|x| Self::new(x.0)).map_err(Into::into)
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    #[inline]
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

impl From<JsonRejection> for Error<'static> {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ErrorKind::UnprocessableEntity
                .with_message("Invalid request data format")
                .with_context(format!(
                    "JSON deserialization failed: {}. Verify that all required fields are present and have correct types.",
                    sanitize_error_message(&err.body_text(), 3, 200)
                )),
            JsonRejection::JsonSyntaxError(err) => ErrorKind::BadRequest
                .with_message("Invalid JSON syntax in request body")
                .with_context(format!(
                    "JSON parsing failed: {}. Ensure the request body contains well-formed JSON.",
                    sanitize_error_message(&err.body_text(), 3, 200)
                )),
            JsonRejection::MissingJsonContentType(_) => ErrorKind::UnsupportedMediaType
                .with_message("Invalid content type")
                .with_context("Request must have the header: Content-Type: application/json"),
            JsonRejection::BytesRejection(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ErrorKind::PayloadTooLarge
                    .with_message("Request body too large")
                    .with_context(format!(
                        "Request body exceeds maximum allowed size of {} bytes.",
                        MAX_JSON_PAYLOAD_SIZE
                    ))
            }
            JsonRejection::BytesRejection(err) => ErrorKind::BadRequest
                .with_message("Failed to read request body")
                .with_context(format!(
                    "Request body processing failed: {}.",
                    sanitize_error_message(&err.body_text(), 3, 200)
                )),
            other => ErrorKind::InternalServerError
                .with_message("Request processing failed")
                .with_context(sanitize_error_message(&other.body_text(), 3, 200)),
        }
    }
}
