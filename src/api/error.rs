//! Error type for HTTP handlers.
//!
//! Field problems answer 400 with a `field -> [messages]` body, business
//! rule rejections answer 400 with `non_field_errors`, anything else is a
//! logged 500.

use crate::utils::error::{FieldErrors, TheaterError, NON_FIELD_ERRORS};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    Theater(TheaterError),
    /// Body was not JSON at all. Badly typed fields are reported per field.
    MalformedBody(JsonRejection),
}

impl From<TheaterError> for ApiError {
    fn from(err: TheaterError) -> Self {
        Self::Theater(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Theater(err) => {
                if let Some(fields) = err.field_errors() {
                    return (StatusCode::BAD_REQUEST, Json(fields)).into_response();
                }

                if err.is_rule_violation() {
                    let body = FieldErrors::single(NON_FIELD_ERRORS, err.to_string());
                    return (StatusCode::BAD_REQUEST, Json(body)).into_response();
                }

                tracing::error!(
                    category = ?err.category(),
                    error = %err,
                    "Internal server error"
                );
                let body = json!({ "detail": "Internal server error." });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            Self::MalformedBody(rejection) => {
                tracing::debug!(error = %rejection, "Rejected request body");
                let body = json!({ "detail": rejection.body_text() });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
        }
    }
}
