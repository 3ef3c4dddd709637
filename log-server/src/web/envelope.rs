//! JSON response envelope.
//!
//! Every envelope carries a `status` field equal to the HTTP status code:
//!
//! ```text
//! success: { "status": 200, ...payload }
//! error:   { "status": 403, "code": "auth_error", "message": "..." }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Fixed error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthError,
}

/// Success shape: `status` is always 200, payload fields are inlined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Success<T> {
    pub status: u16,
    #[serde(flatten)]
    pub data: T,
}

/// Error shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub status: u16,
    pub code: ErrorCode,
    pub message: String,
}

/// Either a success or an error body, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Success(Success<T>),
    Failure(Failure),
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope::Success(Success {
            status: StatusCode::OK.as_u16(),
            data,
        })
    }

    pub fn error(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Self {
        Envelope::Failure(Failure {
            status: status.as_u16(),
            code,
            message: message.into(),
        })
    }

    pub fn status(&self) -> StatusCode {
        let raw = match self {
            Envelope::Success(s) => s.status,
            Envelope::Failure(f) => f.status,
        };
        StatusCode::from_u16(raw).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
