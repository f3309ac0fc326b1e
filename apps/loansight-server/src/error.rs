//! Error types for the LoanSight server

use analysis_engine::intake::UnknownSample;
use analysis_engine::{IntakeError, SessionError};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body too large: {0}")]
    PayloadTooLarge(String),
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(rejection.body_text())
        } else {
            ServerError::InvalidRequest(rejection.body_text())
        }
    }
}

impl From<UnknownSample> for ServerError {
    fn from(err: UnknownSample) -> Self {
        ServerError::InvalidRequest(err.to_string())
    }
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ServerError::SessionNotFound(id) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                format!("Session '{}' not found", id),
            ),
            ServerError::Intake(err @ IntakeError::UnsupportedMediaType { .. }) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                err.notification().to_string(),
            ),
            ServerError::Intake(err @ IntakeError::NoFile) => (
                StatusCode::BAD_REQUEST,
                "NO_FILE",
                err.notification().to_string(),
            ),
            ServerError::Session(SessionError::NotReady) => (
                StatusCode::CONFLICT,
                "NOT_READY",
                "Upload a document and wait for the analysis to finish".to_string(),
            ),
            ServerError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST", msg.clone())
            }
            ServerError::PayloadTooLarge(msg) => {
                (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE", msg.clone())
            }
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
