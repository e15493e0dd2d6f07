use crate::assessment::{AssessmentServiceError, IntakeError};
use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;
use tracing::error;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Answers(serde_json::Error),
    Assessment(AssessmentServiceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Answers(err) => write!(f, "invalid answers: {}", err),
            AppError::Assessment(err) => write!(f, "assessment error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Answers(err) => Some(err),
            AppError::Assessment(err) => Some(err),
        }
    }
}

const GENERIC_FAILURE: &str = "failed to process assessment";

/// Clients see a fixed message per status; internal detail stays in the logs. Intake and
/// answer errors describe the caller's own payload, so they keep a `detail` field.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, payload) = match &self {
            AppError::Answers(err) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "invalid answers", "detail": err.to_string() }),
            ),
            AppError::Assessment(AssessmentServiceError::Intake(err)) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": GENERIC_FAILURE, "detail": err.to_string() }),
            ),
            AppError::Assessment(AssessmentServiceError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "error": "report not found" }),
            ),
            AppError::Assessment(
                err @ (AssessmentServiceError::Narrative { .. }
                | AssessmentServiceError::Render { .. }),
            ) => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": GENERIC_FAILURE, "report_id": err.report_id() }),
            ),
            AppError::Assessment(AssessmentServiceError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": GENERIC_FAILURE }),
            ),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) | AppError::Server(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "internal server error" }),
            ),
        };

        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "request failed");
        }
        (status, Json(payload)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Answers(value)
    }
}

impl From<AssessmentServiceError> for AppError {
    fn from(value: AssessmentServiceError) -> Self {
        Self::Assessment(value)
    }
}

impl From<IntakeError> for AppError {
    fn from(value: IntakeError) -> Self {
        Self::Assessment(AssessmentServiceError::Intake(value))
    }
}
