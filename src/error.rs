use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::models::ErrorResponse;

/// Failures of a single query. None of them are retried; each one ends the
/// request with a 500 and a fixed message.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The resolver could not be launched, exited non-zero, was killed, or
    /// ran past the configured timeout.
    #[error("resolver execution failed: {reason}")]
    ProcessExecution { reason: String },

    #[error("resolver produced no output")]
    EmptyOutput,

    #[error("resolver output is not valid JSON: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

impl GatewayError {
    pub fn execution(reason: impl Into<String>) -> GatewayError {
        GatewayError::ProcessExecution {
            reason: reason.into(),
        }
    }

    /// The message clients see. Internal detail stays in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::ProcessExecution { .. } => "Error executing Python script",
            GatewayError::EmptyOutput => "No results from Python script",
            GatewayError::MalformedOutput(_) => "Error parsing Python script output",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[test]
fn test_public_messages() {
    let parse_err = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();

    assert_eq!(
        GatewayError::execution("exit status: 1").public_message(),
        "Error executing Python script"
    );
    assert_eq!(
        GatewayError::EmptyOutput.public_message(),
        "No results from Python script"
    );
    assert_eq!(
        GatewayError::from(parse_err).public_message(),
        "Error parsing Python script output"
    );
}

#[test]
fn test_detail_is_kept_in_display() {
    let err = GatewayError::execution("exit status: 3");
    assert_eq!(err.to_string(), "resolver execution failed: exit status: 3");
    assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
