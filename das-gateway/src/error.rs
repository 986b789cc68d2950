//! Error types for the DAS gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Message returned whenever the upstream credential is missing.
pub const MISSING_CREDENTIAL_MESSAGE: &str = "Helius API key is not set in environment variables.";
/// Fixed message for server-side failures. The cause goes in `details`.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Aggregated error type for the gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No upstream credential configured.
    #[error("{}", MISSING_CREDENTIAL_MESSAGE)]
    MissingCredential,

    /// Caller input failed a validator.
    #[error("{0}")]
    InvalidArgument(String),

    /// The upstream answered with a JSON-RPC `error` member. Holds the full body.
    #[error("upstream reported an error")]
    Upstream(Value),

    /// Network failure or a non-JSON upstream body.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The inbound request body could not be parsed.
    #[error("malformed request body: {0}")]
    MalformedBody(String),

    /// Any other unexpected failure while handling a request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn invalid(message: impl Into<String>) -> Self {
        GatewayError::InvalidArgument(message.into())
    }

    /// Stable code used in log lines.
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential => "MISSING_CREDENTIAL",
            GatewayError::InvalidArgument(_) => "INVALID_ARGUMENT",
            GatewayError::Upstream(_) => "UPSTREAM_ERROR",
            GatewayError::Transport(_) => "TRANSPORT_ERROR",
            GatewayError::MalformedBody(_) => "MALFORMED_BODY",
            GatewayError::Internal(_) => "INTERNAL",
        }
    }

    /// Upstream-reported errors are treated as caller-input problems.
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidArgument(_) | GatewayError::Upstream(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::MissingCredential
            | GatewayError::Transport(_)
            | GatewayError::MalformedBody(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> Value {
        match self {
            GatewayError::MissingCredential => json!({ "error": MISSING_CREDENTIAL_MESSAGE }),
            GatewayError::InvalidArgument(message) => json!({ "error": message }),
            GatewayError::Upstream(body) => body,
            GatewayError::Transport(cause)
            | GatewayError::MalformedBody(cause)
            | GatewayError::Internal(cause) => json!({
                "error": INTERNAL_ERROR_MESSAGE,
                "details": cause,
            }),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self.body())).into_response()
    }
}
