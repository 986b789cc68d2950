//! Error types for the gateway client.

use serde_json::Value;
use thiserror::Error;

use crate::verification::VerificationOutcome;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A request object could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    /// No JSON reply arrived from the gateway.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The gateway answered with a non-success status.
    #[error("gateway answered with status {status}")]
    Gateway { status: u16, body: Value },

    /// Every candidate failed compression verification.
    #[error("no identifier passed compression verification ({} rejected)", .warnings.len())]
    NoValidInput { warnings: Vec<VerificationOutcome> },
}

impl ClientError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ClientError::InvalidArgument(message.into())
    }
}
