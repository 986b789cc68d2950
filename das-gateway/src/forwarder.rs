//! RPC forwarder: one JSON-RPC envelope, one upstream POST.

use async_trait::async_trait;
use das_common::{DasMethod, RpcEnvelope};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::GatewayError;

/// Query parameter carrying the upstream credential.
const API_KEY_PARAM: &str = "api-key";

/// Parsed upstream reply.
#[derive(Clone, Debug, PartialEq)]
pub struct UpstreamReply {
    /// HTTP status of the upstream exchange. Informational only.
    pub status: u16,
    /// Upstream JSON body, untouched.
    pub body: Value,
}

impl UpstreamReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// True when the body carries a JSON-RPC `error` member.
    pub fn has_error(&self) -> bool {
        matches!(self.body.get("error"), Some(error) if !error.is_null())
    }
}

/// Upstream DAS endpoint.
///
/// Implementations issue exactly one call per invocation and never retry.
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn forward(&self, method: DasMethod, params: Value)
        -> Result<UpstreamReply, GatewayError>;
}

/// HTTPS forwarder to a JSON-RPC upstream, authenticated by an API key query parameter.
pub struct RpcForwarder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RpcForwarder {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }

    /// Strip the credential from text that may reach a caller or a log line.
    fn redact(&self, message: String) -> String {
        if self.api_key.is_empty() {
            message
        } else {
            message.replace(&self.api_key, "[redacted]")
        }
    }

    /// Renders the whole source chain so the root cause reaches the caller.
    fn transport_error(&self, context: &str, err: reqwest::Error) -> GatewayError {
        let chain = anyhow::Error::new(err.without_url()).context(context.to_string());
        GatewayError::Transport(self.redact(format!("{:#}", chain)))
    }
}

#[async_trait]
impl Upstream for RpcForwarder {
    async fn forward(
        &self,
        method: DasMethod,
        params: Value,
    ) -> Result<UpstreamReply, GatewayError> {
        let envelope = RpcEnvelope::new(method, params);
        debug!(method = %method, "forwarding request upstream");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[(API_KEY_PARAM, self.api_key.as_str())])
            .json(&envelope)
            .send()
            .await
            .map_err(|e| self.transport_error("request failed", e))?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| self.transport_error("invalid upstream response", e))?;

        debug!(method = %method, status, "upstream replied");
        Ok(UpstreamReply::new(status, body))
    }
}
