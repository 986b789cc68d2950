//! HTTP client for the DAS gateway.

use async_trait::async_trait;
use das_common::DasMethod;
use reqwest::RequestBuilder;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::requests::{
    AssetBatchRequest, AssetProofRequest, AssetsByOwnerRequest, GetAssetRequest,
    ProofBatchRequest, SearchAssetsRequest,
};

/// `err` followed by every error in its source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Gateway base URL used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:8888";

/// A gateway answer: status plus JSON body, success or not.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayReply {
    pub status: u16,
    pub body: Value,
}

impl GatewayReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The body of a 2xx reply, otherwise [`ClientError::Gateway`].
    pub fn into_result(self) -> Result<Value, ClientError> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(ClientError::Gateway {
                status: self.status,
                body: self.body,
            })
        }
    }

    /// The JSON-RPC `result` member, when present and an object.
    pub fn result_object(&self) -> Option<&serde_json::Map<String, Value>> {
        self.body.get("result").and_then(Value::as_object)
    }
}

/// The two gateway calls the proof pre-verification workflow needs.
#[async_trait]
pub trait AssetGateway: Send + Sync {
    async fn get_asset(&self, request: &GetAssetRequest) -> Result<GatewayReply, ClientError>;

    async fn get_asset_proof_batch(
        &self,
        request: &ProofBatchRequest,
    ) -> Result<GatewayReply, ClientError>;
}

/// DAS gateway client.
#[derive(Clone, Debug)]
pub struct GatewayClient {
    /// HTTP client.
    client: reqwest::Client,
    /// Gateway base URL, without the `/das` prefix.
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, route: &str, request: RequestBuilder) -> Result<GatewayReply, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Transport(format!("request failed: {}", error_chain(&e))))?;

        let status = response.status().as_u16();
        let body: Value = response
            .json()
            .await
            .map_err(|e| {
                ClientError::Transport(format!("invalid gateway response: {}", error_chain(&e)))
            })?;

        debug!(route, status, "gateway replied");
        Ok(GatewayReply { status, body })
    }

    async fn get(
        &self,
        method: DasMethod,
        query: &[(&'static str, String)],
    ) -> Result<GatewayReply, ClientError> {
        let path = method.path();
        let request = self.client.get(self.url(&path)).query(query);
        self.send(&path, request).await
    }

    /// POST a JSON body to any DAS endpoint.
    pub async fn post(&self, method: DasMethod, body: &Value) -> Result<GatewayReply, ClientError> {
        let path = method.path();
        let request = self.client.post(self.url(&path)).json(body);
        self.send(&path, request).await
    }

    pub async fn get_asset(&self, request: &GetAssetRequest) -> Result<GatewayReply, ClientError> {
        self.get(DasMethod::GetAsset, &request.query_pairs()).await
    }

    pub async fn get_asset_batch(
        &self,
        request: &AssetBatchRequest,
    ) -> Result<GatewayReply, ClientError> {
        self.post(DasMethod::GetAssetBatch, &request.body()?).await
    }

    pub async fn get_asset_proof(
        &self,
        request: &AssetProofRequest,
    ) -> Result<GatewayReply, ClientError> {
        self.get(DasMethod::GetAssetProof, &request.query_pairs()).await
    }

    pub async fn get_asset_proof_batch(
        &self,
        request: &ProofBatchRequest,
    ) -> Result<GatewayReply, ClientError> {
        self.post(DasMethod::GetAssetProofBatch, &request.body()?).await
    }

    pub async fn get_assets_by_owner(
        &self,
        request: &AssetsByOwnerRequest,
    ) -> Result<GatewayReply, ClientError> {
        self.post(DasMethod::GetAssetsByOwner, &request.body()?).await
    }

    pub async fn search_assets(
        &self,
        request: &SearchAssetsRequest,
    ) -> Result<GatewayReply, ClientError> {
        self.post(DasMethod::SearchAssets, &request.body()).await
    }

    /// `GET /health`.
    pub async fn health(&self) -> Result<GatewayReply, ClientError> {
        self.send("/health", self.client.get(self.url("/health"))).await
    }
}

impl Default for GatewayClient {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_URL)
    }
}

#[async_trait]
impl AssetGateway for GatewayClient {
    async fn get_asset(&self, request: &GetAssetRequest) -> Result<GatewayReply, ClientError> {
        GatewayClient::get_asset(self, request).await
    }

    async fn get_asset_proof_batch(
        &self,
        request: &ProofBatchRequest,
    ) -> Result<GatewayReply, ClientError> {
        GatewayClient::get_asset_proof_batch(self, request).await
    }
}
