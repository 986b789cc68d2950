//! das-gateway library
//!
//! Axum-based HTTP gateway relaying browser requests to a Digital Asset
//! Standard (DAS) JSON-RPC upstream.
//!
//! # Features
//! - Credential held server-side and attached to every upstream call
//! - Input validation and clamping before anything reaches the network
//! - Permissive CORS on every route

pub mod config;
pub mod error;
pub mod forwarder;
pub mod handlers;
pub mod params;
pub mod validators;

use std::sync::Arc;

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use das_common::DasMethod;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::GatewayConfig;
pub use error::{GatewayError, INTERNAL_ERROR_MESSAGE, MISSING_CREDENTIAL_MESSAGE};
pub use forwarder::{RpcForwarder, Upstream, UpstreamReply};

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    upstream: Option<Arc<dyn Upstream>>,
}

impl AppState {
    /// Build state from configuration. No forwarder is created without a credential.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let upstream = match &config.api_key {
            Some(key) => {
                let forwarder = RpcForwarder::new(config.upstream_url.clone(), key.clone())?;
                Some(Arc::new(forwarder) as Arc<dyn Upstream>)
            }
            None => None,
        };

        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }

    /// State with an explicit upstream, used to swap in a fake.
    pub fn with_upstream(config: GatewayConfig, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            config: Arc::new(config),
            upstream: Some(upstream),
        }
    }

    /// The upstream to call, or `MissingCredential` when no key is configured.
    pub fn upstream(&self) -> Result<&dyn Upstream, GatewayError> {
        if !self.config.has_credential() {
            return Err(GatewayError::MissingCredential);
        }
        self.upstream
            .as_deref()
            .ok_or(GatewayError::MissingCredential)
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
}

/// Build the router from configuration.
pub fn app_router(config: GatewayConfig) -> Result<Router, GatewayError> {
    Ok(app_router_with_state(AppState::from_config(config)?))
}

/// Build the router around existing state.
pub fn app_router_with_state(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/info", get(handlers::info))
        .route(&DasMethod::GetAsset.path(), get(handlers::get_asset))
        .route(&DasMethod::GetAssetBatch.path(), post(handlers::get_asset_batch))
        .route(&DasMethod::GetAssetProof.path(), get(handlers::get_asset_proof))
        .route(
            &DasMethod::GetAssetProofBatch.path(),
            post(handlers::get_asset_proof_batch),
        )
        .route(
            &DasMethod::GetAssetsByOwner.path(),
            post(handlers::get_assets_by_owner),
        )
        .route(&DasMethod::SearchAssets.path(), post(handlers::search_assets))
        .route(
            &DasMethod::GetAssetsByAuthority.path(),
            post(handlers::get_assets_by_authority),
        )
        .route(
            &DasMethod::GetAssetsByCreator.path(),
            post(handlers::get_assets_by_creator),
        )
        .route(
            &DasMethod::GetAssetsByGroup.path(),
            post(handlers::get_assets_by_group),
        )
        .route(
            &DasMethod::GetSignaturesForAsset.path(),
            post(handlers::get_signatures_for_asset),
        )
        .route(
            &DasMethod::GetTokenAccounts.path(),
            post(handlers::get_token_accounts),
        )
        .route(
            &DasMethod::GetNftEditions.path(),
            post(handlers::get_nft_editions),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}
