//! HTTP handlers.
//!
//! Every DAS handler runs the same pipeline: credential check, decode,
//! validate and assemble `params`, forward, then map the reply.

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{Query, State},
    Json,
};
use das_common::{
    DasMethod, HttpVerb, DEFAULT_PAGE_LIMIT, MAX_BATCH_SIZE, MAX_PAGE_LIMIT,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::GatewayError;
use crate::forwarder::Upstream;
use crate::params;
use crate::validators::{parse_object, JsonObject};
use crate::AppState;

type DasResult = Result<Json<Value>, GatewayError>;

/// Forward `params` and map the upstream reply.
async fn relay(upstream: &dyn Upstream, method: DasMethod, params: Value) -> DasResult {
    let reply = upstream.forward(method, params).await?;
    if reply.has_error() {
        return Err(GatewayError::Upstream(reply.body));
    }
    debug!(method = %method, status = reply.status, "relayed upstream result");
    Ok(Json(reply.body))
}

fn log_failure(method: DasMethod, err: &GatewayError) {
    let code = err.error_code();
    match err {
        GatewayError::InvalidArgument(message) => {
            debug!(method = %method, code, %message, "rejected request")
        }
        GatewayError::Upstream(_) => warn!(method = %method, code, "upstream reported an error"),
        GatewayError::MissingCredential => {
            error!(method = %method, code, "upstream credential not configured")
        }
        GatewayError::Transport(_) | GatewayError::MalformedBody(_) | GatewayError::Internal(_) => {
            error!(method = %method, code, error = %err, "request failed")
        }
    }
}

/// The credential is checked before `build` runs, so a missing key wins over
/// any input problem.
async fn dispatch<F>(state: &AppState, method: DasMethod, build: F) -> DasResult
where
    F: FnOnce() -> Result<Value, GatewayError>,
{
    let result = async {
        let upstream = state.upstream()?;
        let params = build()?;
        relay(upstream, method, params).await
    }
    .await;

    if let Err(err) = &result {
        log_failure(method, err);
    }
    result
}

/// POST variant of [`dispatch`]: the body must decode to a JSON object.
async fn dispatch_object<F>(state: &AppState, method: DasMethod, body: Bytes, build: F) -> DasResult
where
    F: FnOnce(JsonObject) -> Result<Value, GatewayError>,
{
    dispatch(state, method, move || build(parse_object(&body)?)).await
}

pub async fn get_asset(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> DasResult {
    dispatch(&state, DasMethod::GetAsset, || params::get_asset(&query)).await
}

pub async fn get_asset_batch(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetBatch, body, |body| {
        params::get_asset_batch(&body)
    })
    .await
}

pub async fn get_asset_proof(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> DasResult {
    dispatch(&state, DasMethod::GetAssetProof, || params::get_asset_proof(&query)).await
}

pub async fn get_asset_proof_batch(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetProofBatch, body, |body| {
        params::get_asset_proof_batch(&body)
    })
    .await
}

pub async fn get_assets_by_owner(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetsByOwner, body, |body| {
        params::get_assets_by_owner(&body)
    })
    .await
}

pub async fn search_assets(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::SearchAssets, body, params::search_assets).await
}

pub async fn get_assets_by_authority(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetsByAuthority, body, |body| {
        params::get_assets_by_authority(&body)
    })
    .await
}

pub async fn get_assets_by_creator(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetsByCreator, body, |body| {
        params::get_assets_by_creator(&body)
    })
    .await
}

pub async fn get_assets_by_group(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetAssetsByGroup, body, |body| {
        params::get_assets_by_group(&body)
    })
    .await
}

pub async fn get_signatures_for_asset(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetSignaturesForAsset, body, |body| {
        params::get_signatures_for_asset(&body)
    })
    .await
}

pub async fn get_token_accounts(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetTokenAccounts, body, |body| {
        params::get_token_accounts(&body)
    })
    .await
}

pub async fn get_nft_editions(State(state): State<AppState>, body: Bytes) -> DasResult {
    dispatch_object(&state, DasMethod::GetNftEditions, body, |body| {
        params::get_nft_editions(&body)
    })
    .await
}

/// Liveness probe. Never touches the upstream.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "upstream_configured": state.config.has_credential(),
    }))
}

#[derive(Debug, Serialize)]
struct MethodInfo {
    endpoint: String,
    method: &'static str,
    http_verb: HttpVerb,
    description: &'static str,
}

impl From<DasMethod> for MethodInfo {
    fn from(method: DasMethod) -> Self {
        Self {
            endpoint: method.path(),
            method: method.rpc_name(),
            http_verb: method.http_verb(),
            description: method.description(),
        }
    }
}

/// Service metadata and the relayed method catalogue.
pub async fn info() -> Json<Value> {
    let methods: Vec<MethodInfo> = DasMethod::ALL.into_iter().map(MethodInfo::from).collect();
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "methods": methods,
        "limits": {
            "max_batch_size": MAX_BATCH_SIZE,
            "max_page_limit": MAX_PAGE_LIMIT,
            "default_page_limit": DEFAULT_PAGE_LIMIT,
        },
    }))
}
