//! Integration tests for the DAS gateway HTTP surface.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::{
    header::{ACCESS_CONTROL_REQUEST_METHOD, ORIGIN},
    HeaderValue, Method, StatusCode,
};
use axum_test::TestServer;
use das_common::DasMethod;
use das_gateway::{
    app_router_with_state, AppState, GatewayConfig, GatewayError, Upstream, UpstreamReply,
    INTERNAL_ERROR_MESSAGE, MISSING_CREDENTIAL_MESSAGE,
};
use serde_json::{json, Value};

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    RpcError,
    Unreachable,
}

/// Upstream double that records every call it receives.
struct RecordingUpstream {
    behaviour: Behaviour,
    calls: Mutex<Vec<(DasMethod, Value)>>,
}

impl RecordingUpstream {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(DasMethod, Value)> {
        self.calls.lock().unwrap().clone()
    }

    fn last_params(&self) -> Value {
        self.calls().last().expect("upstream was not called").1.clone()
    }
}

#[async_trait]
impl Upstream for RecordingUpstream {
    async fn forward(&self, method: DasMethod, params: Value) -> Result<UpstreamReply, GatewayError> {
        self.calls.lock().unwrap().push((method, params));
        match self.behaviour {
            Behaviour::Succeed => Ok(UpstreamReply::new(
                200,
                json!({ "jsonrpc": "2.0", "id": "das-gateway", "result": { "items": [] } }),
            )),
            Behaviour::RpcError => Ok(UpstreamReply::new(
                200,
                json!({
                    "jsonrpc": "2.0",
                    "id": "das-gateway",
                    "error": { "code": -32000, "message": "Asset not found" }
                }),
            )),
            Behaviour::Unreachable => Err(GatewayError::Transport(
                "request failed: connection refused".to_string(),
            )),
        }
    }
}

fn configured() -> GatewayConfig {
    GatewayConfig::new(Some("test-key".into()), "http://127.0.0.1:1")
}

/// Create a test server backed by `upstream`.
fn create_server(config: GatewayConfig, upstream: Arc<RecordingUpstream>) -> TestServer {
    let state = AppState::with_upstream(config, upstream);
    TestServer::new(app_router_with_state(state)).expect("should create test server")
}

fn ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("asset-{}", i)).collect()
}

#[tokio::test]
async fn test_empty_identifier_lists_are_rejected_locally() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    for path in ["/das/get-asset-batch", "/das/get-asset-proof-batch"] {
        for body in [json!({ "assetIds": [] }), json!({}), json!({ "assetIds": "X" })] {
            let response = server.post(path).json(&body).await;
            assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
            let body: Value = response.json();
            assert_eq!(body["error"], "Missing or invalid 'assetIds' in request body");
        }
    }

    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_oversized_identifier_lists_cite_the_ceiling() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let response = server
        .post("/das/get-asset-batch")
        .json(&json!({ "assetIds": ids(1001) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Cannot request more than 1000 assets at once");

    let response = server
        .post("/das/get-asset-proof-batch")
        .json(&json!({ "assetIds": ids(1001) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Cannot request more than 1000 proofs at once");

    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_batch_identifiers_are_forwarded_exactly() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let input = vec!["C", "A", "B", "A"];
    server
        .post("/das/get-asset-proof-batch")
        .json(&json!({ "assetIds": input }))
        .await
        .assert_status_ok();
    assert_eq!(upstream.last_params(), json!({ "ids": ["C", "A", "B", "A"] }));

    let full = ids(1000);
    server
        .post("/das/get-asset-batch")
        .json(&json!({ "assetIds": full }))
        .await
        .assert_status_ok();
    assert_eq!(upstream.last_params()["ids"], json!(full));
}

#[tokio::test]
async fn test_scenario_a_batch_without_flags() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .post("/das/get-asset-batch")
        .json(&json!({ "assetIds": ["X", "Y"] }))
        .await
        .assert_status_ok();

    let calls = upstream.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, DasMethod::GetAssetBatch);
    assert_eq!(calls[0].1, json!({ "ids": ["X", "Y"], "displayOptions": {} }));
}

#[tokio::test]
async fn test_unset_display_flags_are_omitted() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .get("/das/get-asset")
        .add_query_param("assetId", "X")
        .add_query_param("showFungible", "true")
        .await
        .assert_status_ok();
    assert_eq!(
        upstream.last_params(),
        json!({ "id": "X", "displayOptions": { "showFungible": true } })
    );

    server
        .post("/das/get-asset-batch")
        .json(&json!({ "assetIds": ["X"], "showCollectionMetadata": true, "showInscription": null }))
        .await
        .assert_status_ok();
    let options = upstream.last_params()["displayOptions"].clone();
    assert_eq!(options, json!({ "showCollectionMetadata": true }));
    assert!(options.get("showInscription").is_none());
    assert!(options.get("showFungible").is_none());
}

#[tokio::test]
async fn test_get_asset_requires_asset_id() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    for path in ["/das/get-asset", "/das/get-asset-proof"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Missing 'assetId' parameter");
    }
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_asset_proof_forwards_id_only() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .get("/das/get-asset-proof")
        .add_query_param("assetId", "X")
        .await
        .assert_status_ok();
    assert_eq!(upstream.calls()[0].0, DasMethod::GetAssetProof);
    assert_eq!(upstream.last_params(), json!({ "id": "X" }));
}

#[tokio::test]
async fn test_scenario_b_owner_listing_defaults() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .post("/das/get-assets-by-owner")
        .json(&json!({ "ownerAddress": "abc", "limit": 5000 }))
        .await
        .assert_status_ok();

    let params = upstream.last_params();
    assert_eq!(params["ownerAddress"], "abc");
    assert_eq!(params["limit"], 1000);
    assert_eq!(params["page"], 1);
    assert_eq!(params["sortBy"], json!({ "sortBy": "created", "sortDirection": "desc" }));
}

#[tokio::test]
async fn test_limit_is_clamped_below() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .post("/das/get-assets-by-owner")
        .json(&json!({ "ownerAddress": "abc", "limit": 0, "page": -3 }))
        .await
        .assert_status_ok();
    let params = upstream.last_params();
    assert_eq!(params["limit"], 1);
    assert_eq!(params["page"], 1);

    server
        .post("/das/search-assets")
        .json(&json!({ "ownerAddress": "abc", "limit": "-10" }))
        .await
        .assert_status_ok();
    assert_eq!(upstream.last_params()["limit"], 1);

    server
        .post("/das/search-assets")
        .json(&json!({ "ownerAddress": "abc", "limit": 2500 }))
        .await
        .assert_status_ok();
    assert_eq!(upstream.last_params()["limit"], 1000);
}

#[tokio::test]
async fn test_owner_listing_requires_owner() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let response = server
        .post("/das/get-assets-by-owner")
        .json(&json!({ "limit": 10 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing required 'ownerAddress' parameter");
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_search_token_type_requires_owner() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let response = server
        .post("/das/search-assets")
        .json(&json!({ "tokenType": "fungible" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Owner address is required when using tokenType filter");
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_search_passes_filters_through() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    server
        .post("/das/search-assets")
        .json(&json!({ "compressed": true, "grouping": ["collection", "C"] }))
        .await
        .assert_status_ok();
    assert_eq!(
        upstream.last_params(),
        json!({ "compressed": true, "grouping": ["collection", "C"], "page": 1, "limit": 100 })
    );
}

#[tokio::test]
async fn test_success_body_is_relayed_unchanged() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream);

    let response = server
        .get("/das/get-asset")
        .add_query_param("assetId", "X")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "jsonrpc": "2.0", "id": "das-gateway", "result": { "items": [] } })
    );
}

#[tokio::test]
async fn test_upstream_errors_are_client_errors() {
    let upstream = RecordingUpstream::new(Behaviour::RpcError);
    let server = create_server(configured(), upstream);

    let response = server
        .post("/das/get-asset-proof-batch")
        .json(&json!({ "assetIds": ["X"] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"]["message"], "Asset not found");
    assert_eq!(body["jsonrpc"], "2.0");
}

#[tokio::test]
async fn test_transport_failures_are_server_errors() {
    let upstream = RecordingUpstream::new(Behaviour::Unreachable);
    let server = create_server(configured(), upstream);

    let response = server
        .get("/das/get-asset")
        .add_query_param("assetId", "X")
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    assert_eq!(body["details"], "request failed: connection refused");
}

#[tokio::test]
async fn test_unparseable_body_is_a_server_error() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let response = server.post("/das/get-asset-batch").text("{not json").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], INTERNAL_ERROR_MESSAGE);
    assert!(body["details"].is_string());
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_scenario_d_missing_credential() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(GatewayConfig::default(), upstream.clone());

    for method in DasMethod::ALL {
        let path = method.path();
        let valid = server
            .post(&path)
            .json(&json!({ "assetIds": ["X"], "ownerAddress": "abc" }))
            .await;
        let empty = server.get(&path).await;

        for response in [valid, empty] {
            if response.status_code() == StatusCode::METHOD_NOT_ALLOWED {
                continue;
            }
            assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR, "{}", path);
            let body: Value = response.json();
            assert_eq!(body, json!({ "error": MISSING_CREDENTIAL_MESSAGE }));
        }
    }

    let response = server.post("/das/get-asset-batch").text("{not json").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], MISSING_CREDENTIAL_MESSAGE);

    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_preflight_is_answered_by_cors() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    for method in DasMethod::ALL {
        let response = server
            .method(Method::OPTIONS, &method.path())
            .add_header(ORIGIN, HeaderValue::from_static("http://localhost:3000"))
            .add_header(ACCESS_CONTROL_REQUEST_METHOD, HeaderValue::from_static("POST"))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().is_empty());
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let allowed = headers["access-control-allow-methods"].to_str().unwrap();
        for verb in ["GET", "POST", "OPTIONS"] {
            assert!(allowed.contains(verb), "{} missing from {}", verb, allowed);
        }
        assert_eq!(
            headers["access-control-allow-headers"]
                .to_str()
                .unwrap()
                .to_ascii_lowercase(),
            "content-type"
        );
    }

    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_supplemented_methods_are_relayed() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let cases = [
        (DasMethod::GetAssetsByAuthority, json!({ "authorityAddress": "auth" })),
        (DasMethod::GetAssetsByCreator, json!({ "creatorAddress": "creator", "onlyVerified": "true" })),
        (DasMethod::GetAssetsByGroup, json!({ "groupKey": "collection", "groupValue": "C" })),
        (DasMethod::GetSignaturesForAsset, json!({ "id": "X", "limit": 50 })),
        (DasMethod::GetTokenAccounts, json!({ "mint": "M" })),
        (DasMethod::GetNftEditions, json!({ "mint": "M" })),
    ];

    for (method, body) in cases {
        server.post(&method.path()).json(&body).await.assert_status_ok();
        let (called, params) = upstream.calls().last().cloned().unwrap();
        assert_eq!(called, method);
        assert!(params["page"] == 1, "{} params: {}", method, params);
    }

    let calls = upstream.calls();
    assert_eq!(calls[1].1["onlyVerified"], true);
    assert_eq!(calls[2].1["sortBy"]["sortDirection"], "desc");
    assert_eq!(calls[3].1["limit"], 50);
    assert!(calls[3].1.get("sortBy").is_none());
}

#[tokio::test]
async fn test_supplemented_methods_validate_required_fields() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    for method in [
        DasMethod::GetAssetsByAuthority,
        DasMethod::GetAssetsByCreator,
        DasMethod::GetAssetsByGroup,
        DasMethod::GetSignaturesForAsset,
        DasMethod::GetTokenAccounts,
        DasMethod::GetNftEditions,
    ] {
        let response = server.post(&method.path()).json(&json!({})).await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}", method);
    }
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_sort_and_flag_values_are_rejected() {
    let upstream = RecordingUpstream::new(Behaviour::Succeed);
    let server = create_server(configured(), upstream.clone());

    let response = server
        .post("/das/get-assets-by-owner")
        .json(&json!({ "ownerAddress": "abc", "sortBy": { "sortBy": "newest" } }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/das/get-asset-batch")
        .json(&json!({ "assetIds": ["X"], "showFungible": 1 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .post("/das/get-assets-by-owner")
        .json(&json!({ "ownerAddress": "abc", "limit": "many" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert!(upstream.calls().is_empty());
}
