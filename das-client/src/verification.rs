//! Batch proof pre-verification.
//!
//! Merkle proofs exist only for compressed assets, and the upstream batch
//! call does not flag non-compressed IDs individually. Every candidate is
//! looked up first and only confirmed compressed IDs reach the proof batch.

use das_common::{AssetId, MAX_BATCH_SIZE};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{AssetGateway, GatewayReply};
use crate::error::ClientError;
use crate::requests::{GetAssetRequest, ProofBatchRequest};

pub const LOOKUP_FAILED: &str = "lookup failed";
pub const NOT_COMPRESSED: &str = "not a compressed NFT";

/// Per-identifier verification result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VerificationOutcome {
    pub identifier: AssetId,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl VerificationOutcome {
    pub fn verified(identifier: AssetId) -> Self {
        Self {
            identifier,
            verified: true,
            reason: None,
        }
    }

    pub fn rejected(identifier: AssetId, reason: &str) -> Self {
        Self {
            identifier,
            verified: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Result of a verified proof batch.
#[derive(Clone, Debug, PartialEq)]
pub struct ProofBatchReport {
    /// Identifiers sent to the proof batch, in input order.
    pub verified: Vec<AssetId>,
    /// Identifiers left out, with the reason.
    pub warnings: Vec<VerificationOutcome>,
    /// Gateway body of the proof batch call.
    pub response: Value,
}

/// `Some(compressed)` for a reply carrying an object `result`, `None` otherwise.
fn compression_flag(reply: &GatewayReply) -> Option<bool> {
    if !reply.is_success() {
        return None;
    }
    let result = reply.result_object()?;
    let compressed = result
        .get("compression")
        .and_then(|compression| compression.get("compressed"))
        .and_then(Value::as_bool)
        .unwrap_or(false);
    Some(compressed)
}

async fn verify_one<G>(gateway: &G, identifier: AssetId) -> VerificationOutcome
where
    G: AssetGateway + ?Sized,
{
    let request = GetAssetRequest::new(identifier.clone());
    let flag = match gateway.get_asset(&request).await {
        Ok(reply) => compression_flag(&reply),
        Err(err) => {
            debug!(asset = %identifier, error = %err, "asset lookup failed");
            None
        }
    };

    match flag {
        Some(true) => VerificationOutcome::verified(identifier),
        Some(false) => VerificationOutcome::rejected(identifier, NOT_COMPRESSED),
        None => VerificationOutcome::rejected(identifier, LOOKUP_FAILED),
    }
}

/// Look up every identifier concurrently and wait for all of them.
///
/// Outcomes come back in input order. A failed lookup never cancels the others.
pub async fn verify_compressed<G>(gateway: &G, identifiers: &[AssetId]) -> Vec<VerificationOutcome>
where
    G: AssetGateway + ?Sized,
{
    join_all(
        identifiers
            .iter()
            .cloned()
            .map(|identifier| verify_one(gateway, identifier)),
    )
    .await
}

/// Verify candidates, then fetch proofs for the compressed subset.
///
/// Identifiers are not deduplicated.
pub async fn fetch_verified_proofs<G>(
    gateway: &G,
    identifiers: &[AssetId],
) -> Result<ProofBatchReport, ClientError>
where
    G: AssetGateway + ?Sized,
{
    if identifiers.is_empty() {
        return Err(ClientError::invalid("No asset IDs provided"));
    }
    if identifiers.len() > MAX_BATCH_SIZE {
        return Err(ClientError::invalid(format!(
            "Cannot request more than {} proofs at once",
            MAX_BATCH_SIZE
        )));
    }

    let (verified, warnings): (Vec<_>, Vec<_>) = verify_compressed(gateway, identifiers)
        .await
        .into_iter()
        .partition(|outcome| outcome.verified);

    for outcome in &warnings {
        warn!(
            asset = %outcome.identifier,
            reason = outcome.reason.as_deref().unwrap_or_default(),
            "skipping asset"
        );
    }

    if verified.is_empty() {
        return Err(ClientError::NoValidInput { warnings });
    }

    let verified: Vec<AssetId> = verified.into_iter().map(|outcome| outcome.identifier).collect();
    debug!(
        verified = verified.len(),
        skipped = warnings.len(),
        "requesting proofs"
    );

    let reply = gateway
        .get_asset_proof_batch(&ProofBatchRequest::new(verified.clone()))
        .await?;
    let response = reply.into_result()?;

    Ok(ProofBatchReport {
        verified,
        warnings,
        response,
    })
}
