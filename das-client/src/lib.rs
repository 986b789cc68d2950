//! das-client
//!
//! Typed access to the DAS gateway, plus the pre-verification workflow that
//! keeps non-compressed assets out of proof batches.

pub mod client;
pub mod error;
pub mod requests;
pub mod verification;

pub use client::{AssetGateway, GatewayClient, GatewayReply, DEFAULT_GATEWAY_URL};
pub use error::ClientError;
pub use requests::{
    AssetBatchRequest, AssetProofRequest, AssetsByOwnerRequest, GetAssetRequest,
    ProofBatchRequest, SearchAssetsRequest,
};
pub use verification::{
    fetch_verified_proofs, verify_compressed, ProofBatchReport, VerificationOutcome,
    LOOKUP_FAILED, NOT_COMPRESSED,
};
