//! das-common
//!
//! Value types shared by the DAS gateway and its client: asset identifiers,
//! display flags, paging and sorting, the JSON-RPC envelope sent upstream,
//! and the catalogue of relayed DAS methods.
//!
//! Everything here is request-scoped. Nothing is cached or persisted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of identifiers accepted by a batch method.
pub const MAX_BATCH_SIZE: usize = 1000;
/// Upper bound applied to every `limit` before it is forwarded.
pub const MAX_PAGE_LIMIT: u64 = 1000;
/// `limit` used when the caller supplies none.
pub const DEFAULT_PAGE_LIMIT: u64 = 100;
/// `page` used when the caller supplies none.
pub const DEFAULT_PAGE: u64 = 1;
/// JSON-RPC protocol version carried by every envelope.
pub const JSONRPC_VERSION: &str = "2.0";
/// Fixed envelope id. One gateway request maps to one upstream call.
pub const RPC_REQUEST_ID: &str = "das-gateway";

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET IDENTIFIERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Opaque on-chain asset identifier, relayed verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for AssetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for AssetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISPLAY OPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Named display flag understood by the DAS upstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DisplayFlag {
    ShowFungible,
    ShowInscription,
    ShowUnverifiedCollections,
    ShowCollectionMetadata,
    ShowNativeBalance,
    ShowZeroBalance,
    ShowGrandTotal,
}

impl DisplayFlag {
    pub const ALL: [DisplayFlag; 7] = [
        DisplayFlag::ShowFungible,
        DisplayFlag::ShowInscription,
        DisplayFlag::ShowUnverifiedCollections,
        DisplayFlag::ShowCollectionMetadata,
        DisplayFlag::ShowNativeBalance,
        DisplayFlag::ShowZeroBalance,
        DisplayFlag::ShowGrandTotal,
    ];

    /// Flags accepted on the single-asset and asset-batch endpoints.
    pub const ASSET_LOOKUP: [DisplayFlag; 4] = [
        DisplayFlag::ShowFungible,
        DisplayFlag::ShowInscription,
        DisplayFlag::ShowUnverifiedCollections,
        DisplayFlag::ShowCollectionMetadata,
    ];

    /// Wire name, shared by query parameters and JSON keys.
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayFlag::ShowFungible => "showFungible",
            DisplayFlag::ShowInscription => "showInscription",
            DisplayFlag::ShowUnverifiedCollections => "showUnverifiedCollections",
            DisplayFlag::ShowCollectionMetadata => "showCollectionMetadata",
            DisplayFlag::ShowNativeBalance => "showNativeBalance",
            DisplayFlag::ShowZeroBalance => "showZeroBalance",
            DisplayFlag::ShowGrandTotal => "showGrandTotal",
        }
    }
}

/// Display flags attached to a query.
///
/// An unset flag is `None` and is left out of the serialized object entirely.
/// The upstream treats an omitted flag differently from an explicit `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_fungible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_inscription: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_unverified_collections: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_collection_metadata: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_native_balance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_zero_balance: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_grand_total: Option<bool>,
}

impl DisplayOptions {
    fn slot(&mut self, flag: DisplayFlag) -> &mut Option<bool> {
        match flag {
            DisplayFlag::ShowFungible => &mut self.show_fungible,
            DisplayFlag::ShowInscription => &mut self.show_inscription,
            DisplayFlag::ShowUnverifiedCollections => &mut self.show_unverified_collections,
            DisplayFlag::ShowCollectionMetadata => &mut self.show_collection_metadata,
            DisplayFlag::ShowNativeBalance => &mut self.show_native_balance,
            DisplayFlag::ShowZeroBalance => &mut self.show_zero_balance,
            DisplayFlag::ShowGrandTotal => &mut self.show_grand_total,
        }
    }

    pub fn get(&self, flag: DisplayFlag) -> Option<bool> {
        match flag {
            DisplayFlag::ShowFungible => self.show_fungible,
            DisplayFlag::ShowInscription => self.show_inscription,
            DisplayFlag::ShowUnverifiedCollections => self.show_unverified_collections,
            DisplayFlag::ShowCollectionMetadata => self.show_collection_metadata,
            DisplayFlag::ShowNativeBalance => self.show_native_balance,
            DisplayFlag::ShowZeroBalance => self.show_zero_balance,
            DisplayFlag::ShowGrandTotal => self.show_grand_total,
        }
    }

    pub fn set(&mut self, flag: DisplayFlag, value: bool) {
        *self.slot(flag) = Some(value);
    }

    /// Builder form of [`DisplayOptions::set`].
    pub fn with(mut self, flag: DisplayFlag, value: bool) -> Self {
        self.set(flag, value);
        self
    }

    /// True when no flag is set.
    pub fn is_empty(&self) -> bool {
        DisplayFlag::ALL.iter().all(|flag| self.get(*flag).is_none())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PAGING & SORTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Page selection for listing methods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub page: u64,
    pub limit: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl PageSpec {
    /// `page` floors at 1.
    pub fn clamp_page(page: i64) -> u64 {
        page.max(1) as u64
    }

    /// `limit` is held inside `[1, MAX_PAGE_LIMIT]`.
    pub fn clamp_limit(limit: i64) -> u64 {
        limit.clamp(1, MAX_PAGE_LIMIT as i64) as u64
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_LIMIT,
            before: None,
            after: None,
        }
    }
}

/// Sort key for listing methods.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    #[default]
    Created,
    RecentAction,
    Updated,
    None,
}

impl SortBy {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(SortBy::Created),
            "recent_action" => Some(SortBy::RecentAction),
            "updated" => Some(SortBy::Updated),
            "none" => Some(SortBy::None),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Sort order. Defaults to `created`/`desc`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    #[serde(default)]
    pub sort_by: SortBy,
    #[serde(default)]
    pub sort_direction: SortDirection,
}

// ═══════════════════════════════════════════════════════════════════════════════
// RPC ENVELOPE
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON-RPC 2.0 request envelope sent to the upstream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub jsonrpc: String,
    pub id: String,
    pub method: String,
    pub params: Value,
}

impl RpcEnvelope {
    pub fn new(method: DasMethod, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: RPC_REQUEST_ID.to_string(),
            method: method.rpc_name().to_string(),
            params,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// METHOD CATALOGUE
// ═══════════════════════════════════════════════════════════════════════════════

/// HTTP verb a gateway endpoint is served on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpVerb {
    Get,
    Post,
}

/// DAS methods relayed by the gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DasMethod {
    GetAsset,
    GetAssetBatch,
    GetAssetProof,
    GetAssetProofBatch,
    GetAssetsByOwner,
    SearchAssets,
    GetAssetsByAuthority,
    GetAssetsByCreator,
    GetAssetsByGroup,
    GetSignaturesForAsset,
    GetTokenAccounts,
    GetNftEditions,
}

impl DasMethod {
    pub const ALL: [DasMethod; 12] = [
        DasMethod::GetAsset,
        DasMethod::GetAssetBatch,
        DasMethod::GetAssetProof,
        DasMethod::GetAssetProofBatch,
        DasMethod::GetAssetsByOwner,
        DasMethod::SearchAssets,
        DasMethod::GetAssetsByAuthority,
        DasMethod::GetAssetsByCreator,
        DasMethod::GetAssetsByGroup,
        DasMethod::GetSignaturesForAsset,
        DasMethod::GetTokenAccounts,
        DasMethod::GetNftEditions,
    ];

    /// Upstream JSON-RPC method name.
    pub fn rpc_name(self) -> &'static str {
        match self {
            DasMethod::GetAsset => "getAsset",
            DasMethod::GetAssetBatch => "getAssetBatch",
            DasMethod::GetAssetProof => "getAssetProof",
            DasMethod::GetAssetProofBatch => "getAssetProofBatch",
            DasMethod::GetAssetsByOwner => "getAssetsByOwner",
            DasMethod::SearchAssets => "searchAssets",
            DasMethod::GetAssetsByAuthority => "getAssetsByAuthority",
            DasMethod::GetAssetsByCreator => "getAssetsByCreator",
            DasMethod::GetAssetsByGroup => "getAssetsByGroup",
            DasMethod::GetSignaturesForAsset => "getSignaturesForAsset",
            DasMethod::GetTokenAccounts => "getTokenAccounts",
            DasMethod::GetNftEditions => "getNftEditions",
        }
    }

    /// Gateway endpoint name, mounted under `/das/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            DasMethod::GetAsset => "get-asset",
            DasMethod::GetAssetBatch => "get-asset-batch",
            DasMethod::GetAssetProof => "get-asset-proof",
            DasMethod::GetAssetProofBatch => "get-asset-proof-batch",
            DasMethod::GetAssetsByOwner => "get-assets-by-owner",
            DasMethod::SearchAssets => "search-assets",
            DasMethod::GetAssetsByAuthority => "get-assets-by-authority",
            DasMethod::GetAssetsByCreator => "get-assets-by-creator",
            DasMethod::GetAssetsByGroup => "get-assets-by-group",
            DasMethod::GetSignaturesForAsset => "get-signatures-for-asset",
            DasMethod::GetTokenAccounts => "get-token-accounts",
            DasMethod::GetNftEditions => "get-nft-editions",
        }
    }

    /// Full gateway path, e.g. `/das/get-asset`.
    pub fn path(self) -> String {
        format!("/das/{}", self.endpoint())
    }

    pub fn http_verb(self) -> HttpVerb {
        match self {
            DasMethod::GetAsset | DasMethod::GetAssetProof => HttpVerb::Get,
            _ => HttpVerb::Post,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DasMethod::GetAsset => "Get an asset by its ID",
            DasMethod::GetAssetBatch => "Get multiple assets by their IDs",
            DasMethod::GetAssetProof => "Get Merkle proof for a compressed asset",
            DasMethod::GetAssetProofBatch => "Get multiple asset proofs",
            DasMethod::GetAssetsByOwner => "Get assets owned by an address",
            DasMethod::SearchAssets => "Search for assets using various parameters",
            DasMethod::GetAssetsByAuthority => "Get assets with a specific authority",
            DasMethod::GetAssetsByCreator => "Get assets created by an address",
            DasMethod::GetAssetsByGroup => "Get assets by group key and value",
            DasMethod::GetSignaturesForAsset => {
                "Get transaction signatures for a compressed asset"
            }
            DasMethod::GetTokenAccounts => "Get token accounts for a mint or owner",
            DasMethod::GetNftEditions => "Get edition NFTs for a master NFT",
        }
    }
}

impl fmt::Display for DasMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rpc_name())
    }
}
