//! Immutable request objects.
//!
//! Each request is assembled once through its builder methods and then only
//! read. It owns its encoding to the gateway wire format: query pairs for the
//! GET endpoints, a JSON body for the rest.

use das_common::{AssetId, DisplayFlag, DisplayOptions, SortSpec};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;

/// Query pairs for a display-flag set. Unset flags are left out.
fn flag_pairs(options: &DisplayOptions) -> Vec<(&'static str, String)> {
    DisplayFlag::ASSET_LOOKUP
        .into_iter()
        .filter_map(|flag| options.get(flag).map(|value| (flag.as_str(), value.to_string())))
        .collect()
}

/// Asset lookups only read [`DisplayFlag::ASSET_LOOKUP`].
fn lookup_flag(flag: DisplayFlag) -> Result<DisplayFlag, ClientError> {
    if DisplayFlag::ASSET_LOOKUP.contains(&flag) {
        Ok(flag)
    } else {
        Err(ClientError::invalid(format!(
            "'{}' does not apply to asset lookups",
            flag.as_str()
        )))
    }
}

fn to_body<T: Serialize>(request: &T) -> Result<Value, ClientError> {
    Ok(serde_json::to_value(request)?)
}

/// `GET /das/get-asset`.
#[derive(Clone, Debug, PartialEq)]
pub struct GetAssetRequest {
    asset_id: AssetId,
    display: DisplayOptions,
}

impl GetAssetRequest {
    pub fn new(asset_id: impl Into<AssetId>) -> Self {
        Self {
            asset_id: asset_id.into(),
            display: DisplayOptions::default(),
        }
    }

    pub fn with_flag(mut self, flag: DisplayFlag, value: bool) -> Result<Self, ClientError> {
        self.display.set(lookup_flag(flag)?, value);
        Ok(self)
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("assetId", self.asset_id.to_string())];
        pairs.extend(flag_pairs(&self.display));
        pairs
    }
}

/// `POST /das/get-asset-batch`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetBatchRequest {
    asset_ids: Vec<AssetId>,
    #[serde(flatten)]
    display: DisplayOptions,
}

impl AssetBatchRequest {
    pub fn new(asset_ids: impl IntoIterator<Item = impl Into<AssetId>>) -> Self {
        Self {
            asset_ids: asset_ids.into_iter().map(Into::into).collect(),
            display: DisplayOptions::default(),
        }
    }

    pub fn with_flag(mut self, flag: DisplayFlag, value: bool) -> Result<Self, ClientError> {
        self.display.set(lookup_flag(flag)?, value);
        Ok(self)
    }

    pub fn asset_ids(&self) -> &[AssetId] {
        &self.asset_ids
    }

    pub fn body(&self) -> Result<Value, ClientError> {
        to_body(self)
    }
}

/// `GET /das/get-asset-proof`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetProofRequest {
    asset_id: AssetId,
}

impl AssetProofRequest {
    pub fn new(asset_id: impl Into<AssetId>) -> Self {
        Self {
            asset_id: asset_id.into(),
        }
    }

    pub fn asset_id(&self) -> &AssetId {
        &self.asset_id
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![("assetId", self.asset_id.to_string())]
    }
}

/// `POST /das/get-asset-proof-batch`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofBatchRequest {
    asset_ids: Vec<AssetId>,
}

impl ProofBatchRequest {
    pub fn new(asset_ids: impl IntoIterator<Item = impl Into<AssetId>>) -> Self {
        Self {
            asset_ids: asset_ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn asset_ids(&self) -> &[AssetId] {
        &self.asset_ids
    }

    pub fn body(&self) -> Result<Value, ClientError> {
        to_body(self)
    }
}

/// `POST /das/get-assets-by-owner`. Unset paging fields are left to the
/// gateway defaults.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsByOwnerRequest {
    owner_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(skip_serializing_if = "DisplayOptions::is_empty")]
    options: DisplayOptions,
}

impl AssetsByOwnerRequest {
    pub fn new(owner_address: impl Into<String>) -> Self {
        Self {
            owner_address: owner_address.into(),
            page: None,
            limit: None,
            sort_by: None,
            before: None,
            after: None,
            options: DisplayOptions::default(),
        }
    }

    pub fn with_page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort_by = Some(sort);
        self
    }

    pub fn with_before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn with_after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn with_option(mut self, flag: DisplayFlag, value: bool) -> Self {
        self.options.set(flag, value);
        self
    }

    pub fn body(&self) -> Result<Value, ClientError> {
        to_body(self)
    }
}

/// `POST /das/search-assets`. The filter set is open-ended and sent as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchAssetsRequest {
    filters: Map<String, Value>,
}

impl SearchAssetsRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_filters(filters: Map<String, Value>) -> Self {
        Self { filters }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn with_page(self, page: u64) -> Self {
        self.with("page", page)
    }

    pub fn with_limit(self, limit: u64) -> Self {
        self.with("limit", limit)
    }

    pub fn body(&self) -> Value {
        Value::Object(self.filters.clone())
    }
}
