//! Upstream `params` assembly, one builder per DAS method.

use std::collections::HashMap;

use das_common::{DisplayFlag, DisplayOptions, PageSpec, SortSpec};
use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::validators::{
    self, display_options_from_object, display_options_from_query, listing_options,
    optional_string, require_asset_id, require_asset_ids, require_string, JsonObject,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetParams {
    id: String,
    display_options: DisplayOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetBatchParams {
    ids: Vec<String>,
    display_options: DisplayOptions,
}

#[derive(Debug, Serialize)]
struct ProofParams {
    id: String,
}

#[derive(Debug, Serialize)]
struct ProofBatchParams {
    ids: Vec<String>,
}

/// Paging, sorting and display options shared by the listing methods.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingParams {
    page: u64,
    limit: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort_by: Option<SortSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<DisplayOptions>,
}

impl ListingParams {
    /// Sorted listing: page, limit, `sortBy` with defaults, cursors, options.
    fn sorted(body: &JsonObject) -> Result<Self, GatewayError> {
        let PageSpec {
            page,
            limit,
            before,
            after,
        } = validators::page_spec(body)?;
        Ok(Self {
            page,
            limit,
            sort_by: Some(validators::sort_spec(body)?),
            before,
            after,
            options: listing_options(body)?,
        })
    }

    /// Page, limit and cursors only.
    fn paged(body: &JsonObject) -> Result<Self, GatewayError> {
        let PageSpec {
            page,
            limit,
            before,
            after,
        } = validators::page_spec(body)?;
        Ok(Self {
            page,
            limit,
            sort_by: None,
            before,
            after,
            options: None,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnerListingParams {
    owner_address: String,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthorityListingParams {
    authority_address: String,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatorListingParams {
    creator_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    only_verified: Option<bool>,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupListingParams {
    group_key: String,
    group_value: String,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
struct SignaturesParams {
    id: String,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
struct TokenAccountsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    mint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<String>,
    #[serde(flatten)]
    listing: ListingParams,
}

#[derive(Debug, Serialize)]
struct EditionsParams {
    mint: String,
    page: u64,
    limit: u64,
}

fn to_params<T: Serialize>(params: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(params).map_err(|e| GatewayError::Internal(e.to_string()))
}

/// `getAsset`: `{id, displayOptions}` from query parameters.
pub fn get_asset(query: &HashMap<String, String>) -> Result<Value, GatewayError> {
    to_params(&AssetParams {
        id: require_asset_id(query)?,
        display_options: display_options_from_query(query, &DisplayFlag::ASSET_LOOKUP),
    })
}

/// `getAssetBatch`: `{ids, displayOptions}`.
pub fn get_asset_batch(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&AssetBatchParams {
        ids: require_asset_ids(body, "assets")?,
        display_options: display_options_from_object(body, &DisplayFlag::ASSET_LOOKUP)?,
    })
}

/// `getAssetProof`: `{id}`.
pub fn get_asset_proof(query: &HashMap<String, String>) -> Result<Value, GatewayError> {
    to_params(&ProofParams {
        id: require_asset_id(query)?,
    })
}

/// `getAssetProofBatch`: `{ids}`.
pub fn get_asset_proof_batch(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&ProofBatchParams {
        ids: require_asset_ids(body, "proofs")?,
    })
}

/// `getAssetsByOwner`.
pub fn get_assets_by_owner(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&OwnerListingParams {
        owner_address: require_string(body, "ownerAddress")?,
        listing: ListingParams::sorted(body)?,
    })
}

/// `searchAssets`: the filter object passes through untouched apart from
/// `page` and `limit`.
pub fn search_assets(mut body: JsonObject) -> Result<Value, GatewayError> {
    if optional_string(&body, "tokenType")?.is_some()
        && optional_string(&body, "ownerAddress")?.is_none()
    {
        return Err(GatewayError::invalid(
            "Owner address is required when using tokenType filter",
        ));
    }

    let page = validators::page(&body)?;
    let limit = validators::limit(&body)?;
    body.insert("page".to_string(), Value::from(page));
    body.insert("limit".to_string(), Value::from(limit));
    Ok(Value::Object(body))
}

/// `getAssetsByAuthority`.
pub fn get_assets_by_authority(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&AuthorityListingParams {
        authority_address: require_string(body, "authorityAddress")?,
        listing: ListingParams::sorted(body)?,
    })
}

/// `getAssetsByCreator`.
pub fn get_assets_by_creator(body: &JsonObject) -> Result<Value, GatewayError> {
    let only_verified = match body.get("onlyVerified") {
        Some(raw) => validators::coerce_flag("onlyVerified", raw)?,
        None => None,
    };
    to_params(&CreatorListingParams {
        creator_address: require_string(body, "creatorAddress")?,
        only_verified,
        listing: ListingParams::sorted(body)?,
    })
}

/// `getAssetsByGroup`.
pub fn get_assets_by_group(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&GroupListingParams {
        group_key: require_string(body, "groupKey")?,
        group_value: require_string(body, "groupValue")?,
        listing: ListingParams::sorted(body)?,
    })
}

/// `getSignaturesForAsset`.
pub fn get_signatures_for_asset(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&SignaturesParams {
        id: require_string(body, "id")?,
        listing: ListingParams::paged(body)?,
    })
}

/// `getTokenAccounts`: needs a mint, an owner, or both.
pub fn get_token_accounts(body: &JsonObject) -> Result<Value, GatewayError> {
    let mint = optional_string(body, "mint")?;
    let owner = optional_string(body, "owner")?;
    if mint.is_none() && owner.is_none() {
        return Err(GatewayError::invalid(
            "Either 'mint' or 'owner' is required",
        ));
    }

    let mut listing = ListingParams::paged(body)?;
    listing.options = listing_options(body)?;
    to_params(&TokenAccountsParams {
        mint,
        owner,
        cursor: optional_string(body, "cursor")?,
        listing,
    })
}

/// `getNftEditions`.
pub fn get_nft_editions(body: &JsonObject) -> Result<Value, GatewayError> {
    to_params(&EditionsParams {
        mint: require_string(body, "mint")?,
        page: validators::page(body)?,
        limit: validators::limit(body)?,
    })
}
