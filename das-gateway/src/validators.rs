//! Request validators.
//!
//! Pure functions over the decoded request. Identifier-count violations are
//! rejected; out-of-range `page`/`limit` values are clamped.

use std::collections::HashMap;

use das_common::{
    DisplayFlag, DisplayOptions, PageSpec, SortBy, SortDirection, SortSpec, DEFAULT_PAGE,
    DEFAULT_PAGE_LIMIT, MAX_BATCH_SIZE,
};
use serde_json::{Map, Value};

use crate::error::GatewayError;

pub type JsonObject = Map<String, Value>;

/// Decode a request body that must be a JSON object.
///
/// Unparseable bytes are a server-side failure; well-formed JSON of the wrong
/// shape is a caller error.
pub fn parse_object(body: &[u8]) -> Result<JsonObject, GatewayError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| GatewayError::MalformedBody(e.to_string()))?;
    match value {
        Value::Object(object) => Ok(object),
        _ => Err(GatewayError::invalid("Request body must be a JSON object")),
    }
}

/// `assetId` query parameter of the single-asset endpoints.
pub fn require_asset_id(query: &HashMap<String, String>) -> Result<String, GatewayError> {
    query
        .get("assetId")
        .filter(|id| !id.is_empty())
        .cloned()
        .ok_or_else(|| GatewayError::invalid("Missing 'assetId' parameter"))
}

/// Non-empty `assetIds` list of at most [`MAX_BATCH_SIZE`] strings, kept in
/// order with duplicates. `noun` names the batched item in the ceiling message.
pub fn require_asset_ids(body: &JsonObject, noun: &str) -> Result<Vec<String>, GatewayError> {
    let invalid = || GatewayError::invalid("Missing or invalid 'assetIds' in request body");

    let items = match body.get("assetIds") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => return Err(invalid()),
    };

    if items.len() > MAX_BATCH_SIZE {
        return Err(GatewayError::invalid(format!(
            "Cannot request more than {} {} at once",
            MAX_BATCH_SIZE, noun
        )));
    }

    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Required non-empty string field.
pub fn require_string(body: &JsonObject, field: &str) -> Result<String, GatewayError> {
    optional_string(body, field)?
        .ok_or_else(|| GatewayError::invalid(format!("Missing required '{}' parameter", field)))
}

/// Optional string field; absent, `null` and `""` all read as unset.
pub fn optional_string(body: &JsonObject, field: &str) -> Result<Option<String>, GatewayError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(GatewayError::invalid(format!("'{}' must be a string", field))),
    }
}

/// Coerce a query-string flag. Only the literal `"true"` is truthy; an empty
/// or absent parameter leaves the flag unset.
pub fn flag_from_query(raw: Option<&String>) -> Option<bool> {
    match raw {
        Some(value) if !value.is_empty() => Some(value == "true"),
        _ => None,
    }
}

/// Coerce a JSON flag value. Booleans pass through, strings follow the
/// query-string rule, `null` leaves the flag unset.
pub fn coerce_flag(name: &str, value: &Value) -> Result<Option<bool>, GatewayError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s == "true")),
        _ => Err(GatewayError::invalid(format!("'{}' must be a boolean", name))),
    }
}

/// Display options from query parameters.
pub fn display_options_from_query(
    query: &HashMap<String, String>,
    flags: &[DisplayFlag],
) -> DisplayOptions {
    let mut options = DisplayOptions::default();
    for flag in flags {
        if let Some(value) = flag_from_query(query.get(flag.as_str())) {
            options.set(*flag, value);
        }
    }
    options
}

/// Display options read from the keys of a JSON object.
pub fn display_options_from_object(
    object: &JsonObject,
    flags: &[DisplayFlag],
) -> Result<DisplayOptions, GatewayError> {
    let mut options = DisplayOptions::default();
    for flag in flags {
        if let Some(raw) = object.get(flag.as_str()) {
            if let Some(value) = coerce_flag(flag.as_str(), raw)? {
                options.set(*flag, value);
            }
        }
    }
    Ok(options)
}

/// The `options` member of a listing request. An absent or empty object is
/// not forwarded at all.
pub fn listing_options(body: &JsonObject) -> Result<Option<DisplayOptions>, GatewayError> {
    match body.get("options") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(object)) if object.is_empty() => Ok(None),
        Some(Value::Object(object)) => {
            display_options_from_object(object, &DisplayFlag::ALL).map(Some)
        }
        Some(_) => Err(GatewayError::invalid("'options' must be an object")),
    }
}

/// Integer field given as a JSON number or a decimal string.
pub fn coerce_int(body: &JsonObject, field: &str) -> Result<Option<i64>, GatewayError> {
    let not_a_number = || GatewayError::invalid(format!("'{}' must be a number", field));
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Some)
            .ok_or_else(not_a_number),
        Some(Value::String(s)) => s.trim().parse::<i64>().map(Some).map_err(|_| not_a_number()),
        Some(_) => Err(not_a_number()),
    }
}

/// `page`, defaulting to 1 and floored at 1.
pub fn page(body: &JsonObject) -> Result<u64, GatewayError> {
    Ok(coerce_int(body, "page")?
        .map(PageSpec::clamp_page)
        .unwrap_or(DEFAULT_PAGE))
}

/// `limit`, defaulting to 100 and clamped into `[1, 1000]`.
pub fn limit(body: &JsonObject) -> Result<u64, GatewayError> {
    Ok(coerce_int(body, "limit")?
        .map(PageSpec::clamp_limit)
        .unwrap_or(DEFAULT_PAGE_LIMIT))
}

/// Page, limit and the `before`/`after` cursors.
pub fn page_spec(body: &JsonObject) -> Result<PageSpec, GatewayError> {
    Ok(PageSpec {
        page: page(body)?,
        limit: limit(body)?,
        before: optional_string(body, "before")?,
        after: optional_string(body, "after")?,
    })
}

/// `sortBy` object; missing members fall back to `created`/`desc`.
pub fn sort_spec(body: &JsonObject) -> Result<SortSpec, GatewayError> {
    let object = match body.get("sortBy") {
        None | Some(Value::Null) => return Ok(SortSpec::default()),
        Some(Value::Object(object)) => object,
        Some(_) => return Err(GatewayError::invalid("'sortBy' must be an object")),
    };

    let sort_by = match optional_string(object, "sortBy")? {
        None => SortBy::default(),
        Some(raw) => SortBy::parse(&raw).ok_or_else(|| {
            GatewayError::invalid(format!(
                "Invalid sortBy '{}': expected created, recent_action, updated or none",
                raw
            ))
        })?,
    };

    let sort_direction = match optional_string(object, "sortDirection")? {
        None => SortDirection::default(),
        Some(raw) => SortDirection::parse(&raw).ok_or_else(|| {
            GatewayError::invalid(format!(
                "Invalid sortDirection '{}': expected asc or desc",
                raw
            ))
        })?,
    };

    Ok(SortSpec {
        sort_by,
        sort_direction,
    })
}
