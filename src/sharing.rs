//! Share codes for gear lists.
//!
//! A share code is the base64 form of a JSON array of item ids, carried in
//! the `bis` query parameter of a page URL. Decoding is forgiving in one way
//! only: anything malformed yields `None` so a bad link simply loads nothing.
//! Hydrating the ids back into items goes through
//! `CatalogService::get_items_by_ids`.

use crate::catalog::ItemId;
use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose};
use serde_json::Value;
use url::Url;

pub const SHARE_PARAM: &str = "bis";

/// Encode ids (order preserved) as a share code.
pub fn encode_share_code(ids: &[ItemId]) -> String {
    let json = Value::Array(ids.iter().map(|id| Value::from(id.0)).collect()).to_string();
    general_purpose::STANDARD.encode(json)
}

/// Decode a share code; `None` unless it is base64 of a JSON array of ids.
pub fn decode_share_code(code: &str) -> Option<Vec<ItemId>> {
    let bytes = general_purpose::STANDARD.decode(code.trim()).ok()?;
    let values: Vec<Value> = serde_json::from_slice(&bytes).ok()?;
    values
        .iter()
        .map(|value| {
            value
                .as_u64()
                .and_then(|id| u32::try_from(id).ok())
                .map(ItemId)
        })
        .collect()
}

/// `base` with its `bis` parameter set to the share code for `ids`. Other
/// query parameters are kept.
pub fn share_url(base: &str, ids: &[ItemId]) -> Result<String> {
    let mut url = Url::parse(base).with_context(|| format!("parsing share base url {base}"))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (key, value) in &kept {
            pairs.append_pair(key, value);
        }
        pairs.append_pair(SHARE_PARAM, &encode_share_code(ids));
    }
    Ok(url.to_string())
}

/// Ids carried by a shared link, if it has a valid `bis` parameter.
pub fn ids_from_url(link: &str) -> Option<Vec<ItemId>> {
    let url = Url::parse(link).ok()?;
    let code = url
        .query_pairs()
        .find(|(key, _)| key == SHARE_PARAM)
        .map(|(_, value)| value.into_owned())?;
    decode_share_code(&code)
}

/// `link` without its `bis` parameter.
pub fn clear_share_param(link: &str) -> Result<String> {
    let mut url = Url::parse(link).with_context(|| format!("parsing shared url {link}"))?;
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != SHARE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    Ok(url.to_string())
}
