//! Core library for the leveling best-in-slot tracker.
//!
//! The crate loads the static item catalog, answers search and lookup
//! queries against it, picks the best item per equipment slot for a
//! character level, and keeps named gear lists with shareable codes. HTTP
//! handlers and the `bis-items` CLI are thin callers of [`CatalogService`].

use anyhow::{Result, bail};

pub mod catalog;
pub mod config;
pub mod error;
pub mod lists;
pub mod query;
pub mod schema;
pub mod selector;
pub mod service;
pub mod sharing;

pub use catalog::{
    CatalogSnapshot, CatalogSource, FileSource, Item, ItemId, ItemSource, ItemSummary, Quality,
    Slot, StaticSource, TooltipLine,
};
pub use config::{ServiceConfig, resolve_items_path};
pub use error::{CatalogError, CatalogResult};
pub use lists::{GearList, GearListStore, GearListSummary, KeyValueStore, ListUpdate, MemoryStore};
pub use query::{
    ItemsMetadata, LevelRange, PaginatedResult, QuickSearchParams, QuickSearchResult, SearchParams,
};
pub use selector::{SlotGroups, UpgradeStep, best_items_at_level, group_by_slot, level_timeline};
pub use service::CatalogService;
pub use sharing::{decode_share_code, encode_share_code, ids_from_url, share_url};

/// Split comma- or whitespace-delimited lists into tokens.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .replace(',', " ")
        .split_whitespace()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse a comma/whitespace separated list of item ids.
///
/// Unlike search parameters, every token must be a valid id: this feeds
/// explicit lookups where silently skipping a typo would hide it.
pub fn parse_item_ids(value: &str) -> Result<Vec<ItemId>> {
    let mut ids = Vec::new();
    for token in split_list(value) {
        match token.parse::<u32>() {
            Ok(id) => ids.push(ItemId(id)),
            Err(_) => bail!("invalid item id '{token}'"),
        }
    }
    Ok(ids)
}
