//! Deserializable representation of `public/items.json`.
//!
//! The types mirror the item dataset so the query engine and tests can reason
//! about item fields without ad-hoc JSON handling. Use `CatalogSnapshot` for
//! indexed access; these structs are the values callers receive.

use crate::catalog::identity::{ItemId, Quality, Slot};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One equippable item from the static catalog.
pub struct Item {
    pub item_id: ItemId,
    pub name: String,
    #[serde(default)]
    pub unique_name: String,
    #[serde(default)]
    pub icon: String,
    pub class: String,
    pub subclass: String,
    #[serde(default)]
    pub sell_price: u64,
    pub quality: Quality,
    pub item_level: u32,
    pub required_level: u32,
    pub slot: Slot,
    #[serde(default)]
    pub tooltip: Vec<TooltipLine>,
    #[serde(default)]
    pub item_link: String,
    #[serde(default = "default_content_phase")]
    pub content_phase: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ItemSource>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A single rendered tooltip line; opaque to the query engine.
pub struct TooltipLine {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Where an item comes from.
pub struct ItemSource {
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_chance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Trimmed item view returned by quick search (no tooltip or provenance).
pub struct ItemSummary {
    pub item_id: ItemId,
    pub name: String,
    pub icon: String,
    pub slot: Slot,
    pub class: String,
    pub subclass: String,
    pub quality: Quality,
    pub item_level: u32,
    pub required_level: u32,
    pub content_phase: u32,
}

fn default_content_phase() -> u32 {
    1
}

impl Item {
    /// Create the compact summary used by quick search.
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            item_id: self.item_id,
            name: self.name.clone(),
            icon: self.icon.clone(),
            slot: self.slot.clone(),
            class: self.class.clone(),
            subclass: self.subclass.clone(),
            quality: self.quality.clone(),
            item_level: self.item_level,
            required_level: self.required_level,
            content_phase: self.content_phase,
        }
    }

    /// Fill derived fields the dataset may omit.
    pub(crate) fn normalize(mut self) -> Self {
        if self.unique_name.is_empty() {
            self.unique_name = self.name.to_lowercase();
        }
        self
    }
}
