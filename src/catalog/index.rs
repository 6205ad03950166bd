//! Indexed, immutable view of one loaded item catalog.
//!
//! A snapshot owns the items in dataset order, an id index for O(1) lookup,
//! and the precomputed ranking every search walks. Snapshots are never
//! mutated after construction; the service swaps whole snapshots on reload.

use crate::catalog::identity::ItemId;
use crate::catalog::model::Item;
use feruca::{Collator, Locale, Tailoring};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug)]
/// Item catalog plus derived lookup and ranking tables.
pub struct CatalogSnapshot {
    items: Vec<Item>,
    by_id: HashMap<ItemId, usize>,
    ranked: Vec<usize>,
}

impl CatalogSnapshot {
    /// Build the index and ranking for `items`.
    ///
    /// Duplicate ids are not rejected: the id index keeps the last occurrence
    /// while the ranking still lists every record.
    pub fn new(items: Vec<Item>) -> Self {
        let mut by_id = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            by_id.insert(item.item_id, pos);
        }
        let duplicates = items.len() - by_id.len();
        if duplicates > 0 {
            debug!(duplicates, "item catalog contains repeated item ids");
        }

        let mut ranked: Vec<usize> = (0..items.len()).collect();
        let mut collator = name_collator();
        ranked.sort_by(|&a, &b| compare_rank(&mut collator, &items[a], &items[b]));

        Self {
            items,
            by_id,
            ranked,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in dataset order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Resolve an item by id.
    ///
    /// Returns `None` instead of erroring; callers decide whether absence is a
    /// not-found response or a silently dropped batch entry.
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.by_id.get(&id).map(|&pos| &self.items[pos])
    }

    /// Items in search order (see [`compare_rank`]).
    pub fn ranked(&self) -> impl Iterator<Item = &Item> + '_ {
        self.ranked.iter().map(|&pos| &self.items[pos])
    }
}

/// Collator for item names: CLDR root order with punctuation kept
/// significant, which is what a browser's `localeCompare` does with no locale.
pub fn name_collator() -> Collator {
    Collator::new(Tailoring::Cldr(Locale::Root), false, true)
}

/// Total order used for search results: item level descending, then name by
/// collation, then id so rows with identical names still have a fixed order.
pub fn compare_rank(collator: &mut Collator, a: &Item, b: &Item) -> Ordering {
    b.item_level
        .cmp(&a.item_level)
        .then_with(|| collator.collate(a.name.as_str(), b.name.as_str()))
        .then_with(|| a.item_id.cmp(&b.item_id))
}
