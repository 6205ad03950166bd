//! Best-in-slot selection while leveling.
//!
//! Items a player has collected are grouped by canonical slot (two-handers go
//! to Main Hand; one-handers and held-in-off-hand items go to Off Hand), then
//! for a character level we pick, per slot, the item with the highest required
//! level the character can equip. Selection is a pure function of the groups
//! and the level.

use crate::catalog::{Item, ItemId, Slot};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Items keyed by canonical slot, each list ordered by required level.
pub type SlotGroups = BTreeMap<Slot, Vec<Item>>;

/// Group items under their canonical slot.
///
/// Within a slot, items are stable-sorted by required level so equal levels
/// keep the order they were supplied in.
pub fn group_by_slot<'a, I>(items: I) -> SlotGroups
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut groups: SlotGroups = BTreeMap::new();
    for item in items {
        groups
            .entry(item.slot.canonical())
            .or_default()
            .push(item.clone());
    }
    for slot_items in groups.values_mut() {
        slot_items.sort_by_key(|item| item.required_level);
    }
    groups
}

fn best_in_slot(items: &[Item], level: u32) -> Option<&Item> {
    let mut best: Option<&Item> = None;
    for item in items.iter().filter(|item| item.required_level <= level) {
        match best {
            Some(current) if item.required_level <= current.required_level => {}
            _ => best = Some(item),
        }
    }
    best
}

/// Best equippable item per slot at `level`.
///
/// Slots with nothing equippable are left out. Among items sharing the
/// highest eligible required level the first one in the group wins.
pub fn best_items_at_level(groups: &SlotGroups, level: u32) -> BTreeMap<Slot, Item> {
    groups
        .iter()
        .filter_map(|(slot, items)| {
            best_in_slot(items, level).map(|item| (slot.clone(), item.clone()))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// The level at which a slot's best item changes, and the item it changes to.
pub struct UpgradeStep {
    pub level: u32,
    pub item_id: ItemId,
}

/// Upgrade path per slot: every level where the best item changes.
pub fn level_timeline(groups: &SlotGroups) -> BTreeMap<Slot, Vec<UpgradeStep>> {
    groups
        .iter()
        .map(|(slot, items)| {
            let levels: BTreeSet<u32> = items.iter().map(|item| item.required_level).collect();
            let mut steps: Vec<UpgradeStep> = Vec::new();
            for level in levels {
                let Some(best) = best_in_slot(items, level) else {
                    continue;
                };
                if steps.last().map(|step| step.item_id) != Some(best.item_id) {
                    steps.push(UpgradeStep {
                        level,
                        item_id: best.item_id,
                    });
                }
            }
            (slot.clone(), steps)
        })
        .collect()
}
