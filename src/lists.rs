//! Named gear lists kept in a key-value store.
//!
//! All lists live as one JSON object (id → list) under [`LISTS_KEY`]; the id
//! of the list being edited lives under [`ACTIVE_LIST_KEY`]. The store behind
//! them only needs get/set/remove by key and last-write-wins semantics, so a
//! browser's local storage, a file, or [`MemoryStore`] all work.

use crate::catalog::Item;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use uuid::Uuid;

pub const LISTS_KEY: &str = "bis-lists";
pub const ACTIVE_LIST_KEY: &str = "bis-active-list";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GearList {
    pub id: String,
    pub name: String,
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GearListSummary {
    pub id: String,
    pub name: String,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields to change on an existing list; `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct ListUpdate {
    pub name: Option<String>,
    pub items: Option<Vec<Item>>,
}

pub struct GearListStore<S> {
    store: S,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> GearListStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Utc::now,
        }
    }

    /// Replace the timestamp source (tests pin time with this).
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Store a new list and return its generated id.
    pub fn save_list(&mut self, name: &str, items: Vec<Item>) -> Result<String> {
        let mut lists = self.read_all();
        let id = Uuid::new_v4().to_string();
        let now = (self.clock)();
        lists.insert(
            id.clone(),
            GearList {
                id: id.clone(),
                name: name.to_string(),
                items,
                created_at: now,
                updated_at: now,
            },
        );
        self.write_all(&lists)?;
        Ok(id)
    }

    /// Create an empty list and make it the active one.
    pub fn create_list(&mut self, name: &str) -> Result<String> {
        let id = self.save_list(name, Vec::new())?;
        self.set_active(&id);
        Ok(id)
    }

    /// Apply `update`; `false` when no list has this id.
    pub fn update_list(&mut self, id: &str, update: ListUpdate) -> Result<bool> {
        let mut lists = self.read_all();
        let Some(list) = lists.get_mut(id) else {
            return Ok(false);
        };
        if let Some(name) = update.name {
            list.name = name;
        }
        if let Some(items) = update.items {
            list.items = items;
        }
        list.updated_at = (self.clock)();
        self.write_all(&lists)?;
        Ok(true)
    }

    pub fn get_list(&self, id: &str) -> Option<GearList> {
        self.read_all().remove(id)
    }

    /// Delete a list, clearing the active pointer if it pointed here.
    pub fn delete_list(&mut self, id: &str) -> Result<bool> {
        let mut lists = self.read_all();
        if lists.remove(id).is_none() {
            return Ok(false);
        }
        if self.active_list_id().as_deref() == Some(id) {
            self.clear_active();
        }
        self.write_all(&lists)?;
        Ok(true)
    }

    /// Save `items` into the active list, if there is one.
    pub fn autosave_active(&mut self, items: Vec<Item>) -> Result<bool> {
        match self.active_list_id() {
            Some(id) => self.update_list(
                &id,
                ListUpdate {
                    name: None,
                    items: Some(items),
                },
            ),
            None => Ok(false),
        }
    }

    pub fn active_list_id(&self) -> Option<String> {
        self.store.get(ACTIVE_LIST_KEY)
    }

    pub fn set_active(&mut self, id: &str) {
        self.store.set(ACTIVE_LIST_KEY, id.to_string());
    }

    pub fn clear_active(&mut self) {
        self.store.remove(ACTIVE_LIST_KEY);
    }

    pub fn active_list(&self) -> Option<GearList> {
        self.active_list_id().and_then(|id| self.get_list(&id))
    }

    /// Make `id` active and return it; unknown ids change nothing.
    pub fn switch_to(&mut self, id: &str) -> Option<GearList> {
        let list = self.get_list(id)?;
        self.set_active(id);
        Some(list)
    }

    /// All lists, most recently updated first.
    pub fn summaries(&self) -> Vec<GearListSummary> {
        let mut summaries: Vec<GearListSummary> = self
            .read_all()
            .into_values()
            .map(|list| GearListSummary {
                item_count: list.items.len(),
                id: list.id,
                name: list.name,
                created_at: list.created_at,
                updated_at: list.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        summaries
    }

    /// Drop every stored list. The active pointer is left as is.
    pub fn clear_all(&mut self) {
        self.store.remove(LISTS_KEY);
    }

    fn read_all(&self) -> BTreeMap<String, GearList> {
        let Some(raw) = self.store.get(LISTS_KEY) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(lists) => lists,
            Err(err) => {
                warn!(error = %err, "stored gear lists are unreadable; treating as empty");
                BTreeMap::new()
            }
        }
    }

    fn write_all(&mut self, lists: &BTreeMap<String, GearList>) -> Result<()> {
        let raw = serde_json::to_string(lists).context("serializing gear lists")?;
        self.store.set(LISTS_KEY, raw);
        Ok(())
    }
}
