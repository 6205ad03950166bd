//! Where item datasets come from.
//!
//! `CatalogSource` is the seam between the caching service and storage: the
//! service only asks for a fresh `Vec<Item>` and never sees files. Tests and
//! embedders hand in a `StaticSource`; deployments read `public/items.json`
//! through `FileSource`.

use crate::catalog::model::Item;
use crate::schema::ItemSchema;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Produces a complete item dataset on demand.
pub trait CatalogSource: Send + Sync {
    /// Read the whole dataset. Any error means the dataset is unavailable.
    fn load(&self) -> Result<Vec<Item>>;

    /// Short label for log lines (file path, "static", ...).
    fn describe(&self) -> String;
}

impl<T: CatalogSource + ?Sized> CatalogSource for Arc<T> {
    fn load(&self) -> Result<Vec<Item>> {
        (**self).load()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// JSON array of items on disk, validated against the item schema.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    schema: ItemSchema,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self::with_schema(path, ItemSchema::from_env()?))
    }

    pub fn with_schema(path: impl Into<PathBuf>, schema: ItemSchema) -> Self {
        Self {
            path: path.into(),
            schema,
        }
    }
}

impl CatalogSource for FileSource {
    fn load(&self) -> Result<Vec<Item>> {
        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("reading item dataset {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&data)
            .with_context(|| format!("parsing item dataset {}", self.path.display()))?;
        self.schema
            .validate(&value)
            .with_context(|| format!("validating item dataset {}", self.path.display()))?;
        let items: Vec<Item> = serde_json::from_value(value)
            .with_context(|| format!("decoding items from {}", self.path.display()))?;
        Ok(items.into_iter().map(Item::normalize).collect())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory dataset. `replace` swaps the items the next load returns, which
/// lets callers simulate a dataset update without touching disk.
#[derive(Debug, Default)]
pub struct StaticSource {
    items: Mutex<Option<Vec<Item>>>,
}

impl StaticSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(Some(items)),
        }
    }

    /// A source whose every load fails.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn replace(&self, items: Option<Vec<Item>>) {
        *self.items.lock().unwrap_or_else(|err| err.into_inner()) = items;
    }
}

impl CatalogSource for StaticSource {
    fn load(&self) -> Result<Vec<Item>> {
        let guard = self.items.lock().unwrap_or_else(|err| err.into_inner());
        let items = guard
            .as_ref()
            .context("static item dataset is not available")?;
        Ok(items.iter().cloned().map(Item::normalize).collect())
    }

    fn describe(&self) -> String {
        "static".to_string()
    }
}
