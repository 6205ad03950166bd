//! JSON Schema gate for item datasets.
//!
//! Loaders validate the raw JSON against `schema/items.schema.json` before
//! deserializing, so a malformed dataset is reported with every offending
//! path instead of the first serde error. The schema ships embedded in the
//! binary; `BIS_ITEM_SCHEMA` points at an alternative copy on disk.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const EMBEDDED_ITEM_SCHEMA: &str = include_str!("../schema/items.schema.json");

// Keep failure messages readable when a whole dataset is off.
const MAX_REPORTED_ERRORS: usize = 20;

/// Compiled item dataset schema.
pub struct ItemSchema {
    compiled: JSONSchema,
}

impl std::fmt::Debug for ItemSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemSchema").finish_non_exhaustive()
    }
}

impl ItemSchema {
    /// The schema compiled into the crate.
    pub fn embedded() -> Result<Self> {
        let value: Value =
            serde_json::from_str(EMBEDDED_ITEM_SCHEMA).context("parsing embedded item schema")?;
        Self::compile(&value)
    }

    /// Load a schema from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening item schema {}", path.display()))?;
        let value: Value = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parsing item schema {}", path.display()))?;
        Self::compile(&value).with_context(|| format!("compiling item schema {}", path.display()))
    }

    /// Honor `BIS_ITEM_SCHEMA` when set, otherwise use the embedded schema.
    pub fn from_env() -> Result<Self> {
        match env::var("BIS_ITEM_SCHEMA") {
            Ok(path) if !path.trim().is_empty() => Self::load(Path::new(path.trim())),
            _ => Self::embedded(),
        }
    }

    fn compile(value: &Value) -> Result<Self> {
        let compiled =
            JSONSchema::compile(value).map_err(|err| anyhow!("invalid item schema: {err}"))?;
        Ok(Self { compiled })
    }

    /// Validate a parsed dataset, listing offending paths on failure.
    pub fn validate(&self, dataset: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(dataset) {
            let details = errors
                .take(MAX_REPORTED_ERRORS)
                .map(|err| format!("{}: {}", err.instance_path, err))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("item dataset failed schema validation:\n{details}");
        }
        Ok(())
    }
}
