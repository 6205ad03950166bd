//! Runtime configuration for the catalog service.
//!
//! Everything is environment driven so the CLI and embedding servers resolve
//! the dataset the same way:
//! - `BIS_ITEMS_PATH` names the dataset file directly.
//! - `BIS_ROOT` names a project root holding `public/items.json`.
//! - otherwise the crate's own checkout, recorded by `build.rs` as
//!   `BIS_ROOT_HINT`, is tried.
//! - `BIS_CACHE_TTL_SECS` overrides the five minute snapshot TTL.

use anyhow::{Context, Result, bail};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Dataset location relative to the project root.
pub const ITEMS_RELATIVE_PATH: &str = "public/items.json";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub items_path: PathBuf,
    pub cache_ttl: Duration,
}

impl ServiceConfig {
    pub fn new(items_path: impl Into<PathBuf>) -> Self {
        Self {
            items_path: items_path.into(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Resolve the dataset path and TTL from the environment.
    pub fn from_env() -> Result<Self> {
        let items_path = resolve_items_path()?;
        let cache_ttl = match env::var("BIS_CACHE_TTL_SECS") {
            Ok(raw) => parse_ttl_secs(&raw)?,
            Err(_) => DEFAULT_CACHE_TTL,
        };
        Ok(Self {
            items_path,
            cache_ttl,
        })
    }
}

fn parse_ttl_secs(raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("BIS_CACHE_TTL_SECS must be a whole number of seconds, got {raw:?}"))?;
    Ok(Duration::from_secs(secs))
}

/// `<root>/public/items.json` when that file exists.
fn dataset_under(root: &str) -> Option<PathBuf> {
    let root = root.trim();
    if root.is_empty() {
        return None;
    }
    let candidate = Path::new(root).join(ITEMS_RELATIVE_PATH);
    candidate.is_file().then_some(candidate)
}

/// Locate the item dataset: `BIS_ITEMS_PATH` as given, then
/// `$BIS_ROOT/public/items.json`, then the build-time checkout.
pub fn resolve_items_path() -> Result<PathBuf> {
    match env::var("BIS_ITEMS_PATH") {
        Ok(path) if !path.trim().is_empty() => return Ok(PathBuf::from(path.trim())),
        _ => {}
    }

    let from_root = env::var("BIS_ROOT").ok().and_then(|root| dataset_under(&root));
    let from_hint = || option_env!("BIS_ROOT_HINT").and_then(dataset_under);
    match from_root.or_else(from_hint) {
        Some(path) => Ok(path),
        None => bail!(
            "Unable to locate {ITEMS_RELATIVE_PATH}. Set BIS_ITEMS_PATH to the dataset or BIS_ROOT to the project root."
        ),
    }
}
