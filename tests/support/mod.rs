#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use bisgear::{CatalogService, FileSource};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;

/// Path of the `bis-items` binary cargo built for this test run.
pub fn bis_items_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_bis-items"))
}

/// `bis-items` reading `items` with environment overrides cleared.
pub fn bis_items(items: &Path) -> Command {
    let mut cmd = Command::new(bis_items_binary());
    cmd.arg("--items")
        .arg(items)
        .env_remove("BIS_ITEMS_PATH")
        .env_remove("BIS_ITEM_SCHEMA")
        .env_remove("BIS_CACHE_TTL_SECS")
        .env("RUST_LOG", "off");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run `cmd` and parse its stdout as JSON.
pub fn run_json(cmd: Command) -> Result<Value> {
    let output = run_command(cmd)?;
    serde_json::from_slice(&output.stdout).context("parsing command stdout as JSON")
}

/// A dataset file inside a scratch directory that lives as long as the
/// fixture does.
pub struct Dataset {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Dataset {
    pub fn new(items: &Value) -> Result<Self> {
        let dir = TempDir::new().context("allocating dataset dir")?;
        let path = dir.path().join("items.json");
        let dataset = Self { _dir: dir, path };
        dataset.write(items)?;
        Ok(dataset)
    }

    pub fn write(&self, items: &Value) -> Result<()> {
        fs::write(&self.path, serde_json::to_vec_pretty(items)?)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    pub fn write_raw(&self, contents: &str) -> Result<()> {
        fs::write(&self.path, contents).with_context(|| format!("writing {}", self.path.display()))
    }

    pub fn service(&self, ttl: Duration) -> Result<CatalogService> {
        let source = FileSource::new(&self.path)?;
        Ok(CatalogService::new(source).with_ttl(ttl))
    }
}

pub fn item(id: u32, name: &str, slot: &str, item_level: u32, required_level: u32) -> Value {
    json!({
        "itemId": id,
        "name": name,
        "icon": format!("inv_{id}"),
        "class": "Armor",
        "subclass": "Leather",
        "sellPrice": 100,
        "quality": "Uncommon",
        "itemLevel": item_level,
        "requiredLevel": required_level,
        "slot": slot,
        "tooltip": [{"label": name, "format": "Uncommon"}],
        "contentPhase": 1,
        "source": {"category": "Drop", "dropChance": 0.12}
    })
}

/// Small mixed catalog: weapons, armor, one level-60 piece.
pub fn sample_catalog() -> Value {
    json!([
        {
            "itemId": 12640, "name": "Lionheart Helm", "class": "Armor", "subclass": "Plate",
            "quality": "Epic", "itemLevel": 63, "requiredLevel": 60, "slot": "Head"
        },
        {
            "itemId": 19019, "name": "Thunderfury, Blessed Blade of the Windseeker",
            "class": "Weapon", "subclass": "Sword", "quality": "Legendary",
            "itemLevel": 80, "requiredLevel": 60, "slot": "One-Hand"
        },
        {
            "itemId": 10, "name": "Worn Shortsword", "class": "Weapon", "subclass": "Sword",
            "quality": "Common", "itemLevel": 2, "requiredLevel": 1, "slot": "Main Hand"
        },
        {
            "itemId": 1201, "name": "Dull Heater Shield", "class": "Armor", "subclass": "Shield",
            "quality": "Common", "itemLevel": 12, "requiredLevel": 7, "slot": "Off Hand"
        },
        {
            "itemId": 6125, "name": "Brawler's Harness", "class": "Armor", "subclass": "Leather",
            "quality": "Uncommon", "itemLevel": 20, "requiredLevel": 15, "slot": "Chest"
        },
        {
            "itemId": 4320, "name": "Spidersilk Boots", "class": "Armor", "subclass": "Cloth",
            "quality": "Rare", "itemLevel": 35, "requiredLevel": 30, "slot": "Feet"
        }
    ])
}
