// Integration suite for the item catalog: exercises the file-backed service,
// cache refresh behavior, and the bis-items CLI against scratch datasets.
mod support;

use anyhow::{Context, Result};
use bisgear::{
    CatalogError, ItemId, QuickSearchParams, SearchParams, Slot, best_items_at_level,
    decode_share_code, group_by_slot, share_url,
};
use serde_json::{Value, json};
use std::time::Duration;
use support::{Dataset, bis_items, item, run_json, sample_catalog};

const LONG_TTL: Duration = Duration::from_secs(300);

fn ids_of(items: &[bisgear::Item]) -> Vec<u32> {
    items.iter().map(|item| item.item_id.0).collect()
}

// Walks every page of a search and checks the pages partition the ranked result.
#[test]
fn search_pages_cover_every_match_once() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;

    let mut seen = Vec::new();
    let mut page = 1;
    loop {
        let params = SearchParams {
            page: Some(page),
            limit: Some(4),
            ..SearchParams::default()
        };
        let result = service.search(&params)?;
        assert_eq!(result.total, 6);
        assert_eq!(result.total_pages, 2);
        assert!(result.data.len() <= result.limit);
        if result.data.is_empty() {
            break;
        }
        seen.extend(ids_of(&result.data));
        page += 1;
    }
    assert_eq!(seen, vec![19019, 12640, 4320, 6125, 1201, 10]);
    Ok(())
}

// Repeated searches over one snapshot return identical, item-level ordered pages.
#[test]
fn search_is_idempotent_and_ranked() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    let params = SearchParams::from_query_pairs([("class", "Armor"), ("limit", "100")]);

    let first = service.search(&params)?;
    let second = service.search(&params)?;
    assert_eq!(first, second);
    for pair in first.data.windows(2) {
        assert!(pair[0].item_level >= pair[1].item_level);
    }
    assert_eq!(ids_of(&first.data), vec![12640, 4320, 6125, 1201]);
    Ok(())
}

// Default search over a tiny catalog orders by item level and reports page metadata.
#[test]
fn three_item_catalog_orders_by_item_level() -> Result<()> {
    let dataset = Dataset::new(&json!([
        item(1, "Alpha", "Head", 10, 5),
        item(2, "Beta", "Head", 50, 20),
        item(3, "Gamma", "Head", 5, 1)
    ]))?;
    let service = dataset.service(LONG_TTL)?;
    let result = service.search(&SearchParams::default())?;
    let levels: Vec<u32> = result.data.iter().map(|item| item.item_level).collect();
    assert_eq!(levels, vec![50, 10, 5]);
    assert_eq!((result.total, result.page, result.limit, result.total_pages), (3, 1, 20, 1));
    Ok(())
}

// Covers name and id text matching, level bounds, and exact slot facets.
#[test]
fn search_filters_and_text_match() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;

    let by_name = service.search(&SearchParams::from_query_pairs([("q", "THUNDER")]))?;
    assert_eq!(ids_of(&by_name.data), vec![19019]);

    let by_id = service.search(&SearchParams::from_query_pairs([("q", "1201")]))?;
    assert_eq!(ids_of(&by_id.data), vec![1201]);

    let levels = service.search(&SearchParams::from_query_pairs([
        ("minLevel", "10"),
        ("maxLevel", "30"),
    ]))?;
    assert_eq!(ids_of(&levels.data), vec![4320, 6125]);

    // Slot filters are exact: "Hand" matches nothing.
    let slot = service.search(&SearchParams::from_query_pairs([("slot", "Hand")]))?;
    assert_eq!(slot.total, 0);
    assert_eq!(slot.total_pages, 0);
    Ok(())
}

// Quick search uses substring facets and counts matches past its result cap.
#[test]
fn quick_search_caps_results_but_counts_all() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    let result = service.quick_search(&QuickSearchParams {
        class: Some("WEAP".into()),
        limit: Some(1),
        ..QuickSearchParams::default()
    })?;
    assert_eq!(result.total, 2);
    assert_eq!(result.results.len(), 1);
    assert_eq!(result.results[0].item_id, ItemId(19019));
    assert_eq!(result.query.class, "weap");
    assert_eq!(result.query.limit, 1);
    Ok(())
}

// Batch lookups keep input order, skip unknown ids, and refuse more than 100 ids.
#[test]
fn batch_lookup_rules() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;

    assert!(service.get_items_by_ids(&[])?.is_empty());
    let found = service.get_items_by_ids(&[ItemId(424242), ItemId(10)])?;
    assert_eq!(ids_of(&found), vec![10]);

    let ordered = service.get_items_by_ids(&[ItemId(4320), ItemId(10), ItemId(4320)])?;
    assert_eq!(ids_of(&ordered), vec![4320, 10, 4320]);

    let too_many: Vec<ItemId> = (1..=101).map(ItemId).collect();
    let err = service.get_items_by_ids(&too_many).unwrap_err();
    assert!(matches!(err, CatalogError::Validation(_)));
    assert!(err.to_string().contains("100"));
    Ok(())
}

// Metadata lists each facet sorted and spans the required levels present.
#[test]
fn metadata_reports_sorted_facets() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    let meta = service.get_items_metadata()?;
    assert_eq!(meta.total_items, 6);
    assert_eq!(
        meta.slots,
        vec!["Chest", "Feet", "Head", "Main Hand", "Off Hand", "One-Hand"]
    );
    assert_eq!(meta.classes, vec!["Armor", "Weapon"]);
    let range = meta.level_range.context("non-empty catalog has a range")?;
    assert_eq!((range.min, range.max), (1, 60));
    Ok(())
}

// An empty dataset still loads; its level range serializes as null.
#[test]
fn empty_catalog_has_no_level_range() -> Result<()> {
    let dataset = Dataset::new(&json!([]))?;
    let service = dataset.service(LONG_TTL)?;
    let meta = service.get_items_metadata()?;
    assert_eq!(meta.total_items, 0);
    assert!(meta.level_range.is_none());
    let rendered = serde_json::to_value(&meta)?;
    assert_eq!(rendered["levelRange"], Value::Null);
    Ok(())
}

// Best-item selection picks the highest required level at or below the character level.
#[test]
fn selector_tracks_leveling_upgrades() -> Result<()> {
    let items: Vec<bisgear::Item> = serde_json::from_value(json!([
        item(1, "Cap", "Head", 8, 10),
        item(2, "Coif", "Head", 20, 25),
        item(3, "Crown", "Head", 30, 40)
    ]))?;
    let groups = group_by_slot(&items);

    let at_30 = best_items_at_level(&groups, 30);
    assert_eq!(at_30[&Slot::Head].item_id, ItemId(2));
    assert!(best_items_at_level(&groups, 5).is_empty());
    assert_eq!(best_items_at_level(&groups, 40)[&Slot::Head].item_id, ItemId(3));
    Ok(())
}

// One-Hand and Two-Hand items compete in the Off Hand and Main Hand slots.
#[test]
fn selector_uses_canonical_weapon_slots() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    let ids = [10, 1201, 19019, 6125, 4320, 12640].map(ItemId);

    let at_30 = service.best_items_for_ids(&ids, 30)?;
    let picked: Vec<(Slot, u32)> = at_30
        .iter()
        .map(|(slot, item)| (slot.clone(), item.item_id.0))
        .collect();
    assert_eq!(
        picked,
        vec![
            (Slot::Chest, 6125),
            (Slot::Feet, 4320),
            (Slot::MainHand, 10),
            (Slot::OffHand, 1201),
        ]
    );

    let at_60 = service.best_items_for_ids(&ids, 60)?;
    assert_eq!(at_60[&Slot::OffHand].item_id, ItemId(19019));
    assert_eq!(at_60[&Slot::Head].item_id, ItemId(12640));
    Ok(())
}

// File edits are invisible until the TTL lapses or a reload is forced.
#[test]
fn snapshot_is_reused_within_ttl() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);

    dataset.write(&json!([item(1, "Lone", "Head", 1, 1)]))?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);
    assert_eq!(service.load_attempts(), 1);

    let reloaded = service.load()?;
    assert_eq!(reloaded.len(), 1);
    assert_eq!(service.get_items_metadata()?.total_items, 1);
    Ok(())
}

// Once the TTL lapses the next query reads the dataset again.
#[test]
fn expired_snapshot_picks_up_file_changes() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(Duration::ZERO)?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);

    dataset.write(&json!([item(1, "Lone", "Head", 1, 1)]))?;
    assert_eq!(service.get_items_metadata()?.total_items, 1);
    Ok(())
}

// A broken dataset on reload leaves the last good snapshot in service.
#[test]
fn corrupted_file_keeps_serving_previous_snapshot() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(Duration::ZERO)?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);

    dataset.write_raw("[{\"itemId\": ")?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);
    assert!(service.get_item_by_id(ItemId(19019))?.is_some());
    assert!(matches!(service.load(), Err(CatalogError::Unavailable(_))));
    Ok(())
}

// After a failed reload the next query retries, so a fixed dataset shows up at once.
#[test]
fn repaired_dataset_is_served_on_next_expired_query() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(Duration::from_millis(100))?;
    assert_eq!(service.get_items_metadata()?.total_items, 6);

    dataset.write_raw("{ truncated")?;
    std::thread::sleep(Duration::from_millis(150));
    assert_eq!(service.get_items_metadata()?.total_items, 6);

    dataset.write(&json!([item(1, "Lone", "Head", 1, 1)]))?;
    assert_eq!(service.get_items_metadata()?.total_items, 1);
    assert_eq!(service.load_attempts(), 3);
    Ok(())
}

// Without any good load the service reports the catalog as unavailable.
#[test]
fn first_load_failure_is_unavailable() -> Result<()> {
    let dataset = Dataset::new(&json!([]))?;
    dataset.write_raw("not json")?;
    let service = dataset.service(LONG_TTL)?;
    let err = service.search(&SearchParams::default()).unwrap_err();
    assert!(matches!(err, CatalogError::Unavailable(_)));
    assert!(err.to_string().contains("parsing item dataset"));
    Ok(())
}

// Schema failures name the JSON path of the bad field.
#[test]
fn schema_violations_name_the_offending_field() -> Result<()> {
    let dataset = Dataset::new(&json!([item(7, "Too High", "Head", 70, 61)]))?;
    let service = dataset.service(LONG_TTL)?;
    let err = service.get_items_metadata().unwrap_err();
    assert!(err.to_string().contains("/0/requiredLevel"), "{err}");
    Ok(())
}

// Share links round-trip ids in order and hydrate only known items.
#[test]
fn shared_link_hydrates_items() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let service = dataset.service(LONG_TTL)?;
    let ids = [ItemId(4320), ItemId(10), ItemId(999_999)];
    let link = share_url("https://bis.example/?tab=lists", &ids)?;

    let decoded = bisgear::ids_from_url(&link).context("link carries a share code")?;
    assert_eq!(decoded, ids.to_vec());
    let items = service.get_items_by_ids(&decoded)?;
    assert_eq!(ids_of(&items), vec![4320, 10]);

    assert_eq!(decode_share_code("%%%"), None);
    Ok(())
}

// Names at equal item level sort the way a browser's localeCompare does.
#[test]
fn equal_item_levels_rank_by_collated_name() -> Result<()> {
    let dataset = Dataset::new(&json!([
        item(1, "Zed", "Head", 20, 1),
        item(2, "Élan", "Head", 20, 1),
        item(3, "Blade, A", "Head", 20, 1),
        item(4, "Eagle", "Head", 20, 1),
        item(5, "Blade-A", "Head", 20, 1),
        item(6, "beta", "Head", 20, 1),
        item(7, "Beta", "Head", 20, 1)
    ]))?;
    let service = dataset.service(LONG_TTL)?;
    let result = service.search(&SearchParams::default())?;
    let names: Vec<&str> = result.data.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["beta", "Beta", "Blade-A", "Blade, A", "Eagle", "Élan", "Zed"]
    );
    Ok(())
}

// bis-items prints metadata and search pages as JSON.
#[test]
fn cli_meta_and_search() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;

    let mut meta = bis_items(&dataset.path);
    meta.arg("meta");
    let meta = run_json(meta)?;
    assert_eq!(meta["totalItems"], json!(6));
    assert_eq!(meta["levelRange"], json!({"min": 1, "max": 60}));

    let mut search = bis_items(&dataset.path);
    search.args(["search", "--class", "Weapon", "--limit", "1", "--page", "2"]);
    let page = run_json(search)?;
    assert_eq!(page["total"], json!(2));
    assert_eq!(page["totalPages"], json!(2));
    assert_eq!(page["data"][0]["itemId"], json!(10));
    Ok(())
}

// bis-items get fails loudly for unknown or malformed ids.
#[test]
fn cli_get_reports_missing_items() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;

    let mut found = bis_items(&dataset.path);
    found.args(["get", "12640"]);
    assert_eq!(run_json(found)?["name"], json!("Lionheart Helm"));

    let mut missing = bis_items(&dataset.path);
    missing.args(["get", "77"]);
    let output = missing.output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Item not found"));

    let mut invalid = bis_items(&dataset.path);
    invalid.args(["get", "abc"]);
    let output = invalid.output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid item ID"));
    Ok(())
}

// bis-items batch accepts a JSON request body, including float-typed ids.
#[test]
fn cli_batch_accepts_json_body() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;
    let mut batch = bis_items(&dataset.path);
    batch.args(["batch", "--json", r#"{"itemIds": [6125.0, "x", 3, 10]}"#]);
    let body = run_json(batch)?;
    let ids: Vec<u64> = body["items"]
        .as_array()
        .context("items array")?
        .iter()
        .filter_map(|item| item["itemId"].as_u64())
        .collect();
    assert_eq!(ids, vec![6125, 10]);

    let mut bad = bis_items(&dataset.path);
    bad.args(["batch", "--json", r#"{"itemIds": 5}"#]);
    let output = bad.output()?;
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("itemIds must be an array"));
    Ok(())
}

// A share code from bis-items share feeds best and unshare.
#[test]
fn cli_share_then_best() -> Result<()> {
    let dataset = Dataset::new(&sample_catalog())?;

    let mut share = bis_items(&dataset.path);
    share.args(["share", "10,1201,19019"]);
    let output = support::run_command(share)?;
    let code = String::from_utf8(output.stdout)?.trim().to_string();
    assert_eq!(
        decode_share_code(&code),
        Some(vec![ItemId(10), ItemId(1201), ItemId(19019)])
    );

    let mut best = bis_items(&dataset.path);
    best.args(["best", "--level", "60", &code]);
    let picked = run_json(best)?;
    assert_eq!(picked["Main Hand"]["itemId"], json!(10));
    assert_eq!(picked["Off Hand"]["itemId"], json!(19019));

    let mut unshare = bis_items(&dataset.path);
    unshare.arg("unshare").arg(&code);
    let hydrated = run_json(unshare)?;
    assert_eq!(hydrated["items"].as_array().map(Vec::len), Some(3));
    Ok(())
}
