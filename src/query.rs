//! Filtering, ranking and pagination over one catalog snapshot.
//!
//! Two search flavours coexist because callers rely on both:
//! - [`search`]: exact, case-sensitive facet filters with page/limit paging.
//! - [`quick_search`]: case-insensitive substring filters on slot and class
//!   with a plain result cap, returning item summaries.
//!
//! Both share the free-text rule (digits match inside item ids, anything else
//! matches inside names) and the snapshot's ranking, so identical inputs give
//! identical orderings. Loose parameters are clamped, never rejected; only
//! batch requests can fail validation.

use crate::catalog::{CatalogSnapshot, Item, ItemId, ItemSummary};
use crate::error::{CatalogError, CatalogResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const DEFAULT_QUICK_LIMIT: i64 = 50;
pub const MAX_BATCH_IDS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Parameters for the paginated search.
///
/// Everything is optional; `page` defaults to 1 and `limit` to 20. Values are
/// kept as the caller sent them and normalized when the search runs.
pub struct SearchParams {
    pub query: Option<String>,
    pub slot: Option<String>,
    pub quality: Option<String>,
    pub class: Option<String>,
    pub subclass: Option<String>,
    pub min_level: Option<i64>,
    pub max_level: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Parameters for the quick search used by the item picker.
pub struct QuickSearchParams {
    pub query: Option<String>,
    pub slot: Option<String>,
    pub class: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// One page of a filtered, ranked result set.
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Normalized quick-search inputs echoed back to the caller.
pub struct QuickSearchEcho {
    pub q: String,
    pub slot: String,
    pub class: String,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickSearchResult {
    pub query: QuickSearchEcho,
    pub total: usize,
    pub results: Vec<ItemSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Facet values and level span of the whole catalog.
pub struct ItemsMetadata {
    pub total_items: usize,
    pub slots: Vec<String>,
    pub qualities: Vec<String>,
    pub classes: Vec<String>,
    pub subclasses: Vec<String>,
    /// `None` only for an empty catalog.
    pub level_range: Option<LevelRange>,
}

impl SearchParams {
    /// Build parameters from raw request pairs (`q`, `slot`, `quality`,
    /// `class`, `subclass`, `minLevel`, `maxLevel`, `page`, `limit`).
    ///
    /// Empty strings count as absent and numbers are read leniently; a value
    /// with no leading integer is dropped rather than rejected. Unknown keys
    /// are ignored.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "q" => params.query = non_empty(value),
                "slot" => params.slot = non_empty(value),
                "quality" => params.quality = non_empty(value),
                "class" => params.class = non_empty(value),
                "subclass" => params.subclass = non_empty(value),
                "minLevel" => params.min_level = parse_int_prefix(value),
                "maxLevel" => params.max_level = parse_int_prefix(value),
                "page" => params.page = parse_int_prefix(value),
                "limit" => params.limit = parse_int_prefix(value),
                _ => {}
            }
        }
        params
    }

    /// Effective page number (at least 1).
    pub fn effective_page(&self) -> usize {
        self.page.unwrap_or(1).max(1) as usize
    }

    /// Effective page size, clamped to `1..=100`.
    pub fn effective_limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT) as usize
    }
}

impl QuickSearchParams {
    /// Build parameters from raw request pairs (`q`, `slot`, `class`, `limit`).
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.as_ref();
            match key.as_ref() {
                "q" => params.query = non_empty(value),
                "slot" => params.slot = non_empty(value),
                "class" => params.class = non_empty(value),
                "limit" => params.limit = parse_int_prefix(value),
                _ => {}
            }
        }
        params
    }

    /// Effective result cap: default 50, at least 1, no upper bound.
    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_QUICK_LIMIT).max(1) as usize
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read the leading integer of `raw` the way browsers parse query numbers:
/// surrounding whitespace and trailing junk are tolerated, no digits at all
/// yields `None`.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Free-text matcher shared by both search flavours.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TextMatch {
    ItemId(String),
    Name(String),
}

impl TextMatch {
    fn parse(raw: Option<&str>) -> Option<Self> {
        let needle = raw?.to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if needle.bytes().all(|b| b.is_ascii_digit()) {
            Some(TextMatch::ItemId(needle))
        } else {
            Some(TextMatch::Name(needle))
        }
    }

    fn matches(&self, item: &Item) -> bool {
        match self {
            TextMatch::ItemId(needle) => item.item_id.0.to_string().contains(needle.as_str()),
            TextMatch::Name(needle) => {
                item.name.to_lowercase().contains(needle.as_str())
                    || item.unique_name.to_lowercase().contains(needle.as_str())
            }
        }
    }
}

/// Compiled filter for [`search`]. Facets compare exactly and case-sensitively.
struct ExactFilter<'a> {
    text: Option<TextMatch>,
    slot: Option<&'a str>,
    quality: Option<&'a str>,
    class: Option<&'a str>,
    subclass: Option<&'a str>,
    min_level: Option<i64>,
    max_level: Option<i64>,
}

impl<'a> ExactFilter<'a> {
    fn new(params: &'a SearchParams) -> Self {
        Self {
            text: TextMatch::parse(params.query.as_deref()),
            slot: params.slot.as_deref().filter(|v| !v.is_empty()),
            quality: params.quality.as_deref().filter(|v| !v.is_empty()),
            class: params.class.as_deref().filter(|v| !v.is_empty()),
            subclass: params.subclass.as_deref().filter(|v| !v.is_empty()),
            min_level: params.min_level,
            max_level: params.max_level,
        }
    }

    fn matches(&self, item: &Item) -> bool {
        if let Some(text) = &self.text {
            if !text.matches(item) {
                return false;
            }
        }
        if self.slot.is_some_and(|slot| item.slot.as_str() != slot) {
            return false;
        }
        if self.quality.is_some_and(|q| item.quality.as_str() != q) {
            return false;
        }
        if self.class.is_some_and(|class| item.class != class) {
            return false;
        }
        if self.subclass.is_some_and(|sub| item.subclass != sub) {
            return false;
        }
        let level = i64::from(item.required_level);
        if self.min_level.is_some_and(|min| level < min) {
            return false;
        }
        if self.max_level.is_some_and(|max| level > max) {
            return false;
        }
        true
    }
}

/// Paginated search with exact facet filters.
///
/// Filters first, then ranks (item level descending, name by collation),
/// then slices the requested page. A page past the end yields empty `data`
/// with the real `total` and `total_pages`.
pub fn search(snapshot: &CatalogSnapshot, params: &SearchParams) -> PaginatedResult<Item> {
    let filter = ExactFilter::new(params);
    let page = params.effective_page();
    let limit = params.effective_limit();
    let start = (page - 1).saturating_mul(limit);

    let mut total = 0;
    let mut data = Vec::with_capacity(limit);
    for item in snapshot.ranked().filter(|item| filter.matches(item)) {
        if total >= start && data.len() < limit {
            data.push(item.clone());
        }
        total += 1;
    }

    PaginatedResult {
        data,
        total,
        page,
        limit,
        total_pages: total.div_ceil(limit),
    }
}

/// Quick search: case-insensitive substring filters on slot and class,
/// capped at `limit` results.
pub fn quick_search(snapshot: &CatalogSnapshot, params: &QuickSearchParams) -> QuickSearchResult {
    let text = TextMatch::parse(params.query.as_deref());
    let slot = params.slot.as_deref().unwrap_or_default().to_lowercase();
    let class = params.class.as_deref().unwrap_or_default().to_lowercase();
    let limit = params.effective_limit();

    let mut total = 0;
    let mut results = Vec::new();
    for item in snapshot.ranked() {
        if let Some(text) = &text {
            if !text.matches(item) {
                continue;
            }
        }
        if !slot.is_empty() && !item.slot.as_str().to_lowercase().contains(&slot) {
            continue;
        }
        if !class.is_empty() && !item.class.to_lowercase().contains(&class) {
            continue;
        }
        if results.len() < limit {
            results.push(item.summary());
        }
        total += 1;
    }

    QuickSearchResult {
        query: QuickSearchEcho {
            q: params.query.as_deref().unwrap_or_default().to_lowercase(),
            slot,
            class,
            limit,
        },
        total,
        results,
    }
}

/// Resolve up to [`MAX_BATCH_IDS`] ids, keeping input order and dropping
/// unknown ids. Repeated ids are returned once per occurrence.
pub fn get_batch(snapshot: &CatalogSnapshot, ids: &[ItemId]) -> CatalogResult<Vec<Item>> {
    if ids.len() > MAX_BATCH_IDS {
        return Err(CatalogError::Validation(format!(
            "Maximum {MAX_BATCH_IDS} items per request, got {}",
            ids.len()
        )));
    }
    Ok(ids
        .iter()
        .filter_map(|id| snapshot.get(*id).cloned())
        .collect())
}

/// Extract item ids from a JSON batch body of the form `{"itemIds": [...]}`.
///
/// A missing or non-array `itemIds` and more than [`MAX_BATCH_IDS`] entries
/// are validation errors; entries that are not item-id integers are skipped.
pub fn parse_batch_request(body: &Value) -> CatalogResult<Vec<ItemId>> {
    let Some(raw_ids) = body.get("itemIds").and_then(Value::as_array) else {
        return Err(CatalogError::Validation(
            "itemIds must be an array".to_string(),
        ));
    };
    if raw_ids.len() > MAX_BATCH_IDS {
        return Err(CatalogError::Validation(format!(
            "Maximum {MAX_BATCH_IDS} items per request, got {}",
            raw_ids.len()
        )));
    }
    Ok(raw_ids.iter().filter_map(item_id_from_json).collect())
}

// JSON numbers naming an id: `6125` and `6125.0` alike.
fn item_id_from_json(value: &Value) -> Option<ItemId> {
    let id = match value.as_u64() {
        Some(id) => id,
        None => {
            let float = value.as_f64()?;
            if float.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&float) {
                return None;
            }
            float as u64
        }
    };
    u32::try_from(id).ok().map(ItemId)
}

/// Facet lists (sorted, de-duplicated) and the required-level span of the
/// whole catalog, ignoring any filters.
pub fn metadata(snapshot: &CatalogSnapshot) -> ItemsMetadata {
    let mut slots = BTreeSet::new();
    let mut qualities = BTreeSet::new();
    let mut classes = BTreeSet::new();
    let mut subclasses = BTreeSet::new();
    let mut level_range: Option<LevelRange> = None;

    for item in snapshot.items() {
        slots.insert(item.slot.as_str());
        qualities.insert(item.quality.as_str());
        classes.insert(item.class.as_str());
        subclasses.insert(item.subclass.as_str());
        let level = item.required_level;
        level_range = Some(match level_range {
            None => LevelRange {
                min: level,
                max: level,
            },
            Some(range) => LevelRange {
                min: range.min.min(level),
                max: range.max.max(level),
            },
        });
    }

    let owned = |set: BTreeSet<&str>| set.into_iter().map(str::to_string).collect::<Vec<_>>();
    ItemsMetadata {
        total_items: snapshot.len(),
        slots: owned(slots),
        qualities: owned(qualities),
        classes: owned(classes),
        subclasses: owned(subclasses),
        level_range,
    }
}
