//! Catalog service: the single entry point callers use.
//!
//! The service owns the current snapshot and refreshes it from its
//! `CatalogSource` once the TTL has elapsed. Refreshes build a complete new
//! snapshot off to the side and publish it with one reference swap, so
//! queries already holding the old `Arc` finish against it undisturbed.
//! Concurrent refresh triggers queue on a gate and re-check freshness, which
//! collapses them into a single load.
//!
//! A failed refresh never takes the catalog away: while a previous snapshot
//! exists it keeps being served, and the next query past the TTL tries again.
//! Only a service that has never loaded reports `CatalogError::Unavailable`.

use crate::catalog::{CatalogSnapshot, CatalogSource, FileSource, Item, ItemId, Slot};
use crate::config::{DEFAULT_CACHE_TTL, ServiceConfig};
use crate::error::{CatalogError, CatalogResult};
use crate::query::{
    self, ItemsMetadata, MAX_BATCH_IDS, PaginatedResult, QuickSearchParams, QuickSearchResult,
    SearchParams,
};
use crate::selector::{self, SlotGroups};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

struct Loaded {
    snapshot: Arc<CatalogSnapshot>,
    refreshed_at: Instant,
}

pub struct CatalogService {
    source: Box<dyn CatalogSource>,
    ttl: Duration,
    current: RwLock<Option<Loaded>>,
    reload_gate: Mutex<()>,
    load_attempts: AtomicU64,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("source", &self.source.describe())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl CatalogService {
    /// Service over `source` with the default five minute TTL. Nothing is
    /// loaded until the first query.
    pub fn new(source: impl CatalogSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            ttl: DEFAULT_CACHE_TTL,
            current: RwLock::new(None),
            reload_gate: Mutex::new(()),
            load_attempts: AtomicU64::new(0),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// File-backed service built from resolved configuration.
    pub fn from_config(config: &ServiceConfig) -> anyhow::Result<Self> {
        let source = FileSource::new(&config.items_path)?;
        Ok(Self::new(source).with_ttl(config.cache_ttl))
    }

    /// How many times the source has been asked for a dataset.
    pub fn load_attempts(&self) -> u64 {
        self.load_attempts.load(Ordering::SeqCst)
    }

    /// Force a reload now, regardless of the TTL.
    ///
    /// On failure the previous snapshot (if any) stays in place and the error
    /// is returned to the caller.
    pub fn load(&self) -> CatalogResult<Arc<CatalogSnapshot>> {
        let _gate = self.reload_gate.lock().unwrap_or_else(|err| err.into_inner());
        self.refresh().map_err(|err| {
            let source = self.source.describe();
            let error = format!("{err:#}");
            warn!(%source, %error, "forced item catalog reload failed");
            CatalogError::Unavailable(error)
        })
    }

    /// The current snapshot, reloading first when it is missing or stale.
    pub fn snapshot(&self) -> CatalogResult<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        let _gate = self.reload_gate.lock().unwrap_or_else(|err| err.into_inner());
        // Another caller may have finished a reload while we waited.
        if let Some(snapshot) = self.fresh_snapshot() {
            return Ok(snapshot);
        }

        match self.refresh() {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => {
                let error = format!("{err:#}");
                let current = self.current.read().unwrap_or_else(|err| err.into_inner());
                match current.as_ref() {
                    Some(loaded) => {
                        let source = self.source.describe();
                        warn!(%source, %error, "item catalog reload failed; serving previous snapshot");
                        Ok(Arc::clone(&loaded.snapshot))
                    }
                    None => Err(CatalogError::Unavailable(error)),
                }
            }
        }
    }

    fn fresh_snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        let current = self.current.read().unwrap_or_else(|err| err.into_inner());
        current
            .as_ref()
            .filter(|loaded| loaded.refreshed_at.elapsed() < self.ttl)
            .map(|loaded| Arc::clone(&loaded.snapshot))
    }

    /// Load and publish a new snapshot. Caller holds the reload gate.
    fn refresh(&self) -> anyhow::Result<Arc<CatalogSnapshot>> {
        self.load_attempts.fetch_add(1, Ordering::SeqCst);
        let started = Instant::now();
        let items = self.source.load()?;
        let snapshot = Arc::new(CatalogSnapshot::new(items));
        let source = self.source.describe();
        let items = snapshot.len();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(%source, items, elapsed_ms, "loaded item catalog");

        let mut current = self.current.write().unwrap_or_else(|err| err.into_inner());
        *current = Some(Loaded {
            snapshot: Arc::clone(&snapshot),
            refreshed_at: Instant::now(),
        });
        Ok(snapshot)
    }

    /// Paginated search with exact facet filters.
    pub fn search(&self, params: &SearchParams) -> CatalogResult<PaginatedResult<Item>> {
        let snapshot = self.snapshot()?;
        let result = query::search(&snapshot, params);
        debug!(total = result.total, page = result.page, "item search");
        Ok(result)
    }

    /// Substring search with a plain result cap.
    pub fn quick_search(&self, params: &QuickSearchParams) -> CatalogResult<QuickSearchResult> {
        let snapshot = self.snapshot()?;
        let result = query::quick_search(&snapshot, params);
        debug!(total = result.total, returned = result.results.len(), "item quick search");
        Ok(result)
    }

    /// `Ok(None)` when no item has this id.
    pub fn get_item_by_id(&self, id: ItemId) -> CatalogResult<Option<Item>> {
        let snapshot = self.snapshot()?;
        Ok(snapshot.get(id).cloned())
    }

    /// Hydrate up to 100 ids into items, in input order, skipping unknown ids.
    pub fn get_items_by_ids(&self, ids: &[ItemId]) -> CatalogResult<Vec<Item>> {
        if ids.len() > MAX_BATCH_IDS {
            return Err(CatalogError::Validation(format!(
                "Maximum {MAX_BATCH_IDS} items per request, got {}",
                ids.len()
            )));
        }
        let snapshot = self.snapshot()?;
        query::get_batch(&snapshot, ids)
    }

    pub fn get_items_metadata(&self) -> CatalogResult<ItemsMetadata> {
        let snapshot = self.snapshot()?;
        Ok(query::metadata(&snapshot))
    }

    /// Best item per canonical slot among `items` at `level`.
    pub fn best_items_at_level(&self, items: &[Item], level: u32) -> BTreeMap<Slot, Item> {
        let groups: SlotGroups = selector::group_by_slot(items);
        selector::best_items_at_level(&groups, level)
    }

    /// Hydrate a gear list from ids, then pick the best item per slot.
    pub fn best_items_for_ids(
        &self,
        ids: &[ItemId],
        level: u32,
    ) -> CatalogResult<BTreeMap<Slot, Item>> {
        let items = self.get_items_by_ids(ids)?;
        Ok(self.best_items_at_level(&items, level))
    }
}
