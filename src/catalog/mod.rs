//! Item catalog wiring.
//!
//! This module wraps the static dataset under `public/items.json` so callers
//! can load a validated snapshot and resolve items by id. Types here mirror
//! the dataset fields; the query engine and service work against
//! `CatalogSnapshot`.

pub mod identity;
pub mod index;
pub mod model;
pub mod source;

pub use identity::{ItemId, Quality, Slot};
pub use index::{CatalogSnapshot, compare_rank, name_collator};
pub use model::{Item, ItemSource, ItemSummary, TooltipLine};
pub use source::{CatalogSource, FileSource, StaticSource};
