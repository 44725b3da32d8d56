//! Item catalog wiring.
//!
//! This module wraps `wreaths.json`: the lenient item model, an id-keyed
//! index for read paths (the storefront), and an editable repository for the
//! admin tools. Callers that only need the parsed list use
//! [`load_items_from_path`].

pub mod identity;
pub mod index;
pub mod model;
pub mod repository;

pub use identity::{ItemId, SortDirection, SortKey};
pub use index::CatalogIndex;
pub use model::{Item, Platforms, parse_items};
pub use repository::{CatalogSummary, ItemRepository, Upsert};

pub use model::load_items_from_path;
