//! Shared library for the wreath catalog tools.
//!
//! The crate exposes the catalog model, the filter configuration, the
//! user-facing filter state and the filter/sort engine that turns those into
//! the visible, ordered item list. The `catalog-view` and `catalog-admin`
//! binaries are thin front ends over these modules; data-directory discovery
//! lives in [`settings`].

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

pub mod catalog;
pub mod engine;
pub mod filter_config;
pub mod import;
pub mod logging;
mod schema_loader;
pub mod settings;
pub mod state;

pub use catalog::{
    CatalogIndex, CatalogSummary, Item, ItemId, ItemRepository, Platforms, SortDirection, SortKey,
    Upsert, load_items_from_path, parse_items,
};
pub use engine::{FilterStats, apply, apply_with_config};
pub use filter_config::{FilterCategory, FilterConfig, SelectionKind, SortOption, Subcategory};
pub use import::{ListingRecord, convert_listing, import_items, parse_import_payload};
pub use settings::CatalogPaths;
pub use state::{FilterState, StateSnapshot};

/// Today's date in local time, used to stamp `dateAdded`.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Write `value` as pretty JSON through a temp file in the target directory,
/// then rename it into place so readers never see a partial file.
pub(crate) fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temp file in {}", parent.display()))?;
    serde_json::to_writer_pretty(&mut tmp, value).context("serializing JSON")?;
    tmp.write_all(b"\n")?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|err| anyhow!("replacing {}: {}", path.display(), err.error))?;
    Ok(())
}
