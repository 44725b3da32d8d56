//! Editable catalog for the admin tools.
//!
//! The repository holds the item list in display order (newest additions
//! first), applies the admin panel's edits, counts unsaved changes and writes
//! the catalog back atomically. Lookups are linear; admin catalogs stay in
//! the hundreds of items.

use crate::catalog::identity::ItemId;
use crate::catalog::index::CatalogIndex;
use crate::catalog::model::{Item, Platforms, format_date};
use crate::write_json_atomic;
use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const NEW_ITEM_TITLE: &str = "New Wreath";

#[derive(Debug, Default)]
/// In-memory catalog with change tracking.
pub struct ItemRepository {
    items: Vec<Item>,
    pending_changes: usize,
    source: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
/// Headline counts for the admin status bar.
pub struct CatalogSummary {
    pub total: usize,
    pub available: usize,
    pub featured: usize,
}

#[derive(Clone, Debug, Eq, PartialEq)]
/// Outcome of [`ItemRepository::upsert`].
pub enum Upsert {
    Inserted(ItemId),
    Replaced(ItemId),
}

impl ItemRepository {
    /// Load the catalog at `path`; duplicate ids are an error.
    pub fn open(path: &Path) -> Result<Self> {
        let index = CatalogIndex::load(path)?;
        Ok(Self {
            items: index.into_items(),
            pending_changes: 0,
            source: Some(path.to_path_buf()),
        })
    }

    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let index = CatalogIndex::from_items(items)?;
        Ok(Self {
            items: index.into_items(),
            ..Self::default()
        })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Blank listing the admin form starts from.
    pub fn new_item(today: NaiveDate) -> Item {
        Item {
            id: ItemId::generate(),
            title: NEW_ITEM_TITLE.to_string(),
            date_added: Some(format_date(today)),
            platforms: Platforms {
                poshmark: Some(String::new()),
                fb_marketplace: Some(String::new()),
                mercari: Some(String::new()),
                other: Some(String::new()),
                ..Platforms::default()
            },
            ..Item::default()
        }
    }

    /// Insert a new listing at the front.
    ///
    /// Assigns an id when the item has none and stamps `dateAdded` with
    /// `today` when missing. An id already in the catalog is an error.
    pub fn add(&mut self, mut item: Item, today: NaiveDate) -> Result<ItemId> {
        fill_defaults(&mut item, today);
        if self.position(&item.id).is_some() {
            bail!("item id {} already exists", item.id);
        }
        let id = item.id.clone();
        debug!(id = %id, title = %item.title, "adding item");
        self.items.insert(0, item);
        self.mark_changed();
        Ok(id)
    }

    /// Replace the stored item that has the same id.
    pub fn update(&mut self, item: Item) -> Result<()> {
        let idx = self.require(&item.id)?;
        self.items[idx] = item;
        self.mark_changed();
        Ok(())
    }

    pub fn remove(&mut self, id: &ItemId) -> Result<Item> {
        let idx = self.require(id)?;
        let removed = self.items.remove(idx);
        self.mark_changed();
        Ok(removed)
    }

    /// Flip the sold flag; returns the new value.
    pub fn toggle_sold(&mut self, id: &ItemId) -> Result<bool> {
        let idx = self.require(id)?;
        let item = &mut self.items[idx];
        item.sold = !item.sold;
        let sold = item.sold;
        self.mark_changed();
        Ok(sold)
    }

    /// Flip the featured flag; returns the new value.
    pub fn toggle_featured(&mut self, id: &ItemId) -> Result<bool> {
        let idx = self.require(id)?;
        let item = &mut self.items[idx];
        item.featured = !item.featured;
        let featured = item.featured;
        self.mark_changed();
        Ok(featured)
    }

    /// Import semantics: an item whose id is already present replaces it in
    /// place, anything else is inserted at the front.
    pub fn upsert(&mut self, mut item: Item, today: NaiveDate) -> Upsert {
        fill_defaults(&mut item, today);
        let id = item.id.clone();
        let outcome = match self.position(&id) {
            Some(idx) => {
                self.items[idx] = item;
                Upsert::Replaced(id)
            }
            None => {
                self.items.insert(0, item);
                Upsert::Inserted(id)
            }
        };
        self.mark_changed();
        outcome
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            total: self.items.len(),
            available: self.items.iter().filter(|item| item.is_available()).count(),
            featured: self.items.iter().filter(|item| item.featured).count(),
        }
    }

    /// Number of edits since the last load or save.
    pub fn pending_changes(&self) -> usize {
        self.pending_changes
    }

    pub fn is_dirty(&self) -> bool {
        self.pending_changes > 0
    }

    /// Path the catalog was opened from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Write the catalog to `path` and clear the change counter.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        write_json_atomic(path, &self.items)
            .with_context(|| format!("saving catalog to {}", path.display()))?;
        info!(path = %path.display(), items = self.items.len(), changes = self.pending_changes, "catalog saved");
        self.pending_changes = 0;
        self.source = Some(path.to_path_buf());
        Ok(())
    }

    /// Save back to the file the catalog was opened from.
    pub fn save_to_source(&mut self) -> Result<()> {
        let path = self
            .source
            .clone()
            .ok_or_else(|| anyhow!("catalog was not loaded from a file; pass a path to save"))?;
        self.save(&path)
    }

    /// Pretty JSON for download/export.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.items).context("serializing catalog")
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    fn require(&self, id: &ItemId) -> Result<usize> {
        self.position(id)
            .ok_or_else(|| anyhow!("no item with id {id}"))
    }

    fn mark_changed(&mut self) {
        self.pending_changes += 1;
    }
}

fn fill_defaults(item: &mut Item, today: NaiveDate) {
    if item.id.is_empty() {
        item.id = ItemId::generate();
    }
    if item.date_added.is_none() {
        item.date_added = Some(format_date(today));
    }
}
