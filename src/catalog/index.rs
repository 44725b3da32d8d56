//! Indexed, read-only view of a loaded catalog.
//!
//! The index enforces id uniqueness on top of the lenient item decoding:
//! field-level damage is tolerated, but two listings claiming the same id is
//! a catalog error because edits and imports key on it.

use crate::catalog::identity::ItemId;
use crate::catalog::model::{Item, load_items_from_path};
use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug)]
/// Items in file order plus a lookup keyed by id.
pub struct CatalogIndex {
    items: Vec<Item>,
    by_id: BTreeMap<ItemId, usize>,
}

impl CatalogIndex {
    /// Load `wreaths.json` and build the index.
    pub fn load(path: &Path) -> Result<Self> {
        let items =
            load_items_from_path(path).with_context(|| format!("loading {}", path.display()))?;
        Self::from_items(items).with_context(|| format!("indexing {}", path.display()))
    }

    /// Build the index; duplicate non-empty ids are rejected.
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let by_id = build_index(&items)?;
        Ok(Self { items, by_id })
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.by_id.get(id).map(|&idx| &self.items[idx])
    }

    /// Iterates ids in stable (sorted) order.
    pub fn ids(&self) -> impl Iterator<Item = &ItemId> {
        self.by_id.keys()
    }

    /// Items in catalog file order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }
}

fn build_index(items: &[Item]) -> Result<BTreeMap<ItemId, usize>> {
    let mut map = BTreeMap::new();
    let mut missing = 0usize;
    for (idx, item) in items.iter().enumerate() {
        if item.id.is_empty() {
            missing += 1;
            continue;
        }
        if map.insert(item.id.clone(), idx).is_some() {
            bail!("duplicate item id {}", item.id);
        }
    }
    if missing > 0 {
        warn!(count = missing, "catalog items without an id are not addressable");
    }
    Ok(map)
}
