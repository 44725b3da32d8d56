//! User-chosen filter and sort selections.
//!
//! `FilterState` is a plain value: UI handlers mutate it and hand it to the
//! engine. It never touches the item list. Snapshots use the storefront's
//! `wreathFilters` JSON layout so a saved visit can be restored.

use crate::filter_config::{FilterCategory, SelectionKind};
use crate::write_json_atomic;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterState {
    pub search_text: String,
    pub available_only: bool,
    /// Category id -> selected subcategory ids. Categories with nothing
    /// selected are absent.
    pub selected: BTreeMap<String, BTreeSet<String>>,
    pub sort_id: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new("featured")
    }
}

impl FilterState {
    pub fn new(default_sort: impl Into<String>) -> Self {
        Self {
            search_text: String::new(),
            available_only: false,
            selected: BTreeMap::new(),
            sort_id: default_sort.into(),
        }
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search_text = text.into();
    }

    pub fn set_available_only(&mut self, available_only: bool) {
        self.available_only = available_only;
    }

    pub fn set_sort(&mut self, sort_id: impl Into<String>) {
        self.sort_id = sort_id.into();
    }

    /// Check or uncheck a subcategory. Radio categories keep at most one
    /// selection: checking replaces whatever was selected before.
    pub fn set_selected(&mut self, category: &FilterCategory, subcategory_id: &str, checked: bool) {
        match (category.kind, checked) {
            (SelectionKind::Radio, true) => {
                self.selected.insert(
                    category.id.clone(),
                    BTreeSet::from([subcategory_id.to_string()]),
                );
            }
            (SelectionKind::Checkbox, true) => {
                self.selected
                    .entry(category.id.clone())
                    .or_default()
                    .insert(subcategory_id.to_string());
            }
            (_, false) => self.deselect(&category.id, subcategory_id),
        }
    }

    /// Add a selection by raw ids, without consulting the category kind.
    pub fn select(&mut self, category_id: &str, subcategory_id: &str) {
        self.selected
            .entry(category_id.to_string())
            .or_default()
            .insert(subcategory_id.to_string());
    }

    pub fn deselect(&mut self, category_id: &str, subcategory_id: &str) {
        if let Some(ids) = self.selected.get_mut(category_id) {
            ids.remove(subcategory_id);
            if ids.is_empty() {
                self.selected.remove(category_id);
            }
        }
    }

    pub fn is_selected(&self, category_id: &str, subcategory_id: &str) -> bool {
        self.selected
            .get(category_id)
            .is_some_and(|ids| ids.contains(subcategory_id))
    }

    pub fn selections(&self, category_id: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(category_id).filter(|ids| !ids.is_empty())
    }

    /// Search text with surrounding whitespace removed; `None` when blank.
    pub fn search_query(&self) -> Option<&str> {
        let trimmed = self.search_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    /// Selected subcategories, plus one each for availability and search.
    pub fn active_filter_count(&self) -> usize {
        let selections: usize = self.selected.values().map(BTreeSet::len).sum();
        selections + usize::from(self.available_only) + usize::from(self.search_query().is_some())
    }

    /// Drop search, availability and facet selections; keep the sort.
    pub fn clear_filters(&mut self) {
        self.search_text.clear();
        self.available_only = false;
        self.selected.clear();
    }

    /// Back to a fresh state with `default_sort`.
    pub fn reset(&mut self, default_sort: impl Into<String>) {
        *self = Self::new(default_sort);
    }

    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            active_filters: ActiveFilters {
                categories: self
                    .selected
                    .iter()
                    .map(|(category, ids)| (category.clone(), ids.iter().cloned().collect()))
                    .collect(),
                show_available_only: self.available_only,
                search_text: self.search_text.clone(),
            },
            current_sort: Some(self.sort_id.clone()),
        }
    }

    pub fn from_snapshot(snapshot: StateSnapshot, default_sort: &str) -> Self {
        let mut state = Self::new(
            snapshot
                .current_sort
                .filter(|sort| !sort.trim().is_empty())
                .unwrap_or_else(|| default_sort.to_string()),
        );
        state.search_text = snapshot.active_filters.search_text;
        state.available_only = snapshot.active_filters.show_available_only;
        for (category, ids) in snapshot.active_filters.categories {
            for id in ids {
                state.select(&category, &id);
            }
        }
        state
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, &self.to_snapshot())
            .with_context(|| format!("saving filter state to {}", path.display()))
    }

    /// Restore a saved snapshot. A missing file gives a fresh state; an
    /// unreadable or corrupt one is logged and also gives a fresh state.
    pub fn restore_snapshot(path: &Path, default_sort: &str) -> Self {
        if !path.exists() {
            return Self::new(default_sort);
        }
        let parsed = fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|data| serde_json::from_str::<StateSnapshot>(&data).map_err(Into::into));
        match parsed {
            Ok(snapshot) => Self::from_snapshot(snapshot, default_sort),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable filter snapshot");
                Self::new(default_sort)
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Persisted form of a [`FilterState`].
pub struct StateSnapshot {
    #[serde(default)]
    pub active_filters: ActiveFilters,
    #[serde(default)]
    pub current_sort: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFilters {
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub show_available_only: bool,
    #[serde(default)]
    pub search_text: String,
}
