//! Catalog filter/sort engine.
//!
//! Pure functions from `(items, categories, state)` to the ordered visible
//! subset. Nothing here performs I/O or keeps state between calls; the engine
//! borrows the item slice and hands back references into it, so the catalog
//! itself is never modified. Callers re-run [`apply`] after every UI change.

mod filter;
mod sort;

pub use filter::filter;
pub use sort::{TitleSortKey, sort, title_sort_key};

use crate::catalog::{Item, SortKey};
use crate::filter_config::{FilterCategory, FilterConfig};
use crate::state::FilterState;
use serde::Serialize;
use std::fmt;

/// `sort(filter(items, categories, state), state.sort_id)`.
///
/// The sort id is parsed with [`SortKey::from_id`]; ids it does not know
/// leave the filtered order as is.
pub fn apply<'a>(
    items: &'a [Item],
    categories: &[FilterCategory],
    state: &FilterState,
) -> Vec<&'a Item> {
    let visible = filter(items, categories, state);
    sort(&visible, &SortKey::from_id(&state.sort_id))
}

/// Like [`apply`], but resolves the sort id through the config's declared
/// sort options first, so custom ids with a `field`/`direction` work.
pub fn apply_with_config<'a>(
    items: &'a [Item],
    config: &FilterConfig,
    state: &FilterState,
) -> Vec<&'a Item> {
    let visible = filter(items, &config.categories, state);
    sort(&visible, &config.resolve_sort(&state.sort_id))
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Counts shown next to the result grid.
pub struct FilterStats {
    pub total_items: usize,
    pub visible_items: usize,
    pub featured_visible: usize,
    pub active_filter_count: usize,
}

impl FilterStats {
    pub fn collect(items: &[Item], visible: &[&Item], state: &FilterState) -> Self {
        Self {
            total_items: items.len(),
            visible_items: visible.len(),
            featured_visible: visible.iter().filter(|item| item.featured).count(),
            active_filter_count: state.active_filter_count(),
        }
    }
}

impl fmt::Display for FilterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plural = if self.visible_items == 1 { "" } else { "s" };
        write!(f, "{} wreath{plural}", self.visible_items)?;
        if self.featured_visible > 0 {
            write!(f, " ({} featured)", self.featured_visible)?;
        }
        Ok(())
    }
}
