//! Narrowing passes: availability, free-text search, category facets.

use crate::catalog::Item;
use crate::filter_config::FilterCategory;
use crate::state::FilterState;
use std::collections::BTreeSet;
use tracing::trace;

/// Visible subset of `items` under `state`, in input order.
///
/// Each predicate is an independent pass over the survivors of the previous
/// one. Categories combine with AND; subcategories inside a category with OR.
pub fn filter<'a>(
    items: &'a [Item],
    categories: &[FilterCategory],
    state: &FilterState,
) -> Vec<&'a Item> {
    let mut visible: Vec<&Item> = items.iter().collect();

    if state.available_only {
        visible.retain(|item| item.is_available());
        trace!(remaining = visible.len(), "availability pass");
    }

    if let Some(query) = state.search_query() {
        let needle = query.to_lowercase();
        visible.retain(|item| matches_search(item, &needle));
        trace!(remaining = visible.len(), query, "search pass");
    }

    for facet in active_facets(categories, state) {
        visible.retain(|item| facet.matches(item));
        trace!(remaining = visible.len(), category = facet.category_id, "facet pass");
    }

    visible
}

/// `needle` must already be lowercased.
pub(crate) fn matches_search(item: &Item, needle: &str) -> bool {
    item.title.to_lowercase().contains(needle)
        || item.description.to_lowercase().contains(needle)
        || item
            .hashtags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// One category with an effective selection: the union of the hashtags of
/// its selected subcategories.
struct ActiveFacet<'c> {
    category_id: &'c str,
    hashtags: BTreeSet<String>,
}

impl ActiveFacet<'_> {
    fn matches(&self, item: &Item) -> bool {
        item.hashtags
            .iter()
            .any(|tag| self.hashtags.contains(&tag.to_lowercase()))
    }
}

// Selections naming unknown subcategories are ignored, so a stale snapshot
// cannot hide the whole catalog; a category whose selections all fail to
// resolve is skipped.
fn active_facets<'c>(categories: &'c [FilterCategory], state: &FilterState) -> Vec<ActiveFacet<'c>> {
    let mut facets = Vec::new();
    for category in categories.iter().filter(|category| category.enabled) {
        let Some(selected) = state.selections(&category.id) else {
            continue;
        };
        let resolved: Vec<_> = selected
            .iter()
            .filter_map(|id| category.subcategory(id))
            .collect();
        if resolved.is_empty() {
            continue;
        }
        let hashtags = resolved
            .iter()
            .flat_map(|sub| sub.hashtags.iter())
            .map(|tag| tag.to_lowercase())
            .collect();
        facets.push(ActiveFacet {
            category_id: &category.id,
            hashtags,
        });
    }
    facets
}
