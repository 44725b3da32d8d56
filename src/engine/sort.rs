//! Orderings over the visible list. Every sort is stable and works on a copy.

use crate::catalog::{Item, SortKey};
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Reorder `items` by `key`. Unknown keys return the input order unchanged.
pub fn sort<'a>(items: &[&'a Item], key: &SortKey) -> Vec<&'a Item> {
    match key {
        SortKey::Featured => sort_decorated(
            items,
            |item| (item.featured, item.date_added()),
            |a, b| b.0.cmp(&a.0).then_with(|| b.1.cmp(&a.1)),
        ),
        SortKey::AlphabeticalAsc => sort_decorated(
            items,
            |item| title_sort_key(&item.title),
            |a, b| a.cmp(b),
        ),
        SortKey::AlphabeticalDesc => sort_decorated(
            items,
            |item| title_sort_key(&item.title),
            |a, b| b.cmp(a),
        ),
        SortKey::PriceLow => sort_decorated(
            items,
            |item| item.local_price,
            |a, b| a.total_cmp(b),
        ),
        SortKey::PriceHigh => sort_decorated(
            items,
            |item| item.local_price,
            |a, b| b.total_cmp(a),
        ),
        // `None < Some`, so descending puts undated items last.
        SortKey::Newest => sort_decorated(items, Item::date_added, |a, b| b.cmp(a)),
        SortKey::TagFirst(tag) => sort_decorated(
            items,
            |item| item.has_hashtag(tag),
            |a, b| b.cmp(a),
        ),
        SortKey::TagLast(tag) => sort_decorated(
            items,
            |item| item.has_hashtag(tag),
            |a, b| a.cmp(b),
        ),
        SortKey::Other(_) => items.to_vec(),
    }
}

/// Compute each key once, then stable-sort on the keys.
fn sort_decorated<'a, K>(
    items: &[&'a Item],
    key: impl Fn(&Item) -> K,
    compare: impl Fn(&K, &K) -> Ordering,
) -> Vec<&'a Item> {
    let mut decorated: Vec<(K, &'a Item)> = items.iter().map(|item| (key(item), *item)).collect();
    decorated.sort_by(|a, b| compare(&a.0, &b.0));
    decorated.into_iter().map(|(_, item)| item).collect()
}

/// Collation key for titles.
///
/// Compares case-insensitively with accents ignored first (`Éclair` sorts
/// with the `e`s), then with accents as a tie-break so `Eclair` precedes
/// `Éclair`.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct TitleSortKey {
    base: String,
    accented: String,
}

impl TitleSortKey {
    /// Lowercased title with accents removed.
    pub fn base(&self) -> &str {
        &self.base
    }
}

/// Leading whitespace, punctuation and quote marks are dropped from the key.
/// Display titles are untouched.
pub fn title_sort_key(title: &str) -> TitleSortKey {
    let trimmed = title
        .trim_start_matches(|c: char| c.is_whitespace() || is_leading_noise(c))
        .trim();
    let accented: String = trimmed.nfd().flat_map(char::to_lowercase).collect();
    let base = accented
        .chars()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    TitleSortKey { base, accented }
}

fn is_leading_noise(c: char) -> bool {
    c.is_ascii_punctuation() || matches!(c, '“' | '”' | '‘' | '’' | '«' | '»' | '„')
}
