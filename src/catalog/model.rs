//! Deserializable representation of `wreaths.json`.
//!
//! The catalog file has been edited by several generations of admin tooling,
//! so the item schema drifted: `featured` arrived late, prices were sometimes
//! strings, dates were sometimes missing. Decoding here is lenient field by
//! field: a malformed value degrades to its documented default instead of
//! failing the whole catalog. Only the container shape (a JSON array of
//! objects) is enforced, via `schema/items.schema.json`.

use crate::catalog::identity::ItemId;
use crate::schema_loader::{CatalogSchema, validate_value};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One catalog listing.
///
/// Unknown top-level keys are kept in `extra` so a load/save cycle never
/// drops fields written by other tools.
pub struct Item {
    #[serde(default, deserialize_with = "lenient::item_id")]
    pub id: ItemId,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::price")]
    pub local_price: f64,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub sold: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub featured: bool,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub hashtags: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub images: Vec<String>,
    #[serde(default, deserialize_with = "lenient::platforms")]
    pub platforms: Platforms,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Marketplace listing URLs. Empty strings mean "not listed there".
pub struct Platforms {
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub poshmark: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub fb_marketplace: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub mercari: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub other: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Item {
    /// Parsed `dateAdded`, falling back to the legacy `created` key.
    ///
    /// Accepts a bare `YYYY-MM-DD` or a timestamp that starts with one.
    pub fn date_added(&self) -> Option<NaiveDate> {
        let raw = self
            .date_added
            .as_deref()
            .or_else(|| self.extra.get("created").and_then(Value::as_str))?;
        parse_date(raw)
    }

    /// First image, used as the card thumbnail.
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    pub fn has_hashtag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.hashtags
            .iter()
            .any(|candidate| candidate.to_lowercase() == wanted)
    }

    /// Not sold, and not switched off by a legacy `"available": false`.
    pub fn is_available(&self) -> bool {
        !self.sold && self.extra.get("available") != Some(&Value::Bool(false))
    }
}

impl Platforms {
    /// Non-empty listing URLs as `(marketplace, url)` pairs in display order.
    pub fn listings(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        let named = [
            ("poshmark", self.poshmark.as_deref()),
            ("fbMarketplace", self.fb_marketplace.as_deref()),
            ("mercari", self.mercari.as_deref()),
            ("other", self.other.as_deref()),
        ];
        for (name, url) in named {
            if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
                out.push((name, url));
            }
        }
        for (name, value) in &self.extra {
            if let Some(url) = value.as_str().filter(|u| !u.trim().is_empty()) {
                out.push((name.as_str(), url));
            }
        }
        out
    }
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, DATE_FORMAT).ok()
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse catalog JSON text into items.
///
/// Fails only when the document is not an array of objects; individual field
/// problems are absorbed by the lenient decoders.
pub fn parse_items(input: &str) -> Result<Vec<Item>> {
    let value: Value = serde_json::from_str(input).context("catalog is not valid JSON")?;
    items_from_value(value)
}

pub(crate) fn items_from_value(value: Value) -> Result<Vec<Item>> {
    validate_value(CatalogSchema::Items, &value).context("catalog has the wrong shape")?;

    let backfilled = value
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .filter(|entry| entry.get("featured").is_none())
                .count()
        })
        .unwrap_or_default();
    if backfilled > 0 {
        debug!(count = backfilled, "backfilled missing featured flags");
    }

    let items: Vec<Item> = serde_json::from_value(value).context("decoding catalog items")?;
    Ok(items)
}

/// Read and parse a catalog file without id validation.
pub fn load_items_from_path(path: &Path) -> Result<Vec<Item>> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse_items(&data).with_context(|| format!("loading {}", path.display()))
}

/// Field decoders that map malformed values to defaults.
mod lenient {
    use super::Platforms;
    use crate::catalog::identity::ItemId;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        })
    }

    pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    pub fn item_id<'de, D>(deserializer: D) -> Result<ItemId, D::Error>
    where
        D: Deserializer<'de>,
    {
        string(deserializer).map(ItemId)
    }

    pub fn price<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64().unwrap_or(0.0),
            Value::String(s) => price_from_text(&s),
            _ => 0.0,
        };
        Ok(sanitize_price(parsed))
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Bool(b) => b,
            Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        })
    }

    pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Array(entries) => entries
                .into_iter()
                .filter_map(|entry| match entry {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn platforms<'de, D>(deserializer: D) -> Result<Platforms, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::Object(mut map) => {
                // Older admin builds wrote the catch-all marketplace as `other1`.
                if !map.contains_key("other") {
                    if let Some(legacy) = map.remove("other1") {
                        map.insert("other".to_string(), legacy);
                    }
                }
                serde_json::from_value(Value::Object(map)).unwrap_or_default()
            }
            _ => Platforms::default(),
        })
    }

    /// First run of digits and dots, e.g. `"$45.00"` -> 45.0.
    pub(crate) fn price_from_text(text: &str) -> f64 {
        let start = match text.find(|c: char| c.is_ascii_digit() || c == '.') {
            Some(idx) => idx,
            None => return 0.0,
        };
        let rest = &text[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        rest[..end].parse().unwrap_or(0.0)
    }

    pub(crate) fn sanitize_price(value: f64) -> f64 {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            0.0
        }
    }
}

pub(crate) use lenient::price_from_text;
