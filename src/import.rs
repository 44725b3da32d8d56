//! Bringing outside records into the catalog.
//!
//! Two kinds of input arrive at the admin import: catalog items exported from
//! another copy of the site, and listing records captured from a marketplace
//! page by the browser extension. Payloads may be a JSON array, a single
//! object, or NDJSON. Listing records are normalized into [`Item`]s here; the
//! capture itself is not this crate's concern.

use crate::catalog::model::{format_date, price_from_text};
use crate::catalog::{Item, ItemId, Platforms};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

const IMPORTED_TITLE: &str = "Imported Wreath";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Listing as captured from a marketplace page. Only the fields the catalog
/// uses are decoded; seller and engagement stats are ignored.
pub struct ListingRecord {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

/// Convert a captured listing into a catalog item.
///
/// The id is the listing URL's final `-` segment (marketplace listing ids
/// sit there); without a URL the id is left empty for the repository to
/// assign. Local price starts at 0 because pickup pricing is set by hand;
/// the marketplace asking price is kept as `listingPrice` for reference.
pub fn convert_listing(record: ListingRecord, today: NaiveDate) -> Item {
    let url = record
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty());
    let id = url.as_deref().map(listing_id_from_url).unwrap_or_default();
    let title = record
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| IMPORTED_TITLE.to_string());

    let mut hashtags: Vec<String> = Vec::new();
    for tag in record.tags.unwrap_or_default() {
        if let Some(tag) = normalize_hashtag(&tag) {
            if !hashtags.contains(&tag) {
                hashtags.push(tag);
            }
        }
    }

    let mut extra = BTreeMap::new();
    if let Some(price) = record.price.as_ref().map(listing_price).filter(|p| *p > 0.0) {
        extra.insert("listingPrice".to_string(), Value::from(price));
    }

    Item {
        id,
        title,
        description: record.description.unwrap_or_default(),
        local_price: 0.0,
        sold: false,
        featured: false,
        date_added: Some(format_date(today)),
        hashtags,
        images: record.images.unwrap_or_default(),
        platforms: Platforms {
            poshmark: Some(url.unwrap_or_default()),
            fb_marketplace: Some(String::new()),
            mercari: Some(String::new()),
            other: Some(String::new()),
            ..Platforms::default()
        },
        extra,
        ..Item::default()
    }
}

fn listing_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => price_from_text(s),
        _ => 0.0,
    }
}

fn listing_id_from_url(url: &str) -> ItemId {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.trim_end_matches('/').rsplit('-').next().unwrap_or_default();
    let last = last.rsplit('/').next().unwrap_or(last);
    ItemId(last.to_string())
}

/// Hashtags are lowercase ASCII alphanumerics: `"#Farm House!"` ->
/// `"farmhouse"`. Returns `None` when nothing survives.
pub fn normalize_hashtag(raw: &str) -> Option<String> {
    let tag: String = raw
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();
    (!tag.is_empty()).then_some(tag)
}

/// Split comma- or whitespace-delimited tag input (the admin form's hashtag
/// box) into normalized hashtags, keeping first occurrences.
pub fn split_hashtags(value: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in value.replace(',', " ").split_whitespace() {
        if let Some(tag) = normalize_hashtag(token) {
            if !out.contains(&tag) {
                out.push(tag);
            }
        }
    }
    out
}

/// Parse an import payload, accepting a JSON array, a single object, or
/// NDJSON. Empty input is an error; NDJSON lines are parsed one by one so the
/// error names the offending line.
pub fn parse_import_payload(input: &str) -> Result<Vec<Value>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        bail!("No import data provided");
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return match value {
            Value::Array(entries) => Ok(entries),
            Value::Object(_) => Ok(vec![value]),
            _ => bail!("Unsupported JSON input; expected object or array"),
        };
    }

    let mut records = Vec::new();
    for (idx, line) in trimmed.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .with_context(|| format!("Unable to parse import record from line {}", idx + 1))?;
        records.push(value);
    }

    if records.is_empty() {
        bail!("No import records found in input");
    }
    Ok(records)
}

/// Turn one payload record into an item, or `None` (logged) when it is
/// neither a catalog item nor a captured listing.
pub fn decode_import_record(value: Value, today: NaiveDate) -> Option<Item> {
    let Value::Object(map) = &value else {
        warn!("skipping non-object import record");
        return None;
    };

    let looks_like_listing = !map.contains_key("hashtags")
        && (map.contains_key("url") || map.contains_key("tags"));
    if looks_like_listing {
        return match serde_json::from_value::<ListingRecord>(value) {
            Ok(record) => Some(convert_listing(record, today)),
            Err(err) => {
                warn!(error = %err, "skipping malformed listing record");
                None
            }
        };
    }

    if map.contains_key("title") {
        return match serde_json::from_value::<Item>(value) {
            Ok(item) => Some(item),
            Err(err) => {
                warn!(error = %err, "skipping malformed catalog record");
                None
            }
        };
    }

    warn!("skipping import record with neither a title nor a listing url");
    None
}

/// Parse a payload and decode every usable record.
pub fn import_items(input: &str, today: NaiveDate) -> Result<Vec<Item>> {
    Ok(parse_import_payload(input)?
        .into_iter()
        .filter_map(|value| decode_import_record(value, today))
        .collect())
}
