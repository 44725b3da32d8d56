use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stable identifier for a catalog item.
///
/// Assigned once when the item enters the catalog and never rewritten; the
/// storefront, admin edits and imports all key on it.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Fresh random id for items that arrive without one.
    pub fn generate() -> Self {
        ItemId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        ItemId(value.to_string())
    }
}

/// Selectable ordering of the visible item list.
///
/// Known variants carry the ordering rules; `Other` keeps unrecognized ids
/// from saved state or config so they round-trip and sort as identity.
/// `TagFirst`/`TagLast` only come from config options sorting on a hashtag
/// and have no id of their own.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum SortKey {
    #[default]
    Featured,
    AlphabeticalAsc,
    AlphabeticalDesc,
    PriceLow,
    PriceHigh,
    Newest,
    TagFirst(String),
    TagLast(String),
    Other(String),
}

impl Serialize for SortKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(Self::from_id(&value))
    }
}

impl SortKey {
    pub fn as_str(&self) -> &str {
        match self {
            SortKey::Featured => "featured",
            SortKey::AlphabeticalAsc => "alphabetical-asc",
            SortKey::AlphabeticalDesc => "alphabetical-desc",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
            SortKey::Newest => "newest",
            SortKey::TagFirst(_) | SortKey::TagLast(_) => "hashtags",
            SortKey::Other(value) => value.as_str(),
        }
    }

    /// Parse a sort id. The storefront's short ids (`az`, `za`) are accepted.
    pub fn from_id(value: &str) -> Self {
        match value.trim() {
            "featured" => SortKey::Featured,
            "alphabetical-asc" | "alphabetical-az" | "alphabetical" | "az" | "a-z" => {
                SortKey::AlphabeticalAsc
            }
            "alphabetical-desc" | "alphabetical-za" | "za" | "z-a" => SortKey::AlphabeticalDesc,
            "price-low" | "price-asc" => SortKey::PriceLow,
            "price-high" | "price-desc" => SortKey::PriceHigh,
            "newest" | "date-desc" => SortKey::Newest,
            other => SortKey::Other(other.to_string()),
        }
    }

    /// Derive an ordering from a config's `field` + `direction` pair.
    pub fn from_field(field: &str, direction: SortDirection) -> Option<Self> {
        let key = match (field, direction) {
            ("title", SortDirection::Asc) => SortKey::AlphabeticalAsc,
            ("title", SortDirection::Desc) => SortKey::AlphabeticalDesc,
            ("localPrice" | "price", SortDirection::Asc) => SortKey::PriceLow,
            ("localPrice" | "price", SortDirection::Desc) => SortKey::PriceHigh,
            ("dateAdded", _) => SortKey::Newest,
            ("featured", _) => SortKey::Featured,
            _ => return None,
        };
        Some(key)
    }

    /// Ordering on whether an item carries `tag`: descending puts tagged
    /// items first. A blank tag gives `None`.
    pub fn from_tag(tag: &str, direction: SortDirection) -> Option<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return None;
        }
        Some(match direction {
            SortDirection::Desc => SortKey::TagFirst(tag.to_string()),
            SortDirection::Asc => SortKey::TagLast(tag.to_string()),
        })
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SortKey::Other(_))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}
