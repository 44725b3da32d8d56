//! Storefront facet and sort configuration (`filter-config.json`).
//!
//! Two on-disk shapes exist: the current `{ categories, sortOptions }` object
//! and an older bare array of categories that carried names but no ids. Both
//! decode into [`FilterConfig`]; missing ids are derived from names and a
//! missing sort list falls back to the built-in orderings.

use crate::catalog::identity::{SortDirection, SortKey};
use crate::schema_loader::{CatalogSchema, validate_value};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Facet groups plus the selectable sort orderings.
pub struct FilterConfig {
    pub categories: Vec<FilterCategory>,
    pub sort_options: Vec<SortOption>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A named facet group; its subcategories combine with OR.
pub struct FilterCategory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default, rename = "type")]
    pub kind: SelectionKind,
    #[serde(default, alias = "options")]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// One selectable facet option backed by one or more hashtags.
pub struct Subcategory {
    #[serde(default)]
    pub id: String,
    #[serde(default, alias = "label")]
    pub name: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Whether a category allows several selections or exactly one.
pub enum SelectionKind {
    #[default]
    Checkbox,
    Radio,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// A selectable ordering as declared in the config.
pub struct SortOption {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Hashtag for `field: "hashtags"` options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
    #[serde(default)]
    pub default: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawConfig {
    Full {
        #[serde(default)]
        categories: Vec<FilterCategory>,
        #[serde(default, rename = "sortOptions")]
        sort_options: Vec<SortOption>,
    },
    Legacy(Vec<FilterCategory>),
}

fn enabled_by_default() -> bool {
    true
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            sort_options: builtin_sort_options(),
        }
    }
}

impl FilterCategory {
    pub fn subcategory(&self, id: &str) -> Option<&Subcategory> {
        self.subcategories.iter().find(|sub| sub.id == id)
    }
}

impl SortOption {
    /// Ordering this option selects.
    ///
    /// The id wins when it names a known ordering. Otherwise a `hashtags`
    /// field with a `value` orders on that tag, and other fields use the
    /// declared `field` + `direction`; anything else sorts as identity.
    pub fn sort_key(&self) -> SortKey {
        let by_id = SortKey::from_id(&self.id);
        if by_id.is_known() {
            return by_id;
        }
        let declared = match (self.field.as_deref(), self.value.as_deref()) {
            (Some("hashtags"), Some(tag)) => SortKey::from_tag(tag, self.direction),
            (Some(field), _) => SortKey::from_field(field, self.direction),
            (None, _) => None,
        };
        declared.unwrap_or(by_id)
    }
}

impl FilterConfig {
    /// Parse config JSON text (either supported shape) and validate it.
    pub fn parse(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input).context("filter config is not valid JSON")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        validate_value(CatalogSchema::FilterConfig, &value)?;
        let raw: RawConfig = serde_json::from_value(value).context("decoding filter config")?;
        let (categories, sort_options) = match raw {
            RawConfig::Full {
                categories,
                sort_options,
            } => (categories, sort_options),
            RawConfig::Legacy(categories) => {
                debug!("filter config uses the legacy category-array shape");
                (categories, Vec::new())
            }
        };
        let mut config = Self {
            categories,
            sort_options,
        };
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("loading {}", path.display()))
    }

    /// Like [`FilterConfig::load`], but a missing file yields the default
    /// config (no facets, built-in sorts) instead of an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(path = %path.display(), "filter config not found; facets disabled");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn category(&self, id: &str) -> Option<&FilterCategory> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn sort_option(&self, id: &str) -> Option<&SortOption> {
        self.sort_options.iter().find(|option| option.id == id)
    }

    /// Id of the option marked `default`, else the first option, else
    /// `featured`.
    pub fn default_sort_id(&self) -> String {
        self.sort_options
            .iter()
            .find(|option| option.default)
            .or_else(|| self.sort_options.first())
            .map(|option| option.id.clone())
            .unwrap_or_else(|| SortKey::Featured.as_str().to_string())
    }

    /// Resolve a sort id through the configured options, falling back to the
    /// built-in id parsing for ids the config does not declare.
    pub fn resolve_sort(&self, id: &str) -> SortKey {
        match self.sort_option(id) {
            Some(option) => option.sort_key(),
            None => SortKey::from_id(id),
        }
    }

    fn normalize(&mut self) {
        if self.sort_options.is_empty() {
            self.sort_options = builtin_sort_options();
        }
        for category in &mut self.categories {
            if category.id.trim().is_empty() {
                category.id = slugify(&category.name);
            }
            if category.name.trim().is_empty() {
                category.name = category.id.clone();
            }
            for sub in &mut category.subcategories {
                if sub.id.trim().is_empty() {
                    sub.id = slugify(&sub.name);
                }
                if sub.name.trim().is_empty() {
                    sub.name = sub.id.clone();
                }
                for tag in &mut sub.hashtags {
                    *tag = tag.trim().to_lowercase();
                }
                sub.hashtags.retain(|tag| !tag.is_empty());
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut category_ids = BTreeSet::new();
        for category in &self.categories {
            if category.id.is_empty() {
                bail!("filter category must have an id or a name");
            }
            if !category_ids.insert(category.id.as_str()) {
                bail!("duplicate filter category id '{}'", category.id);
            }
            let mut sub_ids = BTreeSet::new();
            for sub in &category.subcategories {
                if sub.id.is_empty() {
                    bail!("category '{}' has a subcategory with no id or name", category.id);
                }
                if !sub_ids.insert(sub.id.as_str()) {
                    bail!(
                        "category '{}' declares subcategory '{}' twice",
                        category.id,
                        sub.id
                    );
                }
                if sub.hashtags.is_empty() {
                    warn!(category = %category.id, subcategory = %sub.id, "subcategory has no hashtags and can never match");
                }
            }
        }

        let mut sort_ids = BTreeSet::new();
        for option in &self.sort_options {
            if !sort_ids.insert(option.id.as_str()) {
                bail!("duplicate sort option id '{}'", option.id);
            }
        }
        let defaults = self.sort_options.iter().filter(|o| o.default).count();
        if defaults > 1 {
            bail!("sortOptions declares {defaults} defaults; exactly one is allowed");
        }
        if defaults == 0 {
            warn!(
                sort = %self.default_sort_id(),
                "no sort option is marked default; using the first"
            );
        }
        Ok(())
    }
}

/// The orderings the storefront offers when the config declares none.
pub fn builtin_sort_options() -> Vec<SortOption> {
    let option = |key: SortKey, label: &str, field: &str, direction: SortDirection| SortOption {
        id: key.as_str().to_string(),
        label: label.to_string(),
        field: Some(field.to_string()),
        value: None,
        direction,
        default: key == SortKey::Featured,
    };
    vec![
        option(SortKey::Featured, "Featured", "featured", SortDirection::Desc),
        option(SortKey::AlphabeticalAsc, "Name: A to Z", "title", SortDirection::Asc),
        option(SortKey::AlphabeticalDesc, "Name: Z to A", "title", SortDirection::Desc),
        option(SortKey::PriceLow, "Price: Low to High", "localPrice", SortDirection::Asc),
        option(SortKey::PriceHigh, "Price: High to Low", "localPrice", SortDirection::Desc),
        option(SortKey::Newest, "Newest", "dateAdded", SortDirection::Desc),
    ]
}

/// `"Door Decor"` -> `"door-decor"`.
pub(crate) fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
