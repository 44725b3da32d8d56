//! Locating the catalog files.
//!
//! A catalog root is any directory holding `wreaths.json`. The binaries find
//! it from, in order: an explicit `--root`, the `WREATH_CATALOG_ROOT`
//! environment variable, the current directory and its ancestors, and
//! finally the bundled `data/` directory recorded by the build script.
//! Individual files can still be overridden one by one.

use anyhow::{Result, bail};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ITEMS_FILE: &str = "wreaths.json";
pub const FILTER_CONFIG_FILE: &str = "filter-config.json";
pub const STATE_FILE: &str = ".wreath-filters.json";
pub const ROOT_ENV: &str = "WREATH_CATALOG_ROOT";

/// Caller-supplied overrides, usually straight from CLI flags.
#[derive(Clone, Debug, Default)]
pub struct PathOverrides {
    pub root: Option<PathBuf>,
    pub items: Option<PathBuf>,
    pub filters: Option<PathBuf>,
    pub state: Option<PathBuf>,
}

/// Resolved locations of everything the tools read or write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogPaths {
    pub root: PathBuf,
    pub items: PathBuf,
    pub filters: PathBuf,
    pub state: PathBuf,
}

impl CatalogPaths {
    /// Resolve paths using the process environment and working directory.
    pub fn resolve(overrides: PathOverrides) -> Result<Self> {
        let env_root = env::var(ROOT_ENV).ok();
        let cwd = env::current_dir().ok();
        Self::resolve_with(
            overrides,
            env_root.as_deref(),
            cwd.as_deref(),
            option_env!("WREATH_CATALOG_ROOT_HINT"),
        )
    }

    /// Resolution with every environmental input passed in.
    pub fn resolve_with(
        overrides: PathOverrides,
        env_root: Option<&str>,
        cwd: Option<&Path>,
        build_hint: Option<&str>,
    ) -> Result<Self> {
        let root = match (&overrides.root, &overrides.items) {
            (Some(root), _) => {
                if !root.is_dir() {
                    bail!("catalog root {} is not a directory", root.display());
                }
                root.clone()
            }
            (None, Some(items)) => items
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
            (None, None) => match find_catalog_root(env_root, cwd, build_hint) {
                Some(root) => root,
                None => bail!(
                    "Unable to locate a wreath catalog ({ITEMS_FILE}). Pass --root or set {ROOT_ENV}."
                ),
            },
        };
        debug!(root = %root.display(), "catalog root resolved");

        let items = overrides.items.unwrap_or_else(|| root.join(ITEMS_FILE));
        let filters = overrides
            .filters
            .unwrap_or_else(|| default_filter_config_path(&root));
        let state = overrides.state.unwrap_or_else(|| root.join(STATE_FILE));
        Ok(Self {
            root,
            items,
            filters,
            state,
        })
    }
}

/// `filter-config.json` beside the catalog, else `config/filter-config.json`.
/// When neither exists the first location is returned.
fn default_filter_config_path(root: &Path) -> PathBuf {
    let beside = root.join(FILTER_CONFIG_FILE);
    if beside.is_file() {
        return beside;
    }
    let nested = root.join("config").join(FILTER_CONFIG_FILE);
    if nested.is_file() {
        return nested;
    }
    beside
}

fn is_catalog_root(candidate: &Path) -> bool {
    candidate.join(ITEMS_FILE).is_file()
}

/// Accepts a hint only when it names an existing catalog root.
fn root_from_hint(hint: &str) -> Option<PathBuf> {
    if hint.trim().is_empty() {
        return None;
    }
    let hint_path = PathBuf::from(hint);
    if !is_catalog_root(&hint_path) {
        return None;
    }
    fs::canonicalize(hint_path).ok()
}

fn search_upwards(start: &Path) -> Option<PathBuf> {
    let mut dir = fs::canonicalize(start).ok()?;
    loop {
        if is_catalog_root(&dir) {
            return Some(dir);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

pub fn find_catalog_root(
    env_root: Option<&str>,
    cwd: Option<&Path>,
    build_hint: Option<&str>,
) -> Option<PathBuf> {
    env_root
        .and_then(root_from_hint)
        .or_else(|| cwd.and_then(search_upwards))
        .or_else(|| build_hint.and_then(root_from_hint))
}
