#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use wreath_catalog::{FilterConfig, Item, parse_items};

pub fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn bundled_data_dir() -> PathBuf {
    repo_root().join("data")
}

/// Command for one of the crate's binaries, isolated from the caller's
/// catalog and logging environment.
pub fn catalog_command(name: &str) -> Command {
    let path = match name {
        "catalog-view" => env!("CARGO_BIN_EXE_catalog-view"),
        "catalog-admin" => env!("CARGO_BIN_EXE_catalog-admin"),
        other => panic!("unknown binary {other}"),
    };
    let mut cmd = Command::new(path);
    cmd.env_remove("WREATH_CATALOG_ROOT")
        .env_remove("WREATH_CATALOG_LOG")
        .env_remove("RUST_LOG");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

pub fn stdout_json(output: &Output) -> Result<Value> {
    serde_json::from_slice(&output.stdout).context("command stdout is not JSON")
}

/// The two-item catalog used by the ordering scenarios.
pub fn scenario_items() -> Vec<Item> {
    parse_items(
        &json!([
            {"id": "balsam", "title": "Balsam Wreath", "localPrice": 40, "sold": false,
             "featured": true, "dateAdded": "2024-01-01", "hashtags": ["winter", "cozy"]},
            {"id": "acorn", "title": "Acorn Wreath", "localPrice": 55, "sold": false,
             "featured": false, "dateAdded": "2025-01-01", "hashtags": ["summer"]}
        ])
        .to_string(),
    )
    .expect("scenario catalog parses")
}

pub fn season_config() -> FilterConfig {
    FilterConfig::from_value(season_config_json()).expect("season config parses")
}

pub fn season_config_json() -> Value {
    json!({
        "categories": [
            {"id": "season", "name": "Season", "type": "checkbox", "subcategories": [
                {"id": "winter", "name": "Winter", "hashtags": ["winter"]},
                {"id": "summer", "name": "Summer", "hashtags": ["summer"]}
            ]},
            {"id": "mood", "name": "Mood", "type": "radio", "subcategories": [
                {"id": "cozy", "name": "Cozy", "hashtags": ["cozy"]},
                {"id": "bright", "name": "Bright", "hashtags": ["bright"]}
            ]}
        ],
        "sortOptions": [
            {"id": "featured", "label": "Featured", "default": true},
            {"id": "alphabetical-asc", "label": "A-Z"},
            {"id": "price-high", "label": "Price high"},
            {"id": "cheapest", "label": "Cheapest", "field": "localPrice", "direction": "asc"}
        ]
    })
}

/// Temp catalog root holding `items` and the season config.
pub fn catalog_root(items: &Value) -> Result<TempDir> {
    let dir = tempfile::tempdir().context("allocating catalog dir")?;
    write_json(&dir.path().join("wreaths.json"), items)?;
    write_json(&dir.path().join("filter-config.json"), &season_config_json())?;
    Ok(dir)
}

pub fn write_json(path: &Path, value: &Value) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

pub fn titles(items: &[&Item]) -> Vec<String> {
    items.iter().map(|item| item.title.clone()).collect()
}
