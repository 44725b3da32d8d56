//! Storefront query tool.
//!
//! Loads the catalog and filter config, applies the requested search, facet
//! and sort selections on top of the saved filter state, and prints the
//! visible wreaths in display order. `--save-state` writes the resulting
//! selections back so the next run starts from them.

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;
use wreath_catalog::settings::{CatalogPaths, PathOverrides};
use wreath_catalog::{
    FilterConfig, FilterState, FilterStats, Item, SortKey, apply_with_config,
    load_items_from_path, logging,
};

/// Filter and sort the wreath catalog
#[derive(Parser)]
#[command(name = "catalog-view", version, about = "Filter and sort the wreath catalog")]
struct Cli {
    /// Directory holding wreaths.json and filter-config.json
    #[arg(long)]
    root: Option<PathBuf>,

    /// Catalog file (default: <root>/wreaths.json)
    #[arg(long)]
    items: Option<PathBuf>,

    /// Filter config file (default: <root>/filter-config.json)
    #[arg(long)]
    filters: Option<PathBuf>,

    /// Saved filter state (default: <root>/.wreath-filters.json)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Case-insensitive text matched against title, description and hashtags
    #[arg(long)]
    search: Option<String>,

    /// Hide sold wreaths
    #[arg(long)]
    available_only: bool,

    /// Facet selection as CATEGORY=SUBCATEGORY; repeatable
    #[arg(long = "select", value_name = "CATEGORY=SUB")]
    select: Vec<String>,

    /// Sort option id (featured, alphabetical-asc, price-low, newest, ...)
    #[arg(long)]
    sort: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Print result counts
    #[arg(long)]
    stats: bool,

    /// Persist the resulting filter state
    #[arg(long)]
    save_state: bool,

    /// Start from cleared filters instead of the saved ones
    #[arg(long)]
    clear: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    stats: &'a FilterStats,
    items: &'a [&'a Item],
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let paths = CatalogPaths::resolve(PathOverrides {
        root: cli.root.clone(),
        items: cli.items.clone(),
        filters: cli.filters.clone(),
        state: cli.state.clone(),
    })?;
    let items = load_items_from_path(&paths.items)?;
    let config = FilterConfig::load_or_default(&paths.filters)?;

    let default_sort = config.default_sort_id();
    let mut state = FilterState::restore_snapshot(&paths.state, &default_sort);
    if cli.clear {
        state.clear_filters();
    }
    apply_flags(&cli, &config, &mut state)?;

    let visible = apply_with_config(&items, &config, &state);
    let stats = FilterStats::collect(&items, &visible, &state);

    if cli.json {
        let rendered = if cli.stats {
            serde_json::to_string_pretty(&JsonReport {
                stats: &stats,
                items: &visible,
            })
        } else {
            serde_json::to_string_pretty(&visible)
        };
        let rendered = rendered.context("serializing results")?;
        println!("{rendered}");
    } else {
        for item in &visible {
            println!("{}", render_row(item));
        }
        if cli.stats {
            println!("{stats}");
        }
    }

    if cli.save_state {
        state.save_snapshot(&paths.state)?;
    }
    Ok(())
}

fn apply_flags(cli: &Cli, config: &FilterConfig, state: &mut FilterState) -> Result<()> {
    if let Some(search) = &cli.search {
        state.set_search(search.as_str());
    }
    if cli.available_only {
        state.set_available_only(true);
    }
    for raw in &cli.select {
        let Some((category_id, sub_id)) = raw.split_once('=') else {
            bail!("--select expects CATEGORY=SUBCATEGORY, got '{raw}'");
        };
        let (category_id, sub_id) = (category_id.trim(), sub_id.trim());
        match config.category(category_id) {
            Some(category) => {
                if category.subcategory(sub_id).is_none() {
                    warn!(category = category_id, subcategory = sub_id, "unknown subcategory; selection has no effect");
                }
                state.set_selected(category, sub_id, true);
            }
            None => {
                warn!(category = category_id, "unknown filter category; selection has no effect");
                state.select(category_id, sub_id);
            }
        }
    }
    if let Some(sort) = &cli.sort {
        if config.sort_option(sort).is_none() && !SortKey::from_id(sort).is_known() {
            warn!(sort = %sort, "unknown sort option; keeping catalog order");
        }
        state.set_sort(sort.as_str());
    }
    Ok(())
}

fn render_row(item: &Item) -> String {
    let mut flags = Vec::new();
    if item.featured {
        flags.push("featured");
    }
    if item.sold {
        flags.push("sold");
    }
    format!(
        "{}\t{}\t${:.2}\t{}",
        item.id,
        item.title,
        item.local_price,
        flags.join(",")
    )
}
