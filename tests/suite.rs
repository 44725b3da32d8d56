// Integration suite for the catalog engine, loaders and the two binaries.
// Library behavior is checked directly; the binaries run against temp roots.
mod support;

use anyhow::{Context, Result};
use serde_json::{Value, json};
use std::collections::BTreeSet;
use std::fs;
use support::{
    bundled_data_dir, catalog_command, catalog_root, run_command, scenario_items, season_config,
    stdout_json, titles, write_json,
};
use wreath_catalog::engine::{filter, sort};
use wreath_catalog::{
    CatalogIndex, FilterConfig, FilterState, FilterStats, Item, SortKey, apply, apply_with_config,
    load_items_from_path, parse_items,
};

fn state_with_sort(sort: &str) -> FilterState {
    FilterState::new(sort)
}

// Featured items lead even when a non-featured item is newer.
#[test]
fn featured_sort_puts_featured_first() {
    let items = scenario_items();
    let visible = apply(&items, &[], &state_with_sort("featured"));
    assert_eq!(titles(&visible), ["Balsam Wreath", "Acorn Wreath"]);
}

#[test]
fn alphabetical_and_price_orderings() {
    let items = scenario_items();
    let by_name = apply(&items, &[], &state_with_sort("alphabetical-asc"));
    assert_eq!(titles(&by_name), ["Acorn Wreath", "Balsam Wreath"]);

    let by_price = apply(&items, &[], &state_with_sort("price-high"));
    assert_eq!(titles(&by_price), ["Acorn Wreath", "Balsam Wreath"]);

    let newest = apply(&items, &[], &state_with_sort("newest"));
    assert_eq!(titles(&newest), ["Acorn Wreath", "Balsam Wreath"]);
}

#[test]
fn winter_facet_selects_tagged_item() {
    let items = scenario_items();
    let config = season_config();
    let mut state = FilterState::default();
    let season = config.category("season").expect("season category");
    state.set_selected(season, "winter", true);
    let visible = apply_with_config(&items, &config, &state);
    assert_eq!(titles(&visible), ["Balsam Wreath"]);

    // OR inside a category, AND across categories.
    state.set_selected(season, "summer", true);
    assert_eq!(apply_with_config(&items, &config, &state).len(), 2);
    let mood = config.category("mood").expect("mood category");
    state.set_selected(mood, "cozy", true);
    assert_eq!(
        titles(&apply_with_config(&items, &config, &state)),
        ["Balsam Wreath"]
    );
}

#[test]
fn search_is_case_insensitive_substring() {
    let items = scenario_items();
    let mut state = FilterState::default();
    state.set_search("WREATH");
    assert_eq!(filter(&items, &[], &state).len(), 2);
    state.set_search("  acorn ");
    assert_eq!(titles(&filter(&items, &[], &state)), ["Acorn Wreath"]);
    state.set_search("xyz");
    assert!(filter(&items, &[], &state).is_empty());
}

fn varied_catalog() -> Vec<Item> {
    parse_items(
        &json!([
            {"id": "1", "title": "Pine Cone Wreath", "localPrice": 30, "sold": true, "hashtags": ["winter"]},
            {"id": "2", "title": "Daisy Hoop", "localPrice": 30, "featured": true, "hashtags": ["summer", "bright"]},
            {"id": "3", "title": "Holly Berry", "localPrice": "$30", "dateAdded": "2025-02-01", "hashtags": ["Winter", "cozy"]},
            {"id": "4", "title": "Plain Grapevine", "localPrice": null, "hashtags": []},
            {"id": "5", "title": "Snowy Door Wreath", "localPrice": 62, "sold": "TRUE", "hashtags": ["winter", "bright"]}
        ])
        .to_string(),
    )
    .expect("varied catalog parses")
}

fn sample_states() -> Vec<FilterState> {
    let config = season_config();
    let season = config.category("season").expect("season");
    let mood = config.category("mood").expect("mood");

    let mut states = vec![FilterState::default()];
    let mut available = FilterState::new("price-low");
    available.set_available_only(true);
    states.push(available);
    let mut winter = FilterState::new("alphabetical-desc");
    winter.set_selected(season, "winter", true);
    states.push(winter.clone());
    winter.set_selected(mood, "bright", true);
    winter.set_search("wreath");
    states.push(winter);
    let mut unknown = FilterState::new("mystery");
    unknown.select("nonexistent", "thing");
    states.push(unknown);
    states
}

// Results only ever reference input items, and the input is left untouched.
#[test]
fn filtering_never_fabricates_or_mutates() {
    let items = varied_catalog();
    let before = items.clone();
    let config = season_config();
    for state in sample_states() {
        let visible = apply_with_config(&items, &config, &state);
        for item in &visible {
            assert!(
                items.iter().any(|candidate| std::ptr::eq(candidate, *item)),
                "result {} is not an input item",
                item.id
            );
        }
        let ids: BTreeSet<_> = visible.iter().map(|item| item.id.clone()).collect();
        assert_eq!(ids.len(), visible.len(), "duplicate results for {state:?}");
    }
    assert_eq!(items, before);
}

// Running the same state over its own output changes nothing.
#[test]
fn apply_is_idempotent() {
    let items = varied_catalog();
    let config = season_config();
    for state in sample_states() {
        let first: Vec<Item> = apply_with_config(&items, &config, &state)
            .into_iter()
            .cloned()
            .collect();
        let second = apply_with_config(&first, &config, &state);
        let first_ids: Vec<_> = first.iter().map(|item| item.id.clone()).collect();
        let second_ids: Vec<_> = second.iter().map(|item| item.id.clone()).collect();
        assert_eq!(first_ids, second_ids, "not idempotent for {state:?}");
    }
}

#[test]
fn sort_keeps_input_order_for_ties() {
    let items = varied_catalog();
    let refs: Vec<&Item> = items.iter().collect();
    let cheapest: Vec<&str> = sort(&refs, &SortKey::PriceLow)
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    // "4" has no price and sorts as 0; 1, 2 and 3 share 30.
    assert_eq!(cheapest, ["4", "1", "2", "3", "5"]);

    let reversed: Vec<&Item> = refs.iter().rev().copied().collect();
    let tied: Vec<&str> = sort(&reversed, &SortKey::PriceHigh)
        .iter()
        .map(|item| item.id.as_str())
        .collect();
    assert_eq!(tied, ["5", "3", "2", "1", "4"]);
}

#[test]
fn neutral_state_keeps_every_item() {
    let items = varied_catalog();
    let visible = filter(&items, &season_config().categories, &FilterState::default());
    assert_eq!(visible.len(), items.len());
}

#[test]
fn availability_round_trip() {
    let mut items = scenario_items();
    let mut state = FilterState::default();
    state.set_available_only(true);
    assert_eq!(filter(&items, &[], &state).len(), 2);
    items[0].sold = true;
    assert_eq!(titles(&filter(&items, &[], &state)), ["Acorn Wreath"]);
    state.set_available_only(false);
    assert_eq!(filter(&items, &[], &state).len(), 2);
}

#[test]
fn config_declared_sort_uses_field_and_direction() {
    let items = scenario_items();
    let config = season_config();
    let visible = apply_with_config(&items, &config, &state_with_sort("cheapest"));
    assert_eq!(titles(&visible), ["Balsam Wreath", "Acorn Wreath"]);
    // Without the config the id is unknown and input order is kept.
    let plain = apply(&items, &config.categories, &state_with_sort("cheapest"));
    assert_eq!(titles(&plain), ["Balsam Wreath", "Acorn Wreath"]);
}

#[test]
fn stats_count_visible_and_featured() {
    let items = varied_catalog();
    let mut state = FilterState::default();
    state.set_available_only(true);
    let visible = apply(&items, &[], &state);
    let stats = FilterStats::collect(&items, &visible, &state);
    assert_eq!(stats.total_items, 5);
    assert_eq!(stats.visible_items, 3);
    assert_eq!(stats.featured_visible, 1);
    assert_eq!(stats.active_filter_count, 1);
    assert_eq!(stats.to_string(), "3 wreaths (1 featured)");
}

// The bundled sample data must stay loadable and consistent.
#[test]
fn bundled_data_is_valid() -> Result<()> {
    let dir = bundled_data_dir();
    let index = CatalogIndex::load(&dir.join("wreaths.json"))?;
    assert!(!index.is_empty());
    let config = FilterConfig::load(&dir.join("filter-config.json"))?;
    assert_eq!(config.default_sort_id(), "featured");

    let mut state = FilterState::new(config.default_sort_id());
    let season = config.category("season").context("season category")?;
    state.set_selected(season, "winter", true);
    let visible = apply_with_config(index.items(), &config, &state);
    assert!(!visible.is_empty());
    assert!(visible.iter().all(|item| item.has_hashtag("winter") || item.has_hashtag("christmas")));
    Ok(())
}

fn view_json(root: &std::path::Path, args: &[&str]) -> Result<Value> {
    let mut cmd = catalog_command("catalog-view");
    cmd.arg("--root").arg(root).arg("--json").args(args);
    stdout_json(&run_command(cmd)?)
}

fn item_titles(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

#[test]
fn view_cli_filters_and_sorts() -> Result<()> {
    let items: Vec<Value> = serde_json::from_str(&serde_json::to_string(&scenario_items())?)?;
    let root = catalog_root(&Value::Array(items))?;

    let featured = view_json(root.path(), &[])?;
    assert_eq!(item_titles(&featured), ["Balsam Wreath", "Acorn Wreath"]);

    let sorted = view_json(root.path(), &["--sort", "alphabetical-asc"])?;
    assert_eq!(item_titles(&sorted), ["Acorn Wreath", "Balsam Wreath"]);

    let winter = view_json(root.path(), &["--select", "season=winter"])?;
    assert_eq!(item_titles(&winter), ["Balsam Wreath"]);

    let report = view_json(root.path(), &["--search", "xyz", "--stats"])?;
    assert_eq!(report["stats"]["visibleItems"], 0);
    assert_eq!(report["stats"]["totalItems"], 2);
    assert_eq!(report["items"], json!([]));
    Ok(())
}

// --save-state persists selections; later runs start from them until --clear.
#[test]
fn view_cli_saves_and_restores_state() -> Result<()> {
    let items: Vec<Value> = serde_json::from_str(&serde_json::to_string(&scenario_items())?)?;
    let root = catalog_root(&Value::Array(items))?;

    let saved = view_json(
        root.path(),
        &["--search", "acorn", "--sort", "price-high", "--save-state"],
    )?;
    assert_eq!(item_titles(&saved), ["Acorn Wreath"]);

    let snapshot: Value =
        serde_json::from_str(&fs::read_to_string(root.path().join(".wreath-filters.json"))?)?;
    assert_eq!(snapshot["activeFilters"]["searchText"], "acorn");
    assert_eq!(snapshot["currentSort"], "price-high");

    let restored = view_json(root.path(), &[])?;
    assert_eq!(item_titles(&restored), ["Acorn Wreath"]);

    let cleared = view_json(root.path(), &["--clear"])?;
    assert_eq!(item_titles(&cleared), ["Acorn Wreath", "Balsam Wreath"]);
    Ok(())
}

#[test]
fn view_cli_reports_bad_catalog() -> Result<()> {
    let root = catalog_root(&json!({"not": "an array"}))?;
    let mut cmd = catalog_command("catalog-view");
    cmd.arg("--root").arg(root.path());
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wreaths.json"), "stderr: {stderr}");
    Ok(())
}

fn admin(root: &std::path::Path, args: &[&str]) -> Result<String> {
    let mut cmd = catalog_command("catalog-admin");
    cmd.arg("--root").arg(root).args(args);
    let output = run_command(cmd)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

// Import a captured listing plus a catalog export, then query the result.
#[test]
fn admin_import_then_view() -> Result<()> {
    let root = catalog_root(&json!([
        {"id": "keep", "title": "Existing Wreath", "localPrice": 20, "hashtags": ["summer"]},
        {"id": "w1", "title": "Old Title", "localPrice": 10, "hashtags": []}
    ]))?;
    let payload = root.path().join("import.ndjson");
    fs::write(
        &payload,
        concat!(
            "{\"url\":\"https://poshmark.com/listing/Snowflake-Wreath-abc123\",\"title\":\"Snowflake Wreath\",\"tags\":[\"Winter\",\"#Snow\"]}\n",
            "{\"id\":\"w1\",\"title\":\"Updated Title\",\"localPrice\":35,\"hashtags\":[\"winter\"]}\n",
            "{\"note\":\"ignored\"}\n"
        ),
    )?;

    let out = admin(root.path(), &["import", payload.to_str().context("utf-8 path")?])?;
    assert_eq!(out, "imported 1 new, updated 1");

    let summary: Value = serde_json::from_str(&admin(root.path(), &["summary", "--json"])?)?;
    assert_eq!(summary, json!({"total": 3, "available": 3, "featured": 0}));

    let stored = load_items_from_path(&root.path().join("wreaths.json"))?;
    assert_eq!(stored[0].id.as_str(), "abc123");
    assert_eq!(stored[0].hashtags, vec!["winter", "snow"]);
    assert_eq!(stored[2].title, "Updated Title");

    let winter = view_json(
        root.path(),
        &["--select", "season=winter", "--sort", "alphabetical-asc"],
    )?;
    assert_eq!(item_titles(&winter), ["Snowflake Wreath", "Updated Title"]);
    Ok(())
}

#[test]
fn admin_edits_round_trip_through_file() -> Result<()> {
    let root = catalog_root(&json!([]))?;
    let id = admin(
        root.path(),
        &[
            "add",
            "--title",
            "Magnolia Wreath",
            "--price",
            "65",
            "--hashtags",
            "spring, Farmhouse",
            "--image",
            "images/magnolia.jpg",
        ],
    )?;
    assert!(!id.is_empty());

    admin(root.path(), &["toggle-featured", &id])?;
    admin(root.path(), &["edit", &id, "--price", "70", "--sold", "true"])?;

    let stored = load_items_from_path(&root.path().join("wreaths.json"))?;
    assert_eq!(stored.len(), 1);
    let item = &stored[0];
    assert_eq!(item.title, "Magnolia Wreath");
    assert_eq!(item.local_price, 70.0);
    assert!(item.featured);
    assert!(item.sold);
    assert_eq!(item.hashtags, vec!["spring", "farmhouse"]);
    assert!(item.date_added().is_some());

    let exported = admin(root.path(), &["export"])?;
    let exported: Value = serde_json::from_str(&exported)?;
    assert_eq!(exported[0]["localPrice"], 70.0);

    let deleted = admin(root.path(), &["delete", &id])?;
    assert!(deleted.starts_with("deleted"));
    assert!(load_items_from_path(&root.path().join("wreaths.json"))?.is_empty());

    let mut unknown = catalog_command("catalog-admin");
    unknown.arg("--root").arg(root.path()).args(["toggle-sold", "missing"]);
    let output = unknown.output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no item with id missing"));
    Ok(())
}

#[test]
fn admin_rejects_duplicate_catalog() -> Result<()> {
    let root = catalog_root(&json!([
        {"id": "dup", "title": "One"},
        {"id": "dup", "title": "Two"}
    ]))?;
    let mut cmd = catalog_command("catalog-admin");
    cmd.arg("--root").arg(root.path()).arg("list");
    let output = cmd.output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate item id dup"));

    write_json(&root.path().join("wreaths.json"), &json!([{"id": "solo", "title": "Solo"}]))?;
    assert!(admin(root.path(), &["list"])?.starts_with("solo\tSolo"));
    Ok(())
}

fn titled(titles: &[&str]) -> Vec<Item> {
    titles
        .iter()
        .map(|title| Item {
            id: (*title).into(),
            title: (*title).to_string(),
            ..Item::default()
        })
        .collect()
}

// Accented initials collate with their base letter instead of after "z".
#[test]
fn alphabetical_sort_collates_accented_titles() {
    let items = titled(&["Zinnia Wreath", "Éclair Wreath", "Fern Wreath"]);
    let visible = apply(&items, &[], &state_with_sort("alphabetical-asc"));
    assert_eq!(titles(&visible), ["Éclair Wreath", "Fern Wreath", "Zinnia Wreath"]);

    // Older storefront ids resolve to the same orderings.
    let legacy = apply(&items, &[], &state_with_sort("alphabetical-az"));
    assert_eq!(titles(&legacy), titles(&visible));
    let reversed = apply(&items, &[], &state_with_sort("alphabetical-za"));
    assert_eq!(titles(&reversed), ["Zinnia Wreath", "Fern Wreath", "Éclair Wreath"]);
}

#[test]
fn hashtag_sort_option_puts_tagged_items_first() -> Result<()> {
    let mut items = titled(&["A", "B", "C"]);
    items[1].hashtags = vec!["Holiday".into()];
    let config = FilterConfig::from_value(json!({"sortOptions": [
        {"id": "featured", "default": true},
        {"id": "holiday-first", "field": "hashtags", "value": "holiday", "direction": "desc"}
    ]}))?;
    let visible = apply_with_config(&items, &config, &state_with_sort("holiday-first"));
    assert_eq!(titles(&visible), ["B", "A", "C"]);
    Ok(())
}
