//! Catalog editing tool.
//!
//! Command-line counterpart of the admin panel: add, edit, delete and flag
//! wreaths, import captured listings or another catalog export, and export
//! the catalog. Every mutating command saves `wreaths.json` atomically before
//! returning.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::info;
use wreath_catalog::import::{import_items, split_hashtags};
use wreath_catalog::settings::{CatalogPaths, PathOverrides};
use wreath_catalog::{Item, ItemId, ItemRepository, Upsert, logging, today};

/// Edit the wreath catalog
#[derive(Parser)]
#[command(name = "catalog-admin", version, about = "Edit the wreath catalog")]
struct Cli {
    /// Directory holding wreaths.json
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Catalog file (default: <root>/wreaths.json)
    #[arg(long, global = true)]
    items: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a wreath; prints the new id
    Add {
        /// Use this id instead of generating one
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Change fields of an existing wreath
    Edit {
        id: String,

        #[command(flatten)]
        fields: ItemFields,
    },

    /// Remove a wreath
    Delete { id: String },

    /// Flip the sold flag
    ToggleSold { id: String },

    /// Flip the featured flag
    ToggleFeatured { id: String },

    /// Import catalog items or captured listings (JSON array, object or NDJSON)
    Import {
        /// Input file; reads stdin when omitted or "-"
        file: Option<PathBuf>,
    },

    /// Write the catalog as pretty JSON
    Export {
        /// Output file; prints to stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show total, available and featured counts
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// List wreaths in catalog order
    List,
}

#[derive(Args)]
struct ItemFields {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Local pickup price
    #[arg(long)]
    price: Option<f64>,

    /// Comma- or space-separated hashtags; replaces the existing list
    #[arg(long)]
    hashtags: Option<String>,

    /// Image URL; repeatable, replaces the existing list
    #[arg(long = "image")]
    images: Vec<String>,

    #[arg(long)]
    featured: Option<bool>,

    #[arg(long)]
    sold: Option<bool>,

    #[arg(long)]
    poshmark: Option<String>,

    #[arg(long)]
    fb_marketplace: Option<String>,

    #[arg(long)]
    mercari: Option<String>,

    #[arg(long)]
    other: Option<String>,
}

impl ItemFields {
    fn apply(self, item: &mut Item) -> Result<()> {
        if let Some(title) = self.title {
            let title = title.trim();
            if title.is_empty() {
                bail!("title cannot be empty");
            }
            item.title = title.to_string();
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                bail!("price must be a non-negative number, got {price}");
            }
            item.local_price = price;
        }
        if let Some(hashtags) = self.hashtags {
            item.hashtags = split_hashtags(&hashtags);
        }
        if !self.images.is_empty() {
            item.images = self.images;
        }
        if let Some(featured) = self.featured {
            item.featured = featured;
        }
        if let Some(sold) = self.sold {
            item.sold = sold;
        }
        let platforms = &mut item.platforms;
        for (slot, value) in [
            (&mut platforms.poshmark, self.poshmark),
            (&mut platforms.fb_marketplace, self.fb_marketplace),
            (&mut platforms.mercari, self.mercari),
            (&mut platforms.other, self.other),
        ] {
            if let Some(value) = value {
                *slot = Some(value.trim().to_string());
            }
        }
        Ok(())
    }
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
        ..PathOverrides::default()
    })?;
    let mut repo = open_repository(&paths.items)?;

    match cli.command {
        Commands::Add { id, fields } => {
            let mut item = ItemRepository::new_item(today());
            if let Some(id) = id {
                item.id = ItemId(id.trim().to_string());
            }
            fields.apply(&mut item)?;
            let id = repo.add(item, today())?;
            repo.save(&paths.items)?;
            println!("{id}");
        }
        Commands::Edit { id, fields } => {
            let id = ItemId(id);
            let mut item = repo
                .get(&id)
                .cloned()
                .with_context(|| format!("no item with id {id}"))?;
            fields.apply(&mut item)?;
            repo.update(item)?;
            repo.save(&paths.items)?;
        }
        Commands::Delete { id } => {
            let removed = repo.remove(&ItemId(id))?;
            repo.save(&paths.items)?;
            println!("deleted {} ({})", removed.id, removed.title);
        }
        Commands::ToggleSold { id } => {
            let id = ItemId(id);
            let sold = repo.toggle_sold(&id)?;
            repo.save(&paths.items)?;
            println!("{id}: {}", if sold { "sold" } else { "available" });
        }
        Commands::ToggleFeatured { id } => {
            let id = ItemId(id);
            let featured = repo.toggle_featured(&id)?;
            repo.save(&paths.items)?;
            println!("{id}: {}", if featured { "featured" } else { "not featured" });
        }
        Commands::Import { file } => {
            let input = read_input(file.as_deref())?;
            let date = today();
            let (mut inserted, mut replaced) = (0usize, 0usize);
            for item in import_items(&input, date)? {
                match repo.upsert(item, date) {
                    Upsert::Inserted(_) => inserted += 1,
                    Upsert::Replaced(_) => replaced += 1,
                }
            }
            if inserted + replaced == 0 {
                bail!("No importable records found");
            }
            repo.save(&paths.items)?;
            info!(inserted, replaced, "import complete");
            println!("imported {inserted} new, updated {replaced}");
        }
        Commands::Export { output } => {
            let rendered = repo.export_json()?;
            match output {
                Some(path) => fs::write(&path, format!("{rendered}\n"))
                    .with_context(|| format!("writing {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Commands::Summary { json } => {
            let summary = repo.summary();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&summary).context("serializing summary")?
                );
            } else {
                println!(
                    "{} total, {} available, {} featured",
                    summary.total, summary.available, summary.featured
                );
            }
        }
        Commands::List => {
            for item in repo.items() {
                let status = if item.sold { "sold" } else { "available" };
                println!(
                    "{}\t{}\t${:.2}\t{status}{}",
                    item.id,
                    item.title,
                    item.local_price,
                    if item.featured { ",featured" } else { "" }
                );
            }
        }
    }
    Ok(())
}

/// A catalog file that does not exist yet starts out empty.
fn open_repository(path: &Path) -> Result<ItemRepository> {
    if path.exists() {
        ItemRepository::open(path)
    } else {
        info!(path = %path.display(), "catalog file not found; starting empty");
        ItemRepository::from_items(Vec::new())
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("reading import data from stdin")?;
            Ok(buf)
        }
    }
}
