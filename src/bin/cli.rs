//! Econ schema CLI
//!
//! Local entry point for classification, SKU conversion and schema watching.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use econ_schema::{
    error::{AppError, Result},
    models::{CatalogSnapshot, Config, ItemDescriptor, RawListing},
    pipeline::{self, CatalogKeys, CatalogRefresher, WatchPipeline},
    services::{EconItemClassifier, PropertyKind, property_table},
    sku,
    utils::http,
};

/// econ-schema - item schema toolkit
#[derive(Parser, Debug)]
#[command(
    name = "econ-schema",
    version,
    about = "Econ item classification, SKUs and schema change notifications"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Catalog source (URL or path), overriding the configuration
    #[arg(long)]
    catalog: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify listings from a JSON file (one object or an array)
    Classify { listings: PathBuf },

    /// Decode a SKU into a descriptor
    Sku { sku: String },

    /// Encode a descriptor given as JSON into a SKU
    Encode { descriptor: String },

    /// Show additions between two schema documents
    Diff { old: PathBuf, new: PathBuf },

    /// Show the grade of an item
    Grade { defindex: u32 },

    /// List every graded item, by grade
    Grades,

    /// Show an item definition by defindex or display name
    Item { query: String },

    /// List a property table (qualities, killstreaks, effects, paintkits, wears, crateseries, paints)
    Properties { kind: PropertyKind },

    /// Watch the schema and announce additions
    Watch {
        /// Run a single refresh cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the configured catalog once.
async fn load_catalog(config: &Config) -> Result<CatalogSnapshot> {
    let client = http::create_async_client(&config.http)?;
    let mut refresher = CatalogRefresher::new(client, config.catalog.source.clone());
    refresher
        .fetch()
        .await?
        .ok_or_else(|| AppError::config("catalog source returned no document"))
}

fn read_listings(path: &Path) -> Result<Vec<RawListing>> {
    let content = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let listings = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value)?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(listings)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load_or_default(&cli.config);
    config.apply_env();
    if let Some(source) = cli.catalog {
        config.catalog.source = source;
    }
    init_logging(cli.verbose, &config.logging.level);

    log::debug!("Loaded configuration from {}", cli.config.display());

    match cli.command {
        Command::Classify { listings } => {
            let catalog = load_catalog(&config).await?;
            let classifier = EconItemClassifier::new(&catalog, config.classifier);

            let mut failures = 0;
            for listing in read_listings(&listings)? {
                match classifier.classify_listing(&listing) {
                    Ok(result) => print_json(&result)?,
                    Err(e) => {
                        failures += 1;
                        log::error!(
                            "{}: {}",
                            listing.market_hash_name.as_deref().unwrap_or("<unnamed>"),
                            e
                        );
                    }
                }
            }

            if failures > 0 {
                log::warn!("{failures} listing(s) could not be classified");
            }
        }

        Command::Sku { sku } => {
            let item = sku::decode(&sku)?;
            print_json(&item)?;
        }

        Command::Encode { descriptor } => {
            let item: ItemDescriptor = serde_json::from_str(&descriptor)?;
            println!("{}", sku::encode(&item));
        }

        Command::Diff { old, new } => {
            let previous = CatalogKeys::from_snapshot(&CatalogSnapshot::load(&old)?);
            let current = CatalogKeys::from_snapshot(&CatalogSnapshot::load(&new)?);
            let changes = pipeline::diff::calculate(&previous, &current);

            log::info!("{} addition(s)", changes.change_count());
            print_json(&changes)?;
        }

        Command::Grade { defindex } => {
            let catalog = load_catalog(&config).await?;
            let name = catalog
                .identifier_to_name()
                .get(&defindex)
                .ok_or_else(|| AppError::validation(format!("unknown defindex {defindex}")))?;

            match catalog.item_grade(defindex) {
                Some(grade) => println!("{name}: {grade}"),
                None => println!("{name}: no grade"),
            }
        }

        Command::Grades => {
            let catalog = load_catalog(&config).await?;
            let table = catalog.grade_table();
            for entry in &table {
                log::info!("{}: {}", entry.grade, entry.count);
            }
            print_json(&table)?;
        }

        Command::Item { query } => {
            let catalog = load_catalog(&config).await?;
            let item = catalog
                .find_item(&query)
                .ok_or_else(|| AppError::validation(format!("unknown item '{query}'")))?;

            print_json(item)?;
            if let Some(grade) = catalog.item_grade(item.defindex) {
                log::info!("{}: {grade}", item.item_name);
            }
        }

        Command::Properties { kind } => {
            let catalog = if kind.needs_catalog() {
                load_catalog(&config).await?
            } else {
                CatalogSnapshot::default()
            };
            let table = property_table(&catalog, kind);

            log::info!("{} {kind}", table.len());
            print_json(&table)?;
        }

        Command::Watch { once } => {
            config.validate()?;
            let mut watcher = WatchPipeline::new(config)?;

            let stats = if once {
                let outcome = watcher.tick().await?;
                log::info!(
                    "Refreshed: {}, additions: {}, notifications queued: {}",
                    outcome.refreshed,
                    outcome.changes.change_count(),
                    outcome.jobs
                );
                watcher.shutdown().await?
            } else {
                watcher.run().await?
            };

            log::info!(
                "Notifications: {} delivered, {} suppressed, {} failed",
                stats.delivered,
                stats.suppressed,
                stats.failed
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let catalog = load_catalog(&config).await?;
            log::info!(
                "✓ Catalog OK ({} items, {} effects, {} paint kits)",
                catalog.item_count(),
                catalog.particle_effects().len(),
                catalog.paint_kits().len()
            );
            for (grade, count) in catalog.grade_counts() {
                log::debug!("  {grade}: {count}");
            }

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
