//! Operator entry point for the catalog store.
//!
//! # Responsibility
//! - Load configuration, start logging and open the store.
//! - Run one maintenance command and print its result as JSON.

use catalog_core::repo::seed_lock_repo::LockHolder;
use catalog_core::seed::generator::SEED_LOCK_NAME;
use catalog_core::{
    clear_catalog, init_logging, open_db, AppConfig, CategoryRepository, ItemRepository,
    SeedGenerator, SeedLockRepository, SqliteCategoryRepository, SqliteItemRepository,
    SqliteSeedLockRepository,
};
use clap::{Parser, Subcommand};
use log::error;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Seed and inspect the category/item catalog.
#[derive(Parser)]
#[command(name = "catalog")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to config/catalog.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `database.path`
    #[arg(long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Populate an empty catalog with generated data
    Seed {
        /// Override `seed.category_count`
        #[arg(long)]
        categories: Option<u32>,

        /// Override `seed.item_count`
        #[arg(long)]
        items: Option<u64>,

        /// Override `seed.batch_size`
        #[arg(long)]
        batch_size: Option<usize>,

        /// Override `seed.rng_seed`
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Print row counts and the current seed lock holder
    Stats,

    /// Delete all categories, items and seed locks
    Reset,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Stats {
    categories: u64,
    items: u64,
    seed_lock: Option<LockHolder>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, Box<dyn Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.database {
        config.database.path = path;
    }

    let log_dir = if config.logging.dir.is_absolute() {
        config.logging.dir.clone()
    } else {
        std::env::current_dir()?.join(&config.logging.dir)
    };
    init_logging(&config.logging.level, &log_dir)?;

    let conn = open_db(&config.database.path)?;
    let categories = SqliteCategoryRepository::try_new(&conn)?;
    let items = SqliteItemRepository::try_new(&conn)?
        .with_category_requirement(config.catalog.item_category);
    let locks = SqliteSeedLockRepository::try_new(&conn)?;

    let output = match cli.command {
        Command::Seed {
            categories: category_count,
            items: item_count,
            batch_size,
            rng_seed,
        } => {
            let mut settings = config.seed.clone();
            if let Some(value) = category_count {
                settings.category_count = value;
            }
            if let Some(value) = item_count {
                settings.item_count = value;
            }
            if let Some(value) = batch_size {
                settings.batch_size = value;
            }
            if rng_seed.is_some() {
                settings.rng_seed = rng_seed;
            }
            let report = SeedGenerator::new(categories, items, locks, settings).run()?;
            serde_json::to_string_pretty(&report)?
        }
        Command::Stats => {
            let stats = Stats {
                categories: categories.count()?,
                items: items.count()?,
                seed_lock: locks.holder(SEED_LOCK_NAME)?,
            };
            serde_json::to_string_pretty(&stats)?
        }
        Command::Reset => serde_json::to_string_pretty(&clear_catalog(&conn)?)?,
    };
    Ok(output)
}
