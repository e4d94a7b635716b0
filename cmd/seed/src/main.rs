//! Writes the demonstration data set into the configured store.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use configs::{init_tracing, Settings};
use storage_adapters::{open_store, reseed, seed_if_empty};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "seed", about = "Seed the blood bank store with demonstration data")]
struct Args {
    /// Overwrite existing donors, requests and units and clear matches.
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = Settings::load().context("failed to load settings")?;
    init_tracing(&settings.log).context("failed to initialise logging")?;

    let store = open_store(&settings.store).context("failed to open collection store")?;
    let now = Utc::now();
    let report = if args.force {
        reseed(store.as_ref(), now)
    } else {
        seed_if_empty(store.as_ref(), now)
    }
    .context("seeding failed")?;

    if report.wrote_anything() {
        info!(?report, "seed complete");
    } else {
        info!("store already populated; pass --force to overwrite");
    }
    Ok(())
}
