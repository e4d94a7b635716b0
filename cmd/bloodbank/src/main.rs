//! # bloodbank
//!
//! Loads settings, opens the configured store, seeds it on first run and
//! dispatches one command against the engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use configs::{init_tracing, Settings};
use domains::SystemClock;
use services::{BloodBank, EngineOptions};
use storage_adapters::{open_store, seed_if_empty};
use tracing::debug;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;
    init_tracing(&settings.log).context("failed to initialise logging")?;
    debug!(?settings, "settings loaded");

    let store = open_store(&settings.store).context("failed to open collection store")?;
    if settings.store.seed_on_start {
        seed_if_empty(store.as_ref(), Utc::now()).context("failed to seed store")?;
    }

    let bank = BloodBank::new(
        store,
        Arc::new(SystemClock),
        EngineOptions {
            strict_references: settings.engine.strict_references,
        },
    );
    cli::run(&bank, cli.command)
}
