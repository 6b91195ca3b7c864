#![deny(warnings)]

//! Headless driver: start or load a game, replay a JSON command script and
//! print the resulting KPIs.

use anyhow::{Context, Result};
use mayor_catalog::Catalog;
use mayor_core::{AccountType, SimConfig};
use mayor_engine::{Command, Engine};
use mayor_econ::metrics;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    catalog: Option<PathBuf>,
    commands: Option<PathBuf>,
    save_dir: Option<PathBuf>,
    slot: Option<String>,
    seed: Option<u64>,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--catalog" => args.catalog = it.next().map(PathBuf::from),
            "--commands" => args.commands = it.next().map(PathBuf::from),
            "--save-dir" => args.save_dir = it.next().map(PathBuf::from),
            "--slot" => args.slot = it.next(),
            "--seed" => args.seed = it.next().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }
    args
}

fn read_script(path: &Path) -> Result<Vec<Command>> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&data).with_context(|| format!("parsing command script {}", path.display()))
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    info!(?args, "starting CLI");

    let catalog = match &args.catalog {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin()?,
    };
    let mut config = SimConfig::default();
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    let slot = args.slot.as_deref().unwrap_or("autosave");

    let mut state = match &args.save_dir {
        Some(dir) => persistence::load_game(dir, slot, &catalog, &config)?,
        None => mayor_engine::default_state(&catalog, &config),
    };
    let mut engine = Engine::new(catalog, config);

    let script = match &args.commands {
        Some(path) => read_script(path)?,
        None => Vec::new(),
    };
    let mut rejected = 0usize;
    for (i, command) in script.iter().enumerate() {
        state = engine.dispatch(&state, command);
        if let Some(reason) = &state.error_message {
            rejected += 1;
            warn!(step = i, %reason, "command rejected");
        }
    }

    println!(
        "Replay OK | commands: {} | rejected: {} | date: {}",
        script.len(),
        rejected,
        state.date
    );
    println!(
        "KPI | rating: {:.1} | happiness: {:.1} | city: ${} | offshore: ${} | wealth: ${} | income: ${} | expenses: ${} | corruption: {:.1} | budget: {:?}",
        state.mayor_rating,
        state.happiness,
        state.budget,
        state.balance(AccountType::Offshore),
        metrics::total_personal_wealth(&state),
        metrics::monthly_income(&state),
        metrics::monthly_expenses(&state),
        metrics::corruption_risk_score(&state),
        metrics::budget_status(&state),
    );

    if let Some(dir) = &args.save_dir {
        let path = persistence::write_snapshot(dir, slot, &state)?;
        info!(path = %path.display(), "game saved");
    }
    Ok(())
}
