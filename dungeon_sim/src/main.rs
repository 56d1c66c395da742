//! Headless duel runner
//!
//! Pits two fighters from a JSON file against each other under a ruleset and
//! prints the round log as text or JSON.

mod error;
mod simulation;

use clap::Parser;
use dungeon_core::config::{default_rules, load_rules};
use dungeon_core::dice::RngRoller;
use error::SimResult;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use simulation::{run_duel, DuelSetup};
use std::path::PathBuf;

pub(crate) const BUNDLED_DUEL: &str = include_str!("../data/duel.json");

/// Headless duel runner for dungeon_core rulesets
#[derive(Parser, Debug)]
#[command(name = "dungeon_sim")]
#[command(about = "Run a scripted duel and print the round log")]
struct Args {
    /// Rules TOML; the bundled ruleset when omitted
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Duel setup JSON; the bundled duel when omitted
    #[arg(long)]
    duel: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds before the duel is called a draw
    #[arg(long, default_value_t = 20)]
    max_rounds: u32,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "duel failed");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> SimResult<()> {
    let rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => default_rules(),
    };
    let setup: DuelSetup = match &args.duel {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => serde_json::from_str(BUNDLED_DUEL)?,
    };

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting duel");
    let mut roller = RngRoller::new(ChaCha8Rng::seed_from_u64(seed));
    let report = run_duel(setup, &rules, &mut roller, args.max_rounds)?;

    match args.format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => println!("{}", report.render_text()),
    }
    Ok(())
}
