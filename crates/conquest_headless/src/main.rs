//! Headless conquest runner.
//!
//! Runs scripted scenarios, single-battle simulations and parallel sweeps
//! against the deterministic core, and verifies saved journals.
//!
//! # Usage
//!
//! ```bash
//! # Run a scenario and keep its journal
//! cargo run -p conquest_headless -- run --scenario scenarios/duel.ron --journal duel.journal
//!
//! # Compare both strategies on one matchup
//! cargo run -p conquest_headless -- simulate --attack 30,30,10,20 --defense 2,2,2,4
//!
//! # Sweep attacker compositions against a defense
//! cargo run -p conquest_headless -- sweep --max 20 --step 5 --defense 2,2,2,4
//!
//! # Replay a journal and check its hash
//! cargo run -p conquest_headless -- replay --journal duel.journal
//! ```
//!
//! Output (stdout): JSON
//! Logs (stderr): Debug information

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conquest_core::prelude::{Faction, GameConfig, Journal};
use conquest_headless::{
    battle::{parse_defense, parse_fleet, simulate},
    scenario::{Scenario, ScenarioRunner},
    sweep::{run_sweep, SweepConfig},
};

#[derive(Parser)]
#[command(name = "conquest_headless")]
#[command(about = "Headless planetary conquest runner for scenarios and balance sweeps")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted scenario
    Run {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Save the operation journal here
        #[arg(short, long)]
        journal: Option<PathBuf>,

        /// Game configuration (RON) for scenarios without their own
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Resolve one matchup with both strategies
    Simulate {
        /// Attacking fleet: battleships,destroyers,carriers,troop_transports
        #[arg(short, long)]
        attack: String,

        /// Defense: battleships,destroyers,carriers,orbital_defenses
        #[arg(short, long)]
        defense: String,

        /// Faction code of the attacking fleet
        #[arg(short, long, default_value = "1")]
        faction: u8,

        /// Game configuration file (RON); defaults apply when absent
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Sweep attacker compositions against a fixed defense
    Sweep {
        /// Largest count of each ship kind
        #[arg(short, long, default_value = "20")]
        max: u64,

        /// Grid step between counts
        #[arg(short, long, default_value = "5")]
        step: u64,

        /// Defense: battleships,destroyers,carriers,orbital_defenses
        #[arg(short, long, default_value = "2,2,2,4")]
        defense: String,

        /// Include fleets over the attack cost cap
        #[arg(long)]
        over_budget: bool,

        /// Maximum parallel threads (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: usize,

        /// Also write results to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Game configuration file (RON); defaults apply when absent
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Replay a saved journal and verify its final hash
    Replay {
        /// Journal file path
        #[arg(short, long)]
        journal: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for JSON)
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            journal,
            config,
        } => cmd_run(&scenario, journal.as_deref(), config.as_deref()),
        Commands::Simulate {
            attack,
            defense,
            faction,
            config,
        } => cmd_simulate(&load_config(config.as_deref()), &attack, &defense, faction),
        Commands::Sweep {
            max,
            step,
            defense,
            over_budget,
            parallel,
            output,
            config,
        } => cmd_sweep(
            &load_config(config.as_deref()),
            max,
            step,
            &defense,
            over_budget,
            parallel,
            output.as_deref(),
        ),
        Commands::Replay { journal } => cmd_replay(&journal),
    }
}

/// Print a fatal error and exit.
fn fail(context: &str, error: &dyn std::fmt::Display) -> ! {
    tracing::error!(error = %error, "{context}");
    eprintln!("FATAL: {context}: {error}");
    std::process::exit(1);
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fail("Failed to encode output", &e),
    }
}

fn load_config(path: Option<&Path>) -> GameConfig {
    let Some(path) = path else {
        return GameConfig::default();
    };
    match GameConfig::load(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "Loaded game configuration");
            config
        }
        Err(e) => fail("Failed to load configuration", &e),
    }
}

/// Run a scripted scenario
fn cmd_run(path: &Path, journal_path: Option<&Path>, config_path: Option<&Path>) {
    let mut scenario = match Scenario::load(path) {
        Ok(s) => s,
        Err(e) => fail("Failed to load scenario", &e),
    };
    if config_path.is_some() {
        if scenario.config.is_some() {
            tracing::warn!("Scenario brings its own configuration, ignoring --config");
        }
        scenario = scenario.or_config(load_config(config_path));
    }
    tracing::info!(
        name = %scenario.name,
        players = scenario.players.len(),
        steps = scenario.steps.len(),
        "Running scenario"
    );

    let mut runner = match ScenarioRunner::new(&scenario, journal_path.is_some()) {
        Ok(r) => r,
        Err(e) => fail("Failed to set up scenario", &e),
    };
    let outcome = match runner.run(&scenario) {
        Ok(o) => o,
        Err(e) => fail("Scenario aborted", &e),
    };

    if let Some(path) = journal_path {
        if let Some(journal) = runner.take_journal() {
            if let Err(e) = journal.save(path) {
                fail("Failed to save journal", &e);
            }
            tracing::info!(path = %path.display(), entries = journal.len(), "Journal saved");
        }
    }

    tracing::info!(
        failed_steps = outcome.failed_steps(),
        state_hash = format!("{:016x}", outcome.state_hash),
        "Scenario complete"
    );
    print_json(&outcome);
}

/// Resolve one matchup with both strategies
fn cmd_simulate(config: &GameConfig, attack: &str, defense: &str, faction: u8) {
    let faction = match Faction::from_code(faction) {
        Ok(f) => f,
        Err(e) => fail("Invalid faction", &e),
    };
    let attack = match parse_fleet(attack, faction) {
        Ok(f) => f,
        Err(e) => fail("Invalid attack", &e),
    };
    let defense = match parse_defense(defense) {
        Ok(d) => d,
        Err(e) => fail("Invalid defense", &e),
    };

    let report = simulate(config, &attack, &defense);
    if report.strategies_disagree() {
        tracing::warn!("Strategies disagree on this matchup");
    }
    print_json(&report);
}

/// Sweep attacker compositions against a fixed defense
fn cmd_sweep(
    config: &GameConfig,
    max: u64,
    step: u64,
    defense: &str,
    over_budget: bool,
    parallel: usize,
    output: Option<&Path>,
) {
    let defense = match parse_defense(defense) {
        Ok(d) => d,
        Err(e) => fail("Invalid defense", &e),
    };
    let sweep = SweepConfig {
        max,
        step,
        defense,
        within_budget: !over_budget,
        parallel,
        ..SweepConfig::default()
    };

    let results = run_sweep(config, sweep);

    eprintln!("\n{}", "=".repeat(50));
    eprintln!("SWEEP COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matchups: {}", results.matchups);
    eprintln!("Attacker faction: {}", results.config.faction.short_name());
    eprintln!(
        "Binary winner:    attacker wins {:>5.1}%",
        results.binary_win_rate() * 100.0
    );
    eprintln!(
        "Phased attrition: attacker wins {:>5.1}%",
        results.phased_win_rate() * 100.0
    );
    eprintln!(
        "Disagreements:    {} ({:.1}%)",
        results.disagreements,
        results.disagreement_rate() * 100.0
    );

    if let Some(path) = output {
        if let Err(e) = results.save(path) {
            fail("Failed to save results", &e);
        }
        tracing::info!(path = %path.display(), "Results saved");
    }
    print_json(&results);
}

/// Replay a saved journal
fn cmd_replay(path: &Path) {
    tracing::info!("Verifying journal: {}", path.display());

    let journal = match Journal::load(path) {
        Ok(j) => j,
        Err(e) => fail("Failed to load journal", &e),
    };

    eprintln!("Loaded journal:");
    eprintln!("  Entries: {}", journal.len());
    eprintln!("  Final height: {}", journal.final_height);

    match journal.verify() {
        Ok(game) => {
            eprintln!("PASS: Journal verification successful");
            eprintln!("  Planets: {}", game.planet_count());
            eprintln!("  Hash:    {:016x}", game.state_hash());
            print_json(&serde_json::json!({
                "entries": journal.len(),
                "final_height": journal.final_height,
                "state_hash": game.state_hash(),
                "verified": true,
            }));
        }
        Err(e) => {
            eprintln!("FAIL: Journal did not reproduce its final state");
            eprintln!("  Expected: {:016x}", journal.final_hash);
            fail("Verification failed", &e);
        }
    }
}
