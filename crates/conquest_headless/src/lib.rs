//! Headless runner for scenario testing and balance sweeps.
//!
//! This crate drives the conquest state machine without any chain or UI:
//!
//! - **Scenarios**: scripted games loaded from RON, executed step by step
//! - **Simulation**: both combat strategies on a single matchup
//! - **Sweeps**: a grid of attacker compositions resolved in parallel
//! - **Replay verification**: check that a saved journal reproduces its hash
//!
//! Results are printed as JSON on stdout; logs go to stderr.
//!
//! # Example
//!
//! ```bash
//! # Run a scenario
//! cargo run -p conquest_headless -- run --scenario scenarios/duel.ron
//!
//! # Compare strategies on one matchup
//! cargo run -p conquest_headless -- simulate --attack 30,30,10,20 --defense 2,2,2,4
//!
//! # Verify a journal
//! cargo run -p conquest_headless -- replay --journal duel.journal
//! ```

pub mod battle;
pub mod scenario;
pub mod sweep;

pub use battle::{parse_defense, parse_fleet, simulate, ParseCountsError, SimulationReport};
pub use scenario::{run_scenario, Scenario, ScenarioError, ScenarioOutcome, ScenarioRunner, Step};
pub use sweep::{run_sweep, SweepConfig, SweepResults};
