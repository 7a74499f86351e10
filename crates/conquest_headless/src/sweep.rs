//! Parallel battle sweeps for balance testing.
//!
//! Enumerates attacker compositions on a grid and resolves each against a
//! fixed defense with both strategies, using rayon to spread the matchups
//! across cores.

use std::path::Path;

use conquest_core::prelude::{AttackFleet, Faction, GameConfig, PlanetaryDefense, UnitCounts};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::battle::simulate;

/// Configuration for a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Largest count of each attacking ship kind.
    pub max: u64,
    /// Grid step between counts.
    pub step: u64,
    /// Faction of the attacking fleets.
    pub faction: Faction,
    /// Defense every fleet attacks.
    pub defense: PlanetaryDefense,
    /// Skip fleets over the attack cost cap.
    pub within_budget: bool,
    /// Maximum parallel threads (0 = use rayon default).
    pub parallel: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            max: 20,
            step: 5,
            faction: Faction::A,
            defense: PlanetaryDefense::new(2, 2, 2, 4),
            within_budget: true,
            parallel: 0,
        }
    }
}

impl SweepConfig {
    /// Grid values for one ship kind: `0, step, 2·step, ..` up to `max`.
    fn axis(&self) -> Vec<u64> {
        let step = usize::try_from(self.step.max(1)).unwrap_or(usize::MAX);
        (0..=self.max).step_by(step).collect()
    }

    /// Every fleet on the grid, in lexicographic order.
    #[must_use]
    pub fn fleets(&self, config: &GameConfig) -> Vec<AttackFleet> {
        let axis = self.axis();
        let mut fleets = Vec::with_capacity(axis.len().pow(4));
        for &bs in &axis {
            for &ds in &axis {
                for &cr in &axis {
                    for &tt in &axis {
                        let fleet = AttackFleet::new(self.faction, bs, ds, cr, tt);
                        if !self.within_budget
                            || fleet.total_cost(&config.units) <= config.max_attack_cost
                        {
                            fleets.push(fleet);
                        }
                    }
                }
            }
        }
        fleets
    }
}

/// Aggregate verdicts of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResults {
    /// Configuration used.
    pub config: SweepConfig,
    /// Number of matchups resolved.
    pub matchups: u64,
    /// Matchups the binary formula awards the attacker.
    pub binary_attacker_wins: u64,
    /// Matchups the phased simulation awards the attacker.
    pub phased_attacker_wins: u64,
    /// Matchups where the two strategies differ.
    pub disagreements: u64,
    /// First few disagreeing fleets, for inspection.
    pub disagreement_samples: Vec<AttackFleet>,
}

/// Cap on recorded disagreement samples.
const MAX_SAMPLES: usize = 16;

impl SweepResults {
    /// Fraction of matchups the binary formula awards the attacker.
    #[must_use]
    pub fn binary_win_rate(&self) -> f64 {
        ratio(self.binary_attacker_wins, self.matchups)
    }

    /// Fraction of matchups the phased simulation awards the attacker.
    #[must_use]
    pub fn phased_win_rate(&self) -> f64 {
        ratio(self.phased_attacker_wins, self.matchups)
    }

    /// Fraction of matchups where the strategies disagree.
    #[must_use]
    pub fn disagreement_rate(&self) -> f64 {
        ratio(self.disagreements, self.matchups)
    }

    /// Save results to a JSON file.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load results from a JSON file.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[derive(Default)]
struct Tally {
    binary: u64,
    phased: u64,
    disagreements: u64,
    samples: Vec<AttackFleet>,
}

impl Tally {
    fn merge(mut self, other: Self) -> Self {
        self.binary += other.binary;
        self.phased += other.phased;
        self.disagreements += other.disagreements;
        self.samples.extend(other.samples);
        self.samples.truncate(MAX_SAMPLES);
        self
    }
}

/// Run a sweep.
#[must_use]
pub fn run_sweep(game_config: &GameConfig, config: SweepConfig) -> SweepResults {
    let fleets = config.fleets(game_config);
    info!(
        matchups = fleets.len(),
        max = config.max,
        step = config.step,
        "Starting sweep"
    );

    let tally = |fleets: &[AttackFleet]| {
        fleets
            .par_iter()
            .map(|fleet| {
                let report = simulate(game_config, fleet, &config.defense);
                let disagree = report.strategies_disagree();
                Tally {
                    binary: u64::from(!report.binary_defender_won),
                    phased: u64::from(!report.phased_defender_won),
                    disagreements: u64::from(disagree),
                    samples: if disagree { vec![*fleet] } else { Vec::new() },
                }
            })
            .reduce(Tally::default, Tally::merge)
    };

    let totals = if config.parallel > 0 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel)
            .build()
        {
            Ok(pool) => pool.install(|| tally(&fleets)),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build thread pool, using the global one");
                tally(&fleets)
            }
        }
    } else {
        tally(&fleets)
    };

    let results = SweepResults {
        matchups: u64::try_from(fleets.len()).unwrap_or(u64::MAX),
        binary_attacker_wins: totals.binary,
        phased_attacker_wins: totals.phased,
        disagreements: totals.disagreements,
        disagreement_samples: totals.samples,
        config,
    };
    info!(
        binary_win_rate = results.binary_win_rate(),
        phased_win_rate = results.phased_win_rate(),
        disagreements = results.disagreements,
        "Sweep finished"
    );
    results
}
