//! Single-matchup simulation.
//!
//! Runs both combat strategies on one attack/defense pair so their verdicts
//! can be compared side by side.

use conquest_core::prelude::{
    AttackFleet, BattleReport, BinaryWinner, Faction, GameConfig, PhasedAttrition,
    PlanetaryDefense, UnitCounts,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a unit-count list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseCountsError {
    /// Wrong number of comma-separated values.
    #[error("Expected 4 comma-separated counts, got {0}")]
    WrongLength(usize),
    /// A value is not a non-negative integer.
    #[error("Invalid count '{0}'")]
    InvalidCount(String),
}

/// Parse `"a,b,c,d"` into four counts. Whitespace around values is ignored.
pub fn parse_counts(input: &str) -> Result<[u64; 4], ParseCountsError> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(ParseCountsError::WrongLength(parts.len()));
    }
    let mut counts = [0u64; 4];
    for (slot, part) in counts.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| ParseCountsError::InvalidCount((*part).to_string()))?;
    }
    Ok(counts)
}

/// Parse a fleet from `"battleships,destroyers,carriers,troop_transports"`.
pub fn parse_fleet(input: &str, faction: Faction) -> Result<AttackFleet, ParseCountsError> {
    let [bs, ds, cr, tt] = parse_counts(input)?;
    Ok(AttackFleet::new(faction, bs, ds, cr, tt))
}

/// Parse a defense from `"battleships,destroyers,carriers,orbital_defenses"`.
pub fn parse_defense(input: &str) -> Result<PlanetaryDefense, ParseCountsError> {
    let [bs, ds, cr, odp] = parse_counts(input)?;
    Ok(PlanetaryDefense::new(bs, ds, cr, odp))
}

/// Both verdicts for one matchup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationReport {
    /// The attacking fleet.
    pub attack: AttackFleet,
    /// The defense.
    pub defense: PlanetaryDefense,
    /// Fleet cost.
    pub attack_cost: u64,
    /// Defense cost.
    pub defense_cost: u64,
    /// Net advantage under the binary formula, saturated to `i64`.
    pub binary_advantage: i64,
    /// Binary verdict.
    pub binary_defender_won: bool,
    /// Phased verdict.
    pub phased_defender_won: bool,
    /// Full phased report.
    pub phased: BattleReport,
}

impl SimulationReport {
    /// Whether the two strategies reached different verdicts.
    #[must_use]
    pub const fn strategies_disagree(&self) -> bool {
        self.binary_defender_won != self.phased_defender_won
    }
}

/// Resolve one matchup with both strategies.
#[must_use]
pub fn simulate(
    config: &GameConfig,
    attack: &AttackFleet,
    defense: &PlanetaryDefense,
) -> SimulationReport {
    let binary = BinaryWinner::new(config.units.clone());
    let phased = PhasedAttrition::new(config.units.clone(), config.attrition.clone());

    let advantage = binary.advantage(attack, defense);
    let binary_advantage = i64::try_from(advantage).unwrap_or(if advantage < 0 {
        i64::MIN
    } else {
        i64::MAX
    });
    let report = phased.simulate(attack, defense);

    tracing::debug!(
        binary_advantage,
        invasion = report.invasion_succeeded,
        "Matchup simulated"
    );

    SimulationReport {
        attack: *attack,
        defense: *defense,
        attack_cost: attack.total_cost(&config.units),
        defense_cost: defense.total_cost(&config.units),
        binary_advantage,
        binary_defender_won: advantage < 1,
        phased_defender_won: !report.invasion_succeeded,
        phased: report,
    }
}
