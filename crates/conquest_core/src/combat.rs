//! Combat resolution strategies.
//!
//! Two interchangeable resolvers sit behind [`CombatStrategy`]:
//!
//! - [`BinaryWinner`] - the rock-paper-scissors advantage formula that the
//!   battle claim commits to. Battleships counter destroyers, destroyers
//!   counter carriers, carriers counter battleships.
//! - [`PhasedAttrition`](crate::attrition::PhasedAttrition) - the four-phase
//!   attrition simulation with per-phase loss reports.
//!
//! Both are pure: integer arithmetic only, no randomness, no shared state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attrition::{BattleReport, PhasedAttrition};
use crate::config::GameConfig;
use crate::fleet::{AttackFleet, PlanetaryDefense};
use crate::units::UnitTable;

/// Result of resolving one battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Whether the defender held the planet.
    pub defender_won: bool,
    /// Full phase-by-phase report, when the strategy produces one.
    pub report: Option<BattleReport>,
}

impl BattleOutcome {
    /// Whether the attacker won.
    #[must_use]
    pub const fn attacker_won(&self) -> bool {
        !self.defender_won
    }
}

/// Decides who wins when an attack fleet meets a planetary defense.
pub trait CombatStrategy: fmt::Debug + Send + Sync {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Resolve a battle. Must be deterministic.
    fn resolve(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> BattleOutcome;
}

/// Selects a [`CombatStrategy`] by name, e.g. from a scenario file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrategyKind {
    /// [`BinaryWinner`].
    #[default]
    BinaryWinner,
    /// [`PhasedAttrition`].
    PhasedAttrition,
}

impl StrategyKind {
    /// Build the strategy with the given configuration.
    #[must_use]
    pub fn build(self, config: &GameConfig) -> Box<dyn CombatStrategy> {
        match self {
            Self::BinaryWinner => Box::new(BinaryWinner::new(config.units.clone())),
            Self::PhasedAttrition => Box::new(PhasedAttrition::new(
                config.units.clone(),
                config.attrition.clone(),
            )),
        }
    }
}

/// Rock-paper-scissors winner formula.
///
/// ```text
/// advantage = (atk.battleships·S_bs − def.destroyers·S_ds)
///           + (atk.destroyers·S_ds  − def.carriers·S_cr)
///           + (atk.carriers·S_cr    − def.battleships·S_bs)
/// defender_won = advantage < 1
/// ```
///
/// `S_x` is the combat value of unit kind x. The attacker needs a strictly
/// positive combined advantage to win, so equal fleets favour the defender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryWinner {
    units: UnitTable,
}

impl BinaryWinner {
    /// Create the resolver with the given unit table.
    #[must_use]
    pub const fn new(units: UnitTable) -> Self {
        Self { units }
    }

    /// Signed net advantage of the attacker.
    #[must_use]
    pub fn advantage(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> i128 {
        let s_bs = i128::from(self.units.battleship.combat_value);
        let s_ds = i128::from(self.units.destroyer.combat_value);
        let s_cr = i128::from(self.units.carrier.combat_value);

        let battleships_beat_destroyers =
            i128::from(attack.battleships) * s_bs - i128::from(defense.destroyers) * s_ds;
        let destroyers_beat_carriers =
            i128::from(attack.destroyers) * s_ds - i128::from(defense.carriers) * s_cr;
        let carriers_beat_battleships =
            i128::from(attack.carriers) * s_cr - i128::from(defense.battleships) * s_bs;

        battleships_beat_destroyers + destroyers_beat_carriers + carriers_beat_battleships
    }

    /// Whether the defender wins.
    #[must_use]
    pub fn defender_won(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> bool {
        self.advantage(attack, defense) < 1
    }
}

impl Default for BinaryWinner {
    fn default() -> Self {
        Self::new(UnitTable::default())
    }
}

impl CombatStrategy for BinaryWinner {
    fn name(&self) -> &'static str {
        "binary_winner"
    }

    fn resolve(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> BattleOutcome {
        BattleOutcome {
            defender_won: self.defender_won(attack, defense),
            report: None,
        }
    }
}
