//! Immutable game configuration.
//!
//! A [`GameConfig`] is built once (from defaults or a RON data file) and
//! handed to the state machine, the claim issuer and the combat strategies
//! at construction time. Nothing in the core reads ambient globals.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::commitment::BirthingDifficulty;
use crate::error::{ConquestError, Result};
use crate::units::UnitTable;

/// Default number of hash rounds when deriving a location.
pub const CHAIN_HASH_TIMES: u32 = 10;

/// Default side length of the square game map.
pub const MAX_MAP_LENGTH: u64 = 10_000;

/// Scale applied to attack power before dividing by opposing health.
pub const DAMAGE_POTENTIAL_SCALE: u64 = 1000;

/// Constants of the four-phase attrition simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttritionRules {
    /// Missile salvos fired (and intercepted) in the long-range exchange.
    pub missile_salvos: u64,
    /// Fighters launched by each carrier.
    pub fighters_per_carrier: u64,
    /// Drones launched by each carrier.
    pub drones_per_carrier: u64,
    /// Dropships launched by each troop transport.
    pub dropships_per_transport: u64,
    /// Troops delivered by each surviving dropship.
    pub troops_per_dropship: u64,
    /// Percentage of committed units the phase winner loses.
    pub winner_loss_percent: u64,
    /// Percentage of committed units the phase loser loses.
    pub loser_loss_percent: u64,
}

impl Default for AttritionRules {
    fn default() -> Self {
        Self {
            missile_salvos: 3,
            fighters_per_carrier: 10,
            drones_per_carrier: 20,
            dropships_per_transport: 4,
            troops_per_dropship: 25,
            winner_loss_percent: 20,
            loser_loss_percent: 50,
        }
    }
}

/// Complete game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Largest valid x or y coordinate.
    pub max_map_length: u64,
    /// Hash rounds used to derive a location id.
    pub chain_hash_times: u32,
    /// Admission filter for homeworld locations.
    pub birthing_difficulty: BirthingDifficulty,
    /// Points a planet starts with.
    pub initial_points: i64,
    /// Points awarded to the winner of a battle or forfeit.
    pub win_points: i64,
    /// Points taken from the loser of a resolved battle.
    pub lose_points: i64,
    /// Points taken from a defender who never resolved the attack.
    pub forfeit_points: i64,
    /// Blocks the defender has to resolve an attack before it can be forfeited.
    pub forfeit_blocks_duration: u64,
    /// Maximum total cost of an attack fleet.
    pub max_attack_cost: u64,
    /// Maximum total cost of a planetary defense.
    pub max_defense_cost: u64,
    /// Maximum crew a planetary defense may need.
    pub max_defense_crew: u64,
    /// Maximum number of planets in the game.
    pub max_planets: u64,
    /// Per-unit statistics.
    pub units: UnitTable,
    /// Attrition simulation constants.
    pub attrition: AttritionRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_map_length: MAX_MAP_LENGTH,
            chain_hash_times: CHAIN_HASH_TIMES,
            birthing_difficulty: BirthingDifficulty::default(),
            initial_points: 100,
            win_points: 2,
            lose_points: 1,
            forfeit_points: 2,
            forfeit_blocks_duration: 7200,
            max_attack_cost: 10_000,
            max_defense_cost: 50_000,
            max_defense_crew: 100_000,
            max_planets: 1_000_000,
            units: UnitTable::default(),
            attrition: AttritionRules::default(),
        }
    }
}

impl GameConfig {
    /// Parse and validate a configuration from a RON string.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::Config`] if parsing or validation fails.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: Self =
            ron::from_str(ron).map_err(|e| ConquestError::Config(format!("{e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration from a RON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::Config`] if the file cannot be read or is invalid.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ConquestError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_ron_str(&contents)
    }

    /// Check the configuration for values the formulas cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.chain_hash_times == 0 {
            return Err(ConquestError::Config(
                "chain_hash_times must be at least 1".to_string(),
            ));
        }
        if self.birthing_difficulty.leading_zero_bits > 256 {
            return Err(ConquestError::Config(format!(
                "birthing difficulty of {} bits exceeds the 256-bit hash",
                self.birthing_difficulty.leading_zero_bits
            )));
        }
        let rules = &self.attrition;
        if rules.winner_loss_percent > 100 || rules.loser_loss_percent > 100 {
            return Err(ConquestError::Config(
                "loss percentages must not exceed 100".to_string(),
            ));
        }
        Ok(())
    }

    /// Builder method to set the forfeit window.
    #[must_use]
    pub fn with_forfeit_blocks(mut self, blocks: u64) -> Self {
        self.forfeit_blocks_duration = blocks;
        self
    }

    /// Builder method to set the birthing difficulty.
    #[must_use]
    pub fn with_difficulty_bits(mut self, bits: u16) -> Self {
        self.birthing_difficulty = BirthingDifficulty::new(bits);
        self
    }

    /// Builder method to set the planet cap.
    #[must_use]
    pub fn with_max_planets(mut self, max: u64) -> Self {
        self.max_planets = max;
        self
    }
}
