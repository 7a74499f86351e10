//! Scenario loading and execution.
//!
//! A scenario founds a set of homeworlds and then plays a scripted list of
//! steps against the lifecycle state machine. Failed steps are recorded with
//! their error kind and do not stop the run.

use std::collections::BTreeMap;
use std::path::Path;

use conquest_core::prelude::{
    AttackFleet, ClaimIssuer, Clock, CombatStrategy, ConquestError, ErrorKind, Faction, Game,
    GameConfig, Journal, LocationId, PlanetState, PlanetaryDefense, PlayerId, Resolution, Salt,
    SealKey, StrategyKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A step names a player that was never founded.
    #[error("Unknown player in scenario: {0}")]
    UnknownPlayer(String),
    /// Two players share a name.
    #[error("Duplicate player in scenario: {0}")]
    DuplicatePlayer(String),
    /// The core refused the scenario setup.
    #[error(transparent)]
    Conquest(#[from] ConquestError),
}

/// A homeworld to found before the steps run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    /// Player name; the identity is derived from it.
    pub name: String,
    /// X coordinate of the homeworld.
    pub x: u64,
    /// Y coordinate of the homeworld.
    pub y: u64,
    /// Faction code (1, 2 or 3).
    pub faction: u8,
}

/// Ship counts for a defense, in `(battleships, destroyers, carriers, orbital_defenses)` order.
pub type DefenseCounts = (u64, u64, u64, u64);

/// Ship counts for a fleet, in `(battleships, destroyers, carriers, troop_transports)` order.
pub type FleetCounts = (u64, u64, u64, u64);

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    /// Commit a defense for the player's homeworld.
    Defend {
        /// Acting player.
        player: String,
        /// Defense to commit.
        defense: DefenseCounts,
        /// Salt for the commitment.
        salt: u64,
    },
    /// Attack another player's homeworld. The fleet takes the attacker's faction.
    Attack {
        /// Acting player.
        player: String,
        /// Defending player.
        target: String,
        /// Fleet to send.
        fleet: FleetCounts,
    },
    /// Resolve the pending attack on the player's homeworld.
    Resolve {
        /// Defending player.
        player: String,
        /// The defense the player committed.
        defense: DefenseCounts,
        /// The salt the player committed with.
        salt: u64,
    },
    /// Claim a forfeit against a defender who did not resolve in time.
    Forfeit {
        /// Attacking player.
        player: String,
        /// Defending player.
        target: String,
    },
    /// Advance the block height.
    Advance {
        /// Number of blocks.
        blocks: u64,
    },
}

impl Step {
    /// Short name of the action.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Defend { .. } => "defend",
            Self::Attack { .. } => "attack",
            Self::Resolve { .. } => "resolve",
            Self::Forfeit { .. } => "forfeit",
            Self::Advance { .. } => "advance",
        }
    }
}

/// A complete scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Configuration override; defaults apply when absent.
    #[serde(default)]
    pub config: Option<GameConfig>,
    /// Strategy the claim issuer fights battles with.
    #[serde(default)]
    pub strategy: StrategyKind,
    /// Homeworlds to found, in order.
    pub players: Vec<PlayerSetup>,
    /// Steps to play, in order.
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The effective configuration.
    #[must_use]
    pub fn game_config(&self) -> GameConfig {
        self.config.clone().unwrap_or_default()
    }

    /// Use `config` unless the scenario brings its own.
    #[must_use]
    pub fn or_config(mut self, config: GameConfig) -> Self {
        self.config.get_or_insert(config);
        self
    }
}

/// Result of one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Position in the step list.
    pub index: usize,
    /// Action name.
    pub action: String,
    /// Block height the step ran at.
    pub height: u64,
    /// Error kind if the step was rejected.
    pub error: Option<ErrorKind>,
    /// Error message if the step was rejected.
    pub message: Option<String>,
    /// Settlement, for resolve and forfeit steps.
    pub resolution: Option<Resolution>,
}

impl StepResult {
    /// Whether the step succeeded.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Final state of one homeworld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetSummary {
    /// Owner name.
    pub player: String,
    /// Location id, abbreviated.
    pub location: String,
    /// Faction.
    pub faction: Faction,
    /// Points.
    pub points: i64,
    /// Lifecycle state.
    pub state: PlanetState,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    pub name: String,
    /// Strategy used for battles.
    pub strategy: String,
    /// Block height at the end of the run.
    pub final_height: u64,
    /// Ledger state hash at the end of the run.
    pub state_hash: u64,
    /// Homeworlds in founding order.
    pub planets: Vec<PlanetSummary>,
    /// Per-step results.
    pub steps: Vec<StepResult>,
}

impl ScenarioOutcome {
    /// Number of rejected steps.
    #[must_use]
    pub fn failed_steps(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_ok()).count()
    }
}

/// Drives one scenario against a fresh game.
#[derive(Debug)]
pub struct ScenarioRunner {
    game: Game,
    issuer: ClaimIssuer,
    players: BTreeMap<String, (PlayerId, LocationId)>,
    order: Vec<String>,
}

impl ScenarioRunner {
    /// Create a runner and found every homeworld.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a homeworld
    /// cannot be founded.
    pub fn new(scenario: &Scenario, journal: bool) -> Result<Self, ScenarioError> {
        let config = scenario.game_config();
        config.validate()?;

        let issuer = ClaimIssuer::new(
            config.clone(),
            scenario.strategy.build(&config),
            SealKey::default(),
        );
        let mut game = Game::new(config);
        if journal {
            game = game.with_journal();
        }

        let mut runner = Self {
            game,
            issuer,
            players: BTreeMap::new(),
            order: Vec::new(),
        };
        for setup in &scenario.players {
            runner.found(setup)?;
        }
        Ok(runner)
    }

    fn found(&mut self, setup: &PlayerSetup) -> Result<(), ScenarioError> {
        if self.players.contains_key(&setup.name) {
            return Err(ScenarioError::DuplicatePlayer(setup.name.clone()));
        }
        let id = PlayerId::from_name(&setup.name);
        let claim = self.issuer.claim_planet(setup.x, setup.y, setup.faction)?;
        let location = self.game.create_planet(id, &claim)?;
        self.players.insert(setup.name.clone(), (id, location));
        self.order.push(setup.name.clone());
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<(PlayerId, LocationId), ScenarioError> {
        self.players
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownPlayer(name.to_string()))
    }

    /// Play one step.
    ///
    /// Core rejections are returned inside the inner result; unknown
    /// players abort the run.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnknownPlayer`] if the step names a player
    /// that was never founded.
    pub fn play(
        &mut self,
        step: &Step,
    ) -> Result<conquest_core::error::Result<Option<Resolution>>, ScenarioError> {
        Ok(match step {
            Step::Defend {
                player,
                defense,
                salt,
            } => {
                let (id, location) = self.lookup(player)?;
                let (bs, ds, cr, odp) = *defense;
                let defense = PlanetaryDefense::new(bs, ds, cr, odp);
                self.issuer
                    .claim_defense(&defense, &Salt::from_u64(*salt))
                    .and_then(|claim| self.game.defend_planet(id, location, &claim))
                    .map(|()| None)
            }
            Step::Attack {
                player,
                target,
                fleet,
            } => {
                let (id, attacker) = self.lookup(player)?;
                let (_, defender) = self.lookup(target)?;
                let faction = self
                    .game
                    .planet(&attacker)
                    .map_or(Faction::A, |planet| planet.faction);
                let (bs, ds, cr, tt) = *fleet;
                let fleet = AttackFleet::new(faction, bs, ds, cr, tt);
                self.game
                    .launch_attack(id, attacker, defender, fleet)
                    .map(|()| None)
            }
            Step::Resolve {
                player,
                defense,
                salt,
            } => {
                let (id, location) = self.lookup(player)?;
                let (bs, ds, cr, odp) = *defense;
                let defense = PlanetaryDefense::new(bs, ds, cr, odp);
                let stored = self
                    .game
                    .planet(&location)
                    .map(|planet| planet.incoming_attack)
                    .unwrap_or_else(AttackFleet::empty);
                self.issuer
                    .claim_battle(&stored, &defense, &Salt::from_u64(*salt))
                    .and_then(|claim| self.game.resolve_attack(id, location, &claim))
                    .map(Some)
            }
            Step::Forfeit { player, target } => {
                let (id, _) = self.lookup(player)?;
                let (_, defender) = self.lookup(target)?;
                self.game.forfeit_planet(id, defender).map(Some)
            }
            Step::Advance { blocks } => {
                self.game.clock().advance(*blocks);
                Ok(None)
            }
        })
    }

    /// Play every step and summarize the final state.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::UnknownPlayer`] if a step names a player
    /// that was never founded.
    pub fn run(&mut self, scenario: &Scenario) -> Result<ScenarioOutcome, ScenarioError> {
        let mut steps = Vec::with_capacity(scenario.steps.len());
        for (index, step) in scenario.steps.iter().enumerate() {
            let height = self.game.clock().current_height();
            let result = self.play(step)?;
            if let Err(e) = &result {
                tracing::warn!(index, action = step.action(), error = %e, "Step rejected");
            }
            let (resolution, error, message) = match result {
                Ok(resolution) => (resolution, None, None),
                Err(e) => (None, Some(e.kind()), Some(e.to_string())),
            };
            steps.push(StepResult {
                index,
                action: step.action().to_string(),
                height,
                error,
                message,
                resolution,
            });
        }

        Ok(ScenarioOutcome {
            name: scenario.name.clone(),
            strategy: self.issuer.strategy().name().to_string(),
            final_height: self.game.clock().current_height(),
            state_hash: self.game.state_hash(),
            planets: self.summaries(),
            steps,
        })
    }

    fn summaries(&self) -> Vec<PlanetSummary> {
        self.order
            .iter()
            .filter_map(|name| {
                let (_, location) = self.players.get(name)?;
                let planet = self.game.planet(location)?;
                Some(PlanetSummary {
                    player: name.clone(),
                    location: location.to_string(),
                    faction: planet.faction,
                    points: planet.points,
                    state: planet.state(),
                })
            })
            .collect()
    }

    /// The game being driven.
    #[must_use]
    pub const fn game(&self) -> &Game {
        &self.game
    }

    /// Finish the run and hand back the journal, if one was kept.
    pub fn take_journal(&mut self) -> Option<Journal> {
        self.game.take_journal()
    }
}

/// Found the players and play the steps on a fresh game.
///
/// # Errors
///
/// See [`ScenarioRunner::new`] and [`ScenarioRunner::run`].
pub fn run_scenario(scenario: &Scenario) -> Result<ScenarioOutcome, ScenarioError> {
    tracing::info!(name = %scenario.name, steps = scenario.steps.len(), "Running scenario");
    ScenarioRunner::new(scenario, false)?.run(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conquest_test_utils::fixtures::find_suitable_coordinates;

    fn duel(config: &GameConfig, steps: Vec<Step>) -> Scenario {
        let coords = find_suitable_coordinates(config, 2);
        Scenario {
            name: "duel".to_string(),
            description: String::new(),
            config: Some(config.clone()),
            strategy: StrategyKind::BinaryWinner,
            players: vec![
                PlayerSetup {
                    name: "alice".to_string(),
                    x: coords[0].0,
                    y: coords[0].1,
                    faction: 3,
                },
                PlayerSetup {
                    name: "bob".to_string(),
                    x: coords[1].0,
                    y: coords[1].1,
                    faction: 3,
                },
            ],
            steps,
        }
    }

    fn defended(mut steps: Vec<Step>) -> Vec<Step> {
        let mut all = vec![
            Step::Defend {
                player: "alice".to_string(),
                defense: (2, 2, 2, 4),
                salt: 1,
            },
            Step::Defend {
                player: "bob".to_string(),
                defense: (2, 2, 2, 4),
                salt: 2,
            },
        ];
        all.append(&mut steps);
        all
    }

    fn config() -> GameConfig {
        GameConfig::default()
            .with_difficulty_bits(4)
            .with_forfeit_blocks(10)
    }

    #[test]
    fn test_attack_and_resolve() {
        let config = config();
        let scenario = duel(
            &config,
            defended(vec![
                Step::Attack {
                    player: "alice".to_string(),
                    target: "bob".to_string(),
                    fleet: (30, 30, 10, 20),
                },
                Step::Resolve {
                    player: "bob".to_string(),
                    defense: (2, 2, 2, 4),
                    salt: 2,
                },
            ]),
        );

        let outcome = run_scenario(&scenario).unwrap();
        assert_eq!(outcome.failed_steps(), 0);
        let resolution = outcome.steps[3].resolution.unwrap();
        assert!(!resolution.defender_won);
        assert_eq!(outcome.planets[0].points, config.initial_points + config.win_points);
        assert_eq!(outcome.planets[1].points, config.initial_points - config.lose_points);
        assert_eq!(outcome.planets[1].state, PlanetState::Defended);
    }

    #[test]
    fn test_rejected_steps_are_recorded() {
        let scenario = duel(
            &config(),
            vec![Step::Attack {
                player: "alice".to_string(),
                target: "bob".to_string(),
                fleet: (1, 0, 0, 0),
            }],
        );
        let outcome = run_scenario(&scenario).unwrap();
        assert_eq!(outcome.failed_steps(), 1);
        assert_eq!(outcome.steps[0].error, Some(ErrorKind::AttackerHasNoDefense));
    }

    #[test]
    fn test_forfeit_after_advance() {
        let scenario = duel(
            &config(),
            defended(vec![
                Step::Attack {
                    player: "alice".to_string(),
                    target: "bob".to_string(),
                    fleet: (2, 2, 2, 0),
                },
                Step::Forfeit {
                    player: "alice".to_string(),
                    target: "bob".to_string(),
                },
                Step::Advance { blocks: 10 },
                Step::Forfeit {
                    player: "alice".to_string(),
                    target: "bob".to_string(),
                },
            ]),
        );
        let outcome = run_scenario(&scenario).unwrap();
        assert_eq!(outcome.steps[3].error, Some(ErrorKind::ForfeitTooEarly));
        assert!(outcome.steps[5].is_ok());
        assert_eq!(outcome.final_height, 11);
    }

    #[test]
    fn test_unknown_player() {
        let scenario = duel(
            &config(),
            vec![Step::Forfeit {
                player: "carol".to_string(),
                target: "bob".to_string(),
            }],
        );
        assert!(matches!(
            run_scenario(&scenario),
            Err(ScenarioError::UnknownPlayer(name)) if name == "carol"
        ));
    }

    #[test]
    fn test_duplicate_player() {
        let config = config();
        let mut scenario = duel(&config, Vec::new());
        scenario.players[1].name = "alice".to_string();
        assert!(matches!(
            ScenarioRunner::new(&scenario, false),
            Err(ScenarioError::DuplicatePlayer(_))
        ));
    }

    #[test]
    fn test_parse_ron() {
        let scenario = Scenario::from_ron_str(
            r#"(
                name: "tiny",
                players: [(name: "alice", x: 1, y: 2, faction: 1)],
                steps: [Advance(blocks: 5)],
            )"#,
        )
        .unwrap();
        assert_eq!(scenario.strategy, StrategyKind::BinaryWinner);
        assert!(scenario.config.is_none());
        assert_eq!(scenario.steps, vec![Step::Advance { blocks: 5 }]);
    }

    #[test]
    fn test_fallback_config_only_fills_gaps() {
        let fallback = GameConfig::default().with_forfeit_blocks(77);

        let bare = Scenario::from_ron_str(r#"(name: "bare", players: [], steps: [])"#)
            .unwrap()
            .or_config(fallback.clone());
        assert_eq!(bare.game_config().forfeit_blocks_duration, 77);

        let own = duel(&config(), Vec::new()).or_config(fallback);
        assert_eq!(own.game_config(), config());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Scenario::load("does/not/exist.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_journal_replays() {
        let scenario = duel(
            &config(),
            defended(vec![Step::Attack {
                player: "alice".to_string(),
                target: "bob".to_string(),
                fleet: (30, 30, 10, 20),
            }]),
        );
        let mut runner = ScenarioRunner::new(&scenario, true).unwrap();
        let outcome = runner.run(&scenario).unwrap();
        let journal = runner.take_journal().unwrap();
        assert_eq!(journal.verify().unwrap().state_hash(), outcome.state_hash);
    }
}
