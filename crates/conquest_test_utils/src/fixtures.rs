//! Test fixtures and helpers.
//!
//! Pre-built configurations, players, fleets and a small [`TestWorld`] that
//! wires a game to a claim issuer sharing its seal key.

use conquest_core::prelude::*;

/// Configuration for tests: a light suitability filter and a short forfeit window.
#[must_use]
pub fn test_config() -> GameConfig {
    GameConfig::default()
        .with_difficulty_bits(4)
        .with_forfeit_blocks(10)
}

/// Deterministic player identity.
#[must_use]
pub fn player(name: &str) -> PlayerId {
    PlayerId::from_name(name)
}

/// First `count` suitable coordinates, scanning row by row from `(0, 0)`.
#[must_use]
pub fn find_suitable_coordinates(config: &GameConfig, count: usize) -> Vec<(u64, u64)> {
    let max = config.max_map_length;
    (0..=max)
        .flat_map(|y| (0..=max).map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let location = location_id(Coordinates::new(x, y), config.chain_hash_times);
            is_suitable(&location, config.birthing_difficulty)
        })
        .take(count)
        .collect()
}

/// First coordinates that fail the suitability filter.
#[must_use]
pub fn find_unsuitable_coordinates(config: &GameConfig) -> Option<(u64, u64)> {
    let max = config.max_map_length;
    (0..=max).map(|x| (x, 0)).find(|&(x, y)| {
        let location = location_id(Coordinates::new(x, y), config.chain_hash_times);
        !is_suitable(&location, config.birthing_difficulty)
    })
}

/// A modest defense: two of each ship and four platforms.
#[must_use]
pub const fn balanced_defense() -> PlanetaryDefense {
    PlanetaryDefense::new(2, 2, 2, 4)
}

/// A fleet matching [`balanced_defense`] type for type (advantage exactly 0).
#[must_use]
pub const fn mirror_fleet(faction: Faction) -> AttackFleet {
    AttackFleet::new(faction, 2, 2, 2, 0)
}

/// A fleet that beats [`balanced_defense`] under the binary winner formula
/// and lands troops under the phased simulation.
#[must_use]
pub const fn winning_fleet(faction: Faction) -> AttackFleet {
    AttackFleet::new(faction, 30, 30, 10, 20)
}

/// A fleet that loses to [`balanced_defense`] under the binary winner formula.
#[must_use]
pub const fn losing_fleet(faction: Faction) -> AttackFleet {
    AttackFleet::new(faction, 0, 0, 1, 0)
}

/// A game plus an issuer that seals claims the game accepts.
#[derive(Debug)]
pub struct TestWorld {
    /// The game under test.
    pub game: Game,
    /// Claim issuer sharing the game's default seal key.
    pub issuer: ClaimIssuer,
    coordinates: Vec<(u64, u64)>,
    next: usize,
}

impl TestWorld {
    /// World with [`test_config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// World with a custom configuration.
    #[must_use]
    pub fn with_config(config: GameConfig) -> Self {
        Self {
            coordinates: find_suitable_coordinates(&config, 16),
            issuer: ClaimIssuer::with_defaults(config.clone()),
            game: Game::new(config),
            next: 0,
        }
    }

    /// Enable journaling on the game.
    #[must_use]
    pub fn journaled(mut self) -> Self {
        self.game = self.game.with_journal();
        self
    }

    /// Found a homeworld for `name` at the next suitable coordinates.
    ///
    /// # Panics
    ///
    /// Panics if the fixture runs out of coordinates or creation fails.
    pub fn found(&mut self, name: &str, faction: Faction) -> (PlayerId, LocationId) {
        let (x, y) = self.coordinates[self.next];
        self.next += 1;
        let id = player(name);
        let claim = self
            .issuer
            .claim_planet(x, y, faction.code())
            .expect("fixture coordinates are suitable");
        let location = self
            .game
            .create_planet(id, &claim)
            .expect("fixture planet creation succeeds");
        (id, location)
    }

    /// Commit `defense` for `location` with a salt derived from `salt`.
    ///
    /// # Errors
    ///
    /// Returns whatever the issuer or the game rejects.
    pub fn defend(
        &mut self,
        owner: PlayerId,
        location: LocationId,
        defense: &PlanetaryDefense,
        salt: u64,
    ) -> Result<()> {
        let claim = self.issuer.claim_defense(defense, &Salt::from_u64(salt))?;
        self.game.defend_planet(owner, location, &claim)
    }

    /// Resolve the pending attack on `defender` as its owner.
    ///
    /// The battle is fought against the attack currently stored on the planet.
    ///
    /// # Errors
    ///
    /// Returns whatever the game rejects, or [`ConquestError::PlanetNotFound`].
    pub fn resolve(
        &mut self,
        owner: PlayerId,
        defender: LocationId,
        defense: &PlanetaryDefense,
        salt: u64,
    ) -> Result<Resolution> {
        let stored = self
            .game
            .planet(&defender)
            .ok_or(ConquestError::PlanetNotFound(defender))?;
        let claim =
            self.issuer
                .claim_battle(&stored.incoming_attack, defense, &Salt::from_u64(salt))?;
        self.game.resolve_attack(owner, defender, &claim)
    }

    /// Two defended faction-C planets, for attack scenarios.
    ///
    /// Returns `((attacker_player, attacker_planet), (defender_player, defender_planet))`.
    ///
    /// # Panics
    ///
    /// Panics if the fixture setup fails.
    pub fn two_defended_planets(&mut self) -> ((PlayerId, LocationId), (PlayerId, LocationId)) {
        let (alice, a) = self.found("alice", Faction::C);
        let (bob, b) = self.found("bob", Faction::C);
        self.defend(alice, a, &balanced_defense(), 1)
            .expect("fixture defense is valid");
        self.defend(bob, b, &balanced_defense(), 2)
            .expect("fixture defense is valid");
        ((alice, a), (bob, b))
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
