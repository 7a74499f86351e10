//! The planet lifecycle state machine.
//!
//! [`Game`] owns the ledger and the clock and exposes the five lifecycle
//! operations. Each operation takes `&mut self`, checks every precondition
//! against the current ledger state and then commits a single
//! [`WriteBatch`]. A failed precondition returns before anything is written.
//!
//! ```text
//! Unclaimed ─create─▶ Undefended ─defend─▶ Defended ─launch─▶ UnderAttack
//!                                             ▲                  │
//!                                             └─resolve/forfeit──┘
//! ```

use serde::{Deserialize, Serialize};

use crate::claims::{BattleClaim, ClaimVerifier, DefenseClaim, PlanetClaim, TrustingVerifier, VerifiedClaim};
use crate::commitment::{LocationId, PlayerId};
use crate::config::GameConfig;
use crate::error::{ConquestError, Result};
use crate::fleet::{AttackFleet, UnitCounts};
use crate::journal::{Journal, JournalAction, JournalEntry};
use crate::ledger::{Clock, Ledger, ManualClock, MemoryLedger, WriteBatch};
use crate::planet::Planet;

/// Who won a resolved or forfeited attack, and the resulting scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether the defender held.
    pub defender_won: bool,
    /// Attacking planet.
    pub attacker: LocationId,
    /// Defending planet.
    pub defender: LocationId,
    /// Attacker points after the resolution.
    pub attacker_points: i64,
    /// Defender points after the resolution.
    pub defender_points: i64,
}

/// The lifecycle state machine.
#[derive(Debug)]
pub struct Game<L = MemoryLedger, C = ManualClock> {
    config: GameConfig,
    ledger: L,
    clock: C,
    verifier: Box<dyn ClaimVerifier>,
    journal: Option<Journal>,
}

impl Game {
    /// In-memory game with a manual clock at height 1 and the default verifier.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self::with_parts(
            config,
            MemoryLedger::new(),
            ManualClock::new(1),
            Box::new(TrustingVerifier::default()),
        )
    }
}

impl<L: Ledger, C: Clock> Game<L, C> {
    /// Assemble a game from its collaborators.
    #[must_use]
    pub fn with_parts(
        config: GameConfig,
        ledger: L,
        clock: C,
        verifier: Box<dyn ClaimVerifier>,
    ) -> Self {
        Self {
            config,
            ledger,
            clock,
            verifier,
            journal: None,
        }
    }

    /// Start recording every successful operation.
    #[must_use]
    pub fn with_journal(mut self) -> Self {
        self.journal = Some(Journal::new(self.config.clone()));
        self
    }

    /// Game configuration.
    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Recorded operations, if journaling is enabled.
    #[must_use]
    pub const fn journal(&self) -> Option<&Journal> {
        self.journal.as_ref()
    }

    /// Stop journaling and return the journal, finalized with the current state.
    pub fn take_journal(&mut self) -> Option<Journal> {
        let height = self.clock.current_height();
        let hash = self.state_hash();
        self.journal.take().map(|mut journal| {
            journal.finalize(height, hash);
            journal
        })
    }

    fn record(&mut self, caller: PlayerId, action: JournalAction) {
        if let Some(journal) = self.journal.as_mut() {
            journal.record(JournalEntry {
                height: self.clock.current_height(),
                caller,
                action,
            });
        }
    }

    fn existing(&self, location: &LocationId) -> Result<Planet> {
        self.ledger
            .planet(location)
            .ok_or(ConquestError::PlanetNotFound(*location))
    }

    fn owned(&self, caller: &PlayerId, location: &LocationId) -> Result<Planet> {
        let planet = self.existing(location)?;
        if planet.owner != *caller {
            return Err(ConquestError::NotOwner(*location));
        }
        Ok(planet)
    }

    fn commit(&mut self, batch: WriteBatch) {
        self.ledger.commit(batch);
        #[cfg(feature = "debug-validation")]
        self.validate_ledger();
    }

    #[cfg(feature = "debug-validation")]
    fn validate_ledger(&self) {
        let planets = self.ledger.planets();
        debug_assert_eq!(planets.len() as u64, self.ledger.number_of_planets());
        for planet in &planets {
            debug_assert!(self.ledger.player_has_homeworld(&planet.owner));
            debug_assert!(self.ledger.location_claimed(&planet.location));
            if planet.is_under_attack() {
                debug_assert!(self.ledger.planet(&planet.incoming_attack.attacker).is_some());
            }
        }
    }

    fn rejected<T>(operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(ref e) = result {
            tracing::debug!(operation, kind = ?e.kind(), error = %e, "Operation rejected");
        }
        result
    }

    /// Found a homeworld at the claimed location.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::ClaimRejected`] if the claim does not verify.
    /// - [`ConquestError::MaxPlanetsReached`] once the planet cap is hit.
    /// - [`ConquestError::AlreadyHasHomeworld`] if `caller` already owns a planet.
    /// - [`ConquestError::LocationAlreadyClaimed`] if the location is taken.
    pub fn create_planet(
        &mut self,
        caller: PlayerId,
        claim: &VerifiedClaim<PlanetClaim>,
    ) -> Result<LocationId> {
        let result = self.try_create_planet(caller, claim);
        let location = Self::rejected("create_planet", result)?;
        self.record(caller, JournalAction::CreatePlanet(claim.clone()));
        Ok(location)
    }

    fn try_create_planet(
        &mut self,
        caller: PlayerId,
        claim: &VerifiedClaim<PlanetClaim>,
    ) -> Result<LocationId> {
        let PlanetClaim { location, faction } = *claim.open(self.verifier.as_ref())?;

        let count = self.ledger.number_of_planets();
        if count >= self.config.max_planets {
            return Err(ConquestError::MaxPlanetsReached(self.config.max_planets));
        }
        if self.ledger.player_has_homeworld(&caller) {
            return Err(ConquestError::AlreadyHasHomeworld);
        }
        if self.ledger.location_claimed(&location) {
            return Err(ConquestError::LocationAlreadyClaimed(location));
        }

        let planet = Planet::new(caller, location, faction, self.config.initial_points);
        self.commit(WriteBatch {
            number_of_planets: Some(count + 1),
            planets: vec![planet],
            homeworlds: vec![caller],
            claimed_locations: vec![location],
        });

        tracing::info!(%location, owner = %caller, ?faction, "Planet created");
        Ok(location)
    }

    /// Commit a new hidden defense for an owned planet.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::PlanetNotFound`] / [`ConquestError::NotOwner`].
    /// - [`ConquestError::ClaimRejected`] if the claim does not verify.
    /// - [`ConquestError::PlanetUnderAttack`] while an attack is outstanding.
    /// - [`ConquestError::DefenseCrewTooHigh`] if the claimed crew exceeds the maximum.
    pub fn defend_planet(
        &mut self,
        caller: PlayerId,
        location: LocationId,
        claim: &VerifiedClaim<DefenseClaim>,
    ) -> Result<()> {
        let result = self.try_defend_planet(caller, location, claim);
        Self::rejected("defend_planet", result)?;
        self.record(
            caller,
            JournalAction::DefendPlanet {
                location,
                claim: claim.clone(),
            },
        );
        Ok(())
    }

    fn try_defend_planet(
        &mut self,
        caller: PlayerId,
        location: LocationId,
        claim: &VerifiedClaim<DefenseClaim>,
    ) -> Result<()> {
        let mut planet = self.owned(&caller, &location)?;
        let DefenseClaim {
            defense_commitment,
            crew_needed,
        } = *claim.open(self.verifier.as_ref())?;

        if planet.is_under_attack() {
            return Err(ConquestError::PlanetUnderAttack(location));
        }
        if crew_needed > self.config.max_defense_crew {
            return Err(ConquestError::DefenseCrewTooHigh {
                crew: crew_needed,
                max: self.config.max_defense_crew,
            });
        }

        planet.defense_commitment = defense_commitment;
        planet.defense_manpower = crew_needed;
        self.commit(WriteBatch::new().planet(planet));

        tracing::info!(%location, crew = crew_needed, "Defense committed");
        Ok(())
    }

    /// Send `fleet` from `attacker` against `defender`.
    ///
    /// The stored fleet is stamped with `attacker` and the current height.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::PlanetNotFound`] if either planet is missing.
    /// - [`ConquestError::NotOwner`] if `caller` does not own `attacker`.
    /// - [`ConquestError::SelfAttackForbidden`] if both locations are the same.
    /// - [`ConquestError::AttackerHasNoDefense`] / [`ConquestError::DefenderHasNoDefense`].
    /// - [`ConquestError::PlanetUnderAttack`] if the defender already has an attack pending.
    /// - [`ConquestError::AttackCostTooHigh`] if the fleet costs too much.
    /// - [`ConquestError::FactionMismatch`] if the fleet faction differs from the attacker's.
    pub fn launch_attack(
        &mut self,
        caller: PlayerId,
        attacker: LocationId,
        defender: LocationId,
        fleet: AttackFleet,
    ) -> Result<()> {
        let result = self.try_launch_attack(caller, attacker, defender, fleet);
        Self::rejected("launch_attack", result)?;
        self.record(
            caller,
            JournalAction::LaunchAttack {
                attacker,
                defender,
                fleet,
            },
        );
        Ok(())
    }

    fn try_launch_attack(
        &mut self,
        caller: PlayerId,
        attacker: LocationId,
        defender: LocationId,
        fleet: AttackFleet,
    ) -> Result<()> {
        let attacking = self.existing(&attacker)?;
        let mut defending = self.existing(&defender)?;

        if attacking.owner != caller {
            return Err(ConquestError::NotOwner(attacker));
        }
        if attacker == defender {
            return Err(ConquestError::SelfAttackForbidden);
        }
        if !attacking.is_defended() {
            return Err(ConquestError::AttackerHasNoDefense);
        }
        if !defending.is_defended() {
            return Err(ConquestError::DefenderHasNoDefense);
        }
        if defending.is_under_attack() {
            return Err(ConquestError::PlanetUnderAttack(defender));
        }
        let cost = fleet.total_cost(&self.config.units);
        if cost > self.config.max_attack_cost {
            return Err(ConquestError::AttackCostTooHigh {
                cost,
                max: self.config.max_attack_cost,
            });
        }
        if fleet.faction != attacking.faction {
            return Err(ConquestError::FactionMismatch);
        }

        // Height zero marks an idle slot.
        let height = self.clock.current_height().max(1);
        defending.incoming_attack = fleet.launched_from(attacker);
        defending.incoming_attack_time = height;
        self.commit(WriteBatch::new().planet(defending));

        tracing::info!(%attacker, %defender, cost, height, "Attack launched");
        Ok(())
    }

    /// Settle the outstanding attack on `defender` with a battle claim.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::PlanetNotFound`] / [`ConquestError::NotOwner`].
    /// - [`ConquestError::ClaimRejected`] if the claim does not verify.
    /// - [`ConquestError::PlanetNotUnderAttack`] if no attack is pending.
    /// - [`ConquestError::DefenseCommitmentMismatch`] if the claim used another defense.
    /// - [`ConquestError::AttackFleetMismatch`] if the claim used another fleet.
    pub fn resolve_attack(
        &mut self,
        caller: PlayerId,
        defender: LocationId,
        claim: &VerifiedClaim<BattleClaim>,
    ) -> Result<Resolution> {
        let result = self.try_resolve_attack(caller, defender, claim);
        let resolution = Self::rejected("resolve_attack", result)?;
        self.record(
            caller,
            JournalAction::ResolveAttack {
                defender,
                claim: claim.clone(),
            },
        );
        Ok(resolution)
    }

    fn try_resolve_attack(
        &mut self,
        caller: PlayerId,
        defender: LocationId,
        claim: &VerifiedClaim<BattleClaim>,
    ) -> Result<Resolution> {
        let mut defending = self.owned(&caller, &defender)?;
        let BattleClaim {
            defender_won,
            defense_commitment,
            attacking_fleet,
        } = *claim.open(self.verifier.as_ref())?;

        if !defending.is_under_attack() {
            return Err(ConquestError::PlanetNotUnderAttack(defender));
        }
        if defense_commitment != defending.defense_commitment {
            return Err(ConquestError::DefenseCommitmentMismatch);
        }
        if attacking_fleet.digest() != defending.incoming_attack.digest() {
            return Err(ConquestError::AttackFleetMismatch);
        }
        let attacker = defending.incoming_attack.attacker;
        let mut attacking = self.existing(&attacker)?;

        if defender_won {
            defending.points = defending.points.saturating_add(self.config.win_points);
            attacking.points = attacking.points.saturating_sub(self.config.lose_points);
        } else {
            attacking.points = attacking.points.saturating_add(self.config.win_points);
            defending.points = defending.points.saturating_sub(self.config.lose_points);
        }
        defending.clear_attack();

        let resolution = Resolution {
            defender_won,
            attacker,
            defender,
            attacker_points: attacking.points,
            defender_points: defending.points,
        };
        self.commit(WriteBatch::new().planet(attacking).planet(defending));

        tracing::info!(
            %attacker,
            %defender,
            defender_won,
            attacker_points = resolution.attacker_points,
            defender_points = resolution.defender_points,
            "Attack resolved"
        );
        Ok(resolution)
    }

    /// Claim victory over a defender who let the forfeit window pass.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::PlanetNotFound`] if the defender is missing.
    /// - [`ConquestError::PlanetNotUnderAttack`] if no attack is pending.
    /// - [`ConquestError::NotTheAttacker`] if `caller` does not own the recorded attacker.
    /// - [`ConquestError::ForfeitTooEarly`] before the window has elapsed.
    pub fn forfeit_planet(&mut self, caller: PlayerId, defender: LocationId) -> Result<Resolution> {
        let result = self.try_forfeit_planet(caller, defender);
        let resolution = Self::rejected("forfeit_planet", result)?;
        self.record(caller, JournalAction::ForfeitPlanet { defender });
        Ok(resolution)
    }

    fn try_forfeit_planet(&mut self, caller: PlayerId, defender: LocationId) -> Result<Resolution> {
        let mut defending = self.existing(&defender)?;
        if !defending.is_under_attack() {
            return Err(ConquestError::PlanetNotUnderAttack(defender));
        }
        let attacker = defending.incoming_attack.attacker;
        let mut attacking = self.existing(&attacker)?;
        if attacking.owner != caller {
            return Err(ConquestError::NotTheAttacker);
        }
        let current = self.clock.current_height();
        let available_at = defending
            .incoming_attack_time
            .saturating_add(self.config.forfeit_blocks_duration);
        if current < available_at {
            return Err(ConquestError::ForfeitTooEarly {
                current,
                available_at,
            });
        }

        attacking.points = attacking.points.saturating_add(self.config.win_points);
        defending.points = defending.points.saturating_sub(self.config.forfeit_points);
        defending.clear_attack();

        let resolution = Resolution {
            defender_won: false,
            attacker,
            defender,
            attacker_points: attacking.points,
            defender_points: defending.points,
        };
        self.commit(WriteBatch::new().planet(attacking).planet(defending));

        tracing::info!(%attacker, %defender, height = current, "Forfeit claimed");
        Ok(resolution)
    }

    /// Planet at `location`.
    #[must_use]
    pub fn planet(&self, location: &LocationId) -> Option<Planet> {
        self.ledger.planet(location)
    }

    /// Number of planets created.
    #[must_use]
    pub fn planet_count(&self) -> u64 {
        self.ledger.number_of_planets()
    }

    /// Whether `player` owns a homeworld.
    #[must_use]
    pub fn has_homeworld(&self, player: &PlayerId) -> bool {
        self.ledger.player_has_homeworld(player)
    }

    /// Whether `location` has been claimed.
    #[must_use]
    pub fn is_location_claimed(&self, location: &LocationId) -> bool {
        self.ledger.location_claimed(location)
    }

    /// Whether the attacker could claim a forfeit on `location` right now.
    #[must_use]
    pub fn is_forfeitable(&self, location: &LocationId) -> bool {
        self.ledger.planet(location).is_some_and(|planet| {
            planet.is_under_attack()
                && self.clock.current_height().saturating_sub(planet.incoming_attack_time)
                    >= self.config.forfeit_blocks_duration
        })
    }

    /// Digest of the ledger contents in location order.
    ///
    /// Two games with identical ledgers produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.ledger.number_of_planets().to_le_bytes());
        for planet in self.ledger.planets() {
            planet.hash_into(&mut hasher);
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::ClaimIssuer;
    use crate::commitment::Salt;
    use crate::error::ErrorKind;
    use crate::factions::Faction;
    use crate::fleet::PlanetaryDefense;

    fn config() -> GameConfig {
        GameConfig::default()
            .with_difficulty_bits(0)
            .with_forfeit_blocks(10)
    }

    struct World {
        game: Game,
        issuer: ClaimIssuer,
        alice: PlayerId,
        bob: PlayerId,
        a: LocationId,
        b: LocationId,
    }

    fn world() -> World {
        let mut game = Game::new(config());
        let issuer = ClaimIssuer::with_defaults(config());
        let alice = PlayerId::from_name("alice");
        let bob = PlayerId::from_name("bob");
        let a = game
            .create_planet(alice, &issuer.claim_planet(1, 2, 3).unwrap())
            .unwrap();
        let b = game
            .create_planet(bob, &issuer.claim_planet(3, 4, 3).unwrap())
            .unwrap();
        World {
            game,
            issuer,
            alice,
            bob,
            a,
            b,
        }
    }

    fn defend(w: &mut World, player: PlayerId, location: LocationId, defense: PlanetaryDefense) {
        let claim = w.issuer.claim_defense(&defense, &Salt::from_u64(9)).unwrap();
        w.game.defend_planet(player, location, &claim).unwrap();
    }

    #[test]
    fn test_create_planet_sets_nullifiers() {
        let w = world();
        assert_eq!(w.game.planet_count(), 2);
        assert!(w.game.has_homeworld(&w.alice));
        assert!(w.game.is_location_claimed(&w.a));
        let planet = w.game.planet(&w.a).unwrap();
        assert_eq!(planet.points, 100);
        assert_eq!(planet.faction, Faction::C);
    }

    #[test]
    fn test_create_twice_fails() {
        let mut w = world();
        let claim = w.issuer.claim_planet(5, 5, 1).unwrap();
        let err = w.game.create_planet(w.alice, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyHasHomeworld);

        let carol = PlayerId::from_name("carol");
        let taken = w.issuer.claim_planet(1, 2, 1).unwrap();
        let err = w.game.create_planet(carol, &taken).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocationAlreadyClaimed);
        assert_eq!(w.game.planet_count(), 2);
    }

    #[test]
    fn test_planet_cap() {
        let mut game = Game::new(config().with_max_planets(1));
        let issuer = ClaimIssuer::with_defaults(config());
        game.create_planet(PlayerId::from_name("a"), &issuer.claim_planet(1, 1, 1).unwrap())
            .unwrap();
        let err = game
            .create_planet(PlayerId::from_name("b"), &issuer.claim_planet(2, 2, 1).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MaxPlanetsReached);
    }

    #[test]
    fn test_rejected_claim_writes_nothing() {
        let issuer = ClaimIssuer::with_defaults(config());
        let mut game = Game::with_parts(
            config(),
            MemoryLedger::new(),
            ManualClock::new(1),
            Box::new(crate::claims::RejectingVerifier),
        );
        let err = game
            .create_planet(PlayerId::from_name("a"), &issuer.claim_planet(1, 1, 1).unwrap())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClaimRejected);
        assert_eq!(game.planet_count(), 0);
    }

    #[test]
    fn test_defend_preconditions() {
        let mut w = world();
        let claim = w
            .issuer
            .claim_defense(&PlanetaryDefense::new(1, 1, 1, 1), &Salt::from_u64(1))
            .unwrap();

        let err = w.game.defend_planet(w.alice, LocationId::ZERO, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanetNotFound);

        let err = w.game.defend_planet(w.alice, w.b, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);

        w.game.defend_planet(w.alice, w.a, &claim).unwrap();
        assert_eq!(w.game.planet(&w.a).unwrap().defense_manpower, 320);
    }

    #[test]
    fn test_lookup_errors_precede_seal_check() {
        let mut w = world();
        let forged = ClaimIssuer::new(
            config(),
            crate::combat::StrategyKind::default().build(&config()),
            crate::claims::SealKey::derive(b"forged"),
        );
        let defense = PlanetaryDefense::new(1, 1, 1, 1);
        let claim = forged.claim_defense(&defense, &Salt::from_u64(1)).unwrap();

        let err = w.game.defend_planet(w.alice, LocationId::ZERO, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanetNotFound);
        let err = w.game.defend_planet(w.alice, w.b, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        let err = w.game.defend_planet(w.alice, w.a, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClaimRejected);

        let battle = forged
            .claim_battle(&AttackFleet::new(Faction::C, 1, 0, 0, 0), &defense, &Salt::from_u64(1))
            .unwrap();
        let err = w.game.resolve_attack(w.alice, LocationId::ZERO, &battle).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanetNotFound);
        let err = w.game.resolve_attack(w.alice, w.b, &battle).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        let err = w.game.resolve_attack(w.alice, w.a, &battle).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClaimRejected);
    }

    #[test]
    fn test_launch_requires_defenses() {
        let mut w = world();
        let fleet = AttackFleet::new(Faction::C, 1, 0, 0, 0);
        let err = w.game.launch_attack(w.alice, w.a, w.b, fleet).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AttackerHasNoDefense);

        let (alice, bob, a, b) = (w.alice, w.bob, w.a, w.b);
        defend(&mut w, alice, a, PlanetaryDefense::new(1, 0, 0, 0));
        let err = w.game.launch_attack(alice, a, b, fleet).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DefenderHasNoDefense);

        defend(&mut w, bob, b, PlanetaryDefense::new(1, 0, 0, 0));
        w.game.launch_attack(alice, a, b, fleet).unwrap();

        let stored = w.game.planet(&b).unwrap();
        assert_eq!(stored.incoming_attack.attacker, a);
        assert_eq!(stored.incoming_attack_time, 1);

        let err = w.game.launch_attack(alice, a, b, fleet).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanetUnderAttack);
    }

    #[test]
    fn test_launch_argument_checks() {
        let mut w = world();
        let (alice, bob, a, b) = (w.alice, w.bob, w.a, w.b);
        defend(&mut w, alice, a, PlanetaryDefense::new(1, 0, 0, 0));
        defend(&mut w, bob, b, PlanetaryDefense::new(1, 0, 0, 0));

        let fleet = AttackFleet::new(Faction::C, 1, 0, 0, 0);
        assert_eq!(
            w.game.launch_attack(bob, a, b, fleet).unwrap_err().kind(),
            ErrorKind::NotOwner
        );
        assert_eq!(
            w.game.launch_attack(alice, a, a, fleet).unwrap_err().kind(),
            ErrorKind::SelfAttackForbidden
        );
        assert_eq!(
            w.game
                .launch_attack(alice, a, b, AttackFleet::new(Faction::C, 1000, 0, 0, 0))
                .unwrap_err()
                .kind(),
            ErrorKind::AttackCostTooHigh
        );
        assert_eq!(
            w.game
                .launch_attack(alice, a, b, AttackFleet::new(Faction::A, 1, 0, 0, 0))
                .unwrap_err()
                .kind(),
            ErrorKind::FactionMismatch
        );
        assert!(!w.game.planet(&b).unwrap().is_under_attack());
    }

    #[test]
    fn test_forfeit_window() {
        let mut w = world();
        let (alice, bob, a, b) = (w.alice, w.bob, w.a, w.b);
        defend(&mut w, alice, a, PlanetaryDefense::new(1, 0, 0, 0));
        defend(&mut w, bob, b, PlanetaryDefense::new(1, 0, 0, 0));
        w.game
            .launch_attack(alice, a, b, AttackFleet::new(Faction::C, 1, 0, 0, 0))
            .unwrap();

        assert_eq!(
            w.game.forfeit_planet(bob, b).unwrap_err().kind(),
            ErrorKind::NotTheAttacker
        );

        w.game.clock().advance(9);
        assert!(!w.game.is_forfeitable(&b));
        assert_eq!(
            w.game.forfeit_planet(alice, b).unwrap_err().kind(),
            ErrorKind::ForfeitTooEarly
        );

        w.game.clock().advance(1);
        assert!(w.game.is_forfeitable(&b));
        let resolution = w.game.forfeit_planet(alice, b).unwrap();
        assert_eq!(resolution.attacker_points, 102);
        assert_eq!(resolution.defender_points, 98);
        assert!(!w.game.planet(&b).unwrap().is_under_attack());

        assert_eq!(
            w.game.forfeit_planet(alice, b).unwrap_err().kind(),
            ErrorKind::PlanetNotUnderAttack
        );
    }

    #[test]
    fn test_defend_while_under_attack() {
        let mut w = world();
        let (alice, bob, a, b) = (w.alice, w.bob, w.a, w.b);
        defend(&mut w, alice, a, PlanetaryDefense::new(1, 0, 0, 0));
        defend(&mut w, bob, b, PlanetaryDefense::new(1, 0, 0, 0));
        w.game
            .launch_attack(alice, a, b, AttackFleet::new(Faction::C, 1, 0, 0, 0))
            .unwrap();

        let claim = w
            .issuer
            .claim_defense(&PlanetaryDefense::new(5, 0, 0, 0), &Salt::from_u64(2))
            .unwrap();
        let err = w.game.defend_planet(bob, b, &claim).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PlanetUnderAttack);
    }

    #[test]
    fn test_state_hash_tracks_changes() {
        let mut w = world();
        let before = w.game.state_hash();
        assert_eq!(before, world().game.state_hash());
        let (alice, a) = (w.alice, w.a);
        defend(&mut w, alice, a, PlanetaryDefense::new(1, 0, 0, 0));
        assert_ne!(before, w.game.state_hash());
    }
}
