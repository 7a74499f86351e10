//! Verified claims and the local claim issuer.
//!
//! The state machine never re-derives locations, commitments or battle
//! verdicts. It receives them as [`VerifiedClaim`] payloads and only trusts a
//! payload after a [`ClaimVerifier`] accepts its seal.
//!
//! [`ClaimIssuer`] is the in-process producer: it runs the validity checks on
//! private inputs (coordinates, the hidden defense, the salt) and seals the
//! public output with a keyed blake3 digest. [`TrustingVerifier`] checks that
//! seal.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::combat::CombatStrategy;
use crate::commitment::{
    defense_commitment, is_suitable, location_id, Coordinates, DefenseCommitment, LocationId, Salt,
};
use crate::config::GameConfig;
use crate::error::{ConquestError, Result};
use crate::factions::Faction;
use crate::fleet::{AttackFleet, PlanetaryDefense, UnitCounts};

/// Public output of a claim, tagged with a domain so a seal for one kind of
/// claim can never be presented as another.
pub trait ClaimPayload: Serialize {
    /// Domain separation tag.
    const DOMAIN: &'static str;
}

/// Public output of a planet creation claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetClaim {
    /// Suitable location derived from the hidden coordinates.
    pub location: LocationId,
    /// Chosen faction.
    pub faction: Faction,
}

impl ClaimPayload for PlanetClaim {
    const DOMAIN: &'static str = "planet";
}

/// Public output of a defense claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefenseClaim {
    /// Commitment to the hidden defense.
    pub defense_commitment: DefenseCommitment,
    /// Crew the defense needs.
    pub crew_needed: u64,
}

impl ClaimPayload for DefenseClaim {
    const DOMAIN: &'static str = "defense";
}

/// Public output of a battle claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleClaim {
    /// Verdict of the combat strategy.
    pub defender_won: bool,
    /// Commitment to the defense the battle was fought with.
    pub defense_commitment: DefenseCommitment,
    /// The attack the battle was fought against.
    pub attacking_fleet: AttackFleet,
}

impl ClaimPayload for BattleClaim {
    const DOMAIN: &'static str = "battle";
}

/// Keyed digest over a claim payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seal(pub [u8; 32]);

/// A public claim output plus the seal vouching for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedClaim<T> {
    /// Trusted public output.
    pub payload: T,
    /// Seal produced by the issuer.
    pub seal: Seal,
}

impl<T: ClaimPayload> VerifiedClaim<T> {
    /// Return the payload if `verifier` accepts the seal.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::ClaimRejected`] if the seal does not verify or
    /// the payload cannot be encoded.
    pub fn open(&self, verifier: &dyn ClaimVerifier) -> Result<&T> {
        let message = claim_message(&self.payload)?;
        verifier.verify(&message, &self.seal)?;
        Ok(&self.payload)
    }
}

fn claim_message<T: ClaimPayload>(payload: &T) -> Result<Vec<u8>> {
    let mut message = T::DOMAIN.as_bytes().to_vec();
    message.push(0);
    let body = bincode::serialize(payload)
        .map_err(|e| ConquestError::ClaimRejected(format!("Failed to encode claim: {e}")))?;
    message.extend_from_slice(&body);
    Ok(message)
}

/// Key shared by an issuer and the verifier that trusts it.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SealKey([u8; 32]);

impl SealKey {
    /// Derive a key from arbitrary key material.
    #[must_use]
    pub fn derive(material: &[u8]) -> Self {
        Self(blake3::derive_key("planetary-conquest claim seal v1", material))
    }

    fn seal(&self, message: &[u8]) -> Seal {
        Seal(*blake3::keyed_hash(&self.0, message).as_bytes())
    }
}

impl Default for SealKey {
    fn default() -> Self {
        Self::derive(b"local")
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealKey(..)")
    }
}

/// Decides whether a sealed claim may be trusted.
pub trait ClaimVerifier: fmt::Debug + Send + Sync {
    /// Accept or reject `seal` over `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ConquestError::ClaimRejected`] if the claim is not trusted.
    fn verify(&self, message: &[u8], seal: &Seal) -> Result<()>;
}

/// Accepts claims sealed with its key.
#[derive(Debug, Clone, Default)]
pub struct TrustingVerifier {
    key: SealKey,
}

impl TrustingVerifier {
    /// Create a verifier for `key`.
    #[must_use]
    pub const fn new(key: SealKey) -> Self {
        Self { key }
    }
}

impl ClaimVerifier for TrustingVerifier {
    fn verify(&self, message: &[u8], seal: &Seal) -> Result<()> {
        if self.key.seal(message) == *seal {
            Ok(())
        } else {
            Err(ConquestError::ClaimRejected(
                "seal does not match payload".to_string(),
            ))
        }
    }
}

/// Rejects every claim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectingVerifier;

impl ClaimVerifier for RejectingVerifier {
    fn verify(&self, _message: &[u8], _seal: &Seal) -> Result<()> {
        Err(ConquestError::ClaimRejected(
            "verifier rejects all claims".to_string(),
        ))
    }
}

/// Produces sealed claims from private inputs.
#[derive(Debug)]
pub struct ClaimIssuer {
    config: GameConfig,
    strategy: Box<dyn CombatStrategy>,
    key: SealKey,
}

impl ClaimIssuer {
    /// Create an issuer that resolves battles with `strategy`.
    #[must_use]
    pub fn new(config: GameConfig, strategy: Box<dyn CombatStrategy>, key: SealKey) -> Self {
        Self {
            config,
            strategy,
            key,
        }
    }

    /// Issuer using the default key and the configured default strategy.
    #[must_use]
    pub fn with_defaults(config: GameConfig) -> Self {
        let strategy = crate::combat::StrategyKind::default().build(&config);
        Self::new(config, strategy, SealKey::default())
    }

    /// The combat strategy battle claims are decided with.
    #[must_use]
    pub fn strategy(&self) -> &dyn CombatStrategy {
        self.strategy.as_ref()
    }

    fn seal<T: ClaimPayload>(&self, payload: T) -> Result<VerifiedClaim<T>> {
        let seal = self.key.seal(&claim_message(&payload)?);
        Ok(VerifiedClaim { payload, seal })
    }

    /// Prove that `(x, y)` is a suitable homeworld location.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::CoordinateOutOfRange`] if either coordinate exceeds the map.
    /// - [`ConquestError::InvalidFaction`] if `faction` is not 1, 2 or 3.
    /// - [`ConquestError::CoordinateNotSuitable`] if the location fails the difficulty.
    pub fn claim_planet(&self, x: u64, y: u64, faction: u8) -> Result<VerifiedClaim<PlanetClaim>> {
        let coords = Coordinates::new(x, y);
        let max = self.config.max_map_length;
        if !coords.within(max) {
            return Err(ConquestError::CoordinateOutOfRange { x, y, max });
        }
        let faction = Faction::from_code(faction)?;
        let location = location_id(coords, self.config.chain_hash_times);
        if !is_suitable(&location, self.config.birthing_difficulty) {
            return Err(ConquestError::CoordinateNotSuitable);
        }
        self.seal(PlanetClaim { location, faction })
    }

    /// Prove a commitment to `defense` that respects the cost and crew maxima.
    ///
    /// # Errors
    ///
    /// - [`ConquestError::DefenseCostTooHigh`] if the defense costs too much.
    /// - [`ConquestError::DefenseCrewTooHigh`] if it needs too much crew.
    pub fn claim_defense(
        &self,
        defense: &PlanetaryDefense,
        salt: &Salt,
    ) -> Result<VerifiedClaim<DefenseClaim>> {
        let units = &self.config.units;
        let cost = defense.total_cost(units);
        if cost > self.config.max_defense_cost {
            return Err(ConquestError::DefenseCostTooHigh {
                cost,
                max: self.config.max_defense_cost,
            });
        }
        let crew_needed = defense.total_crew(units);
        if crew_needed > self.config.max_defense_crew {
            return Err(ConquestError::DefenseCrewTooHigh {
                crew: crew_needed,
                max: self.config.max_defense_crew,
            });
        }
        self.seal(DefenseClaim {
            defense_commitment: defense_commitment(defense, salt),
            crew_needed,
        })
    }

    /// Fight `fleet` against the hidden `defense` and prove the verdict.
    ///
    /// `fleet` must be the attack as stored on the defending planet,
    /// including its attacker stamp.
    ///
    /// # Errors
    ///
    /// Fails only if the payload cannot be sealed.
    pub fn claim_battle(
        &self,
        fleet: &AttackFleet,
        defense: &PlanetaryDefense,
        salt: &Salt,
    ) -> Result<VerifiedClaim<BattleClaim>> {
        let outcome = self.strategy.resolve(fleet, defense);
        self.seal(BattleClaim {
            defender_won: outcome.defender_won,
            defense_commitment: defense_commitment(defense, salt),
            attacking_fleet: *fleet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn issuer() -> ClaimIssuer {
        ClaimIssuer::with_defaults(GameConfig::default().with_difficulty_bits(0))
    }

    #[test]
    fn test_trusting_verifier_accepts_own_seal() {
        let claim = issuer().claim_planet(10, 20, 3).unwrap();
        let payload = claim.open(&TrustingVerifier::default()).unwrap();
        assert_eq!(payload.faction, Faction::C);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let mut claim = issuer().claim_planet(10, 20, 3).unwrap();
        claim.payload.faction = Faction::A;
        let err = claim.open(&TrustingVerifier::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClaimRejected);
    }

    #[test]
    fn test_foreign_key_is_rejected() {
        let claim = issuer().claim_planet(10, 20, 1).unwrap();
        let verifier = TrustingVerifier::new(SealKey::derive(b"someone else"));
        assert!(claim.open(&verifier).is_err());
    }

    #[test]
    fn test_rejecting_verifier() {
        let claim = issuer().claim_planet(1, 1, 1).unwrap();
        let err = claim.open(&RejectingVerifier).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClaimRejected);
    }

    #[test]
    fn test_planet_claim_checks() {
        let issuer = issuer();
        assert_eq!(
            issuer.claim_planet(10_001, 0, 1).unwrap_err().kind(),
            ErrorKind::CoordinateOutOfRange
        );
        assert_eq!(
            issuer.claim_planet(1, 1, 4).unwrap_err().kind(),
            ErrorKind::InvalidFaction
        );

        let strict = ClaimIssuer::with_defaults(GameConfig::default().with_difficulty_bits(256));
        assert_eq!(
            strict.claim_planet(1, 1, 1).unwrap_err().kind(),
            ErrorKind::CoordinateNotSuitable
        );
    }

    #[test]
    fn test_defense_claim_limits() {
        let issuer = issuer();
        let salt = Salt::from_u64(1);

        let claim = issuer
            .claim_defense(&PlanetaryDefense::new(2, 3, 1, 4), &salt)
            .unwrap();
        assert_eq!(claim.payload.crew_needed, 580);

        let err = issuer
            .claim_defense(&PlanetaryDefense::new(2000, 0, 0, 0), &salt)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DefenseCostTooHigh);

        let mut config = GameConfig::default();
        config.max_defense_crew = 99;
        let err = ClaimIssuer::with_defaults(config)
            .claim_defense(&PlanetaryDefense::new(1, 0, 0, 0), &salt)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DefenseCrewTooHigh);
    }

    #[test]
    fn test_battle_claim_binds_commitment_and_fleet() {
        let issuer = issuer();
        let defense = PlanetaryDefense::new(5, 5, 5, 0);
        let salt = Salt::from_u64(7);
        let fleet = AttackFleet::new(Faction::B, 5, 5, 5, 0);

        let claim = issuer.claim_battle(&fleet, &defense, &salt).unwrap();
        assert!(claim.payload.defender_won);
        assert_eq!(claim.payload.attacking_fleet, fleet);
        assert_eq!(
            claim.payload.defense_commitment,
            defense_commitment(&defense, &salt)
        );
    }

    #[test]
    fn test_seal_is_domain_separated() {
        let issuer = issuer();
        let planet = issuer.claim_planet(3, 4, 2).unwrap();
        let defense = issuer
            .claim_defense(&PlanetaryDefense::new(1, 0, 0, 0), &Salt::from_u64(1))
            .unwrap();
        assert_ne!(planet.seal, defense.seal);
    }
}
