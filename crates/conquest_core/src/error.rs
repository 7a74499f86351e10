//! Error types for the conquest core.
//!
//! Every lifecycle operation reports precondition violations through
//! [`ConquestError`]. Variants are stable: callers match on [`ErrorKind`]
//! and surface the message verbatim.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commitment::LocationId;

/// Result type alias using [`ConquestError`].
pub type Result<T> = std::result::Result<T, ConquestError>;

/// Top-level error type for all conquest operations.
#[derive(Debug, Error)]
pub enum ConquestError {
    /// The caller already owns a homeworld.
    #[error("Player already has a home planet")]
    AlreadyHasHomeworld,

    /// A planet already exists at this location.
    #[error("A homeworld has already been created at location {0}")]
    LocationAlreadyClaimed(LocationId),

    /// A coordinate lies outside the game map.
    #[error("Coordinate out of range: ({x}, {y}) exceeds map length {max}")]
    CoordinateOutOfRange {
        /// X coordinate.
        x: u64,
        /// Y coordinate.
        y: u64,
        /// Maximum allowed coordinate.
        max: u64,
    },

    /// The location hash does not satisfy the birthing difficulty.
    #[error("Coordinate not suitable for planet creation")]
    CoordinateNotSuitable,

    /// Faction code is not one of the known factions.
    #[error("Invalid faction: {0}")]
    InvalidFaction(u8),

    /// No planet exists at the location.
    #[error("Planet does not exist at location {0}")]
    PlanetNotFound(LocationId),

    /// The caller does not own the planet.
    #[error("This player has no access to planet {0}")]
    NotOwner(LocationId),

    /// The planet already has an outstanding attack.
    #[error("Planet {0} is already under attack")]
    PlanetUnderAttack(LocationId),

    /// The planet has no outstanding attack.
    #[error("Planet {0} is not under attack")]
    PlanetNotUnderAttack(LocationId),

    /// Attacker and defender are the same planet.
    #[error("Player cannot attack their own planet")]
    SelfAttackForbidden,

    /// The attacking planet has no committed defense.
    #[error("Attacking home planet has no defense")]
    AttackerHasNoDefense,

    /// The defending planet has no committed defense.
    #[error("Defending planet has no planetary defense")]
    DefenderHasNoDefense,

    /// The attack fleet costs more than the configured maximum.
    #[error("Attack fleet cost too high: {cost} exceeds {max}")]
    AttackCostTooHigh {
        /// Fleet cost.
        cost: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Fleet faction differs from the attacking planet's faction.
    #[error("Attacking fleet faction does not match the attacking planet faction")]
    FactionMismatch,

    /// The battle claim's defense commitment differs from the stored one.
    #[error("Defense does not match")]
    DefenseCommitmentMismatch,

    /// The battle claim's fleet differs from the stored incoming attack.
    #[error("Attack does not match")]
    AttackFleetMismatch,

    /// The caller does not own the recorded attacker planet.
    #[error("Only the attacker can claim the forfeit")]
    NotTheAttacker,

    /// The forfeit window has not elapsed yet.
    #[error("Forfeit can not be claimed before height {available_at} (current {current})")]
    ForfeitTooEarly {
        /// Current block height.
        current: u64,
        /// First height at which the forfeit is claimable.
        available_at: u64,
    },

    /// Defense costs more than the configured maximum.
    #[error("Planetary defense cost too high: {cost} exceeds {max}")]
    DefenseCostTooHigh {
        /// Defense cost.
        cost: u64,
        /// Configured maximum.
        max: u64,
    },

    /// Defense needs more crew than the configured maximum.
    #[error("You do not have enough crew to man defense: need {crew}, max {max}")]
    DefenseCrewTooHigh {
        /// Crew required.
        crew: u64,
        /// Configured maximum.
        max: u64,
    },

    /// The planet cap has been reached.
    #[error("Maximum number of planets reached: {0}")]
    MaxPlanetsReached(u64),

    /// The claim verifier refused the claim.
    #[error("Claim rejected: {0}")]
    ClaimRejected(String),

    /// Configuration could not be parsed or is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Journal could not be read, written or replayed.
    #[error("Journal error: {0}")]
    Journal(String),
}

/// Stable discriminant of a [`ConquestError`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub enum ErrorKind {
    AlreadyHasHomeworld,
    LocationAlreadyClaimed,
    CoordinateOutOfRange,
    CoordinateNotSuitable,
    InvalidFaction,
    PlanetNotFound,
    NotOwner,
    PlanetUnderAttack,
    PlanetNotUnderAttack,
    SelfAttackForbidden,
    AttackerHasNoDefense,
    DefenderHasNoDefense,
    AttackCostTooHigh,
    FactionMismatch,
    DefenseCommitmentMismatch,
    AttackFleetMismatch,
    NotTheAttacker,
    ForfeitTooEarly,
    DefenseCostTooHigh,
    DefenseCrewTooHigh,
    MaxPlanetsReached,
    ClaimRejected,
    Config,
    Journal,
}

impl ConquestError {
    /// Get the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyHasHomeworld => ErrorKind::AlreadyHasHomeworld,
            Self::LocationAlreadyClaimed(_) => ErrorKind::LocationAlreadyClaimed,
            Self::CoordinateOutOfRange { .. } => ErrorKind::CoordinateOutOfRange,
            Self::CoordinateNotSuitable => ErrorKind::CoordinateNotSuitable,
            Self::InvalidFaction(_) => ErrorKind::InvalidFaction,
            Self::PlanetNotFound(_) => ErrorKind::PlanetNotFound,
            Self::NotOwner(_) => ErrorKind::NotOwner,
            Self::PlanetUnderAttack(_) => ErrorKind::PlanetUnderAttack,
            Self::PlanetNotUnderAttack(_) => ErrorKind::PlanetNotUnderAttack,
            Self::SelfAttackForbidden => ErrorKind::SelfAttackForbidden,
            Self::AttackerHasNoDefense => ErrorKind::AttackerHasNoDefense,
            Self::DefenderHasNoDefense => ErrorKind::DefenderHasNoDefense,
            Self::AttackCostTooHigh { .. } => ErrorKind::AttackCostTooHigh,
            Self::FactionMismatch => ErrorKind::FactionMismatch,
            Self::DefenseCommitmentMismatch => ErrorKind::DefenseCommitmentMismatch,
            Self::AttackFleetMismatch => ErrorKind::AttackFleetMismatch,
            Self::NotTheAttacker => ErrorKind::NotTheAttacker,
            Self::ForfeitTooEarly { .. } => ErrorKind::ForfeitTooEarly,
            Self::DefenseCostTooHigh { .. } => ErrorKind::DefenseCostTooHigh,
            Self::DefenseCrewTooHigh { .. } => ErrorKind::DefenseCrewTooHigh,
            Self::MaxPlanetsReached(_) => ErrorKind::MaxPlanetsReached,
            Self::ClaimRejected(_) => ErrorKind::ClaimRejected,
            Self::Config(_) => ErrorKind::Config,
            Self::Journal(_) => ErrorKind::Journal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ignores_payload() {
        let a = ConquestError::AttackCostTooHigh { cost: 10, max: 5 };
        let b = ConquestError::AttackCostTooHigh { cost: 99, max: 1 };
        assert_eq!(a.kind(), b.kind());
        assert_eq!(a.kind(), ErrorKind::AttackCostTooHigh);
    }

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(
            ConquestError::SelfAttackForbidden.to_string(),
            "Player cannot attack their own planet"
        );
        assert_eq!(
            ConquestError::ForfeitTooEarly {
                current: 5,
                available_at: 12
            }
            .to_string(),
            "Forfeit can not be claimed before height 12 (current 5)"
        );
    }
}
