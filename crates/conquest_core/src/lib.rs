//! # Conquest Core
//!
//! Deterministic rules engine for Planetary Conquest.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No network
//! - No randomness
//! - No floating-point math (integers throughout)
//!
//! The only IO is saving and loading journals and config files.
//!
//! ## Crate Structure
//!
//! - [`commitment`] - Location derivation, suitability filter, defense commitments
//! - [`fleet`] - Fleet compositions and their cost, crew and strength
//! - [`combat`] - The [`combat::CombatStrategy`] seam and the binary winner formula
//! - [`attrition`] - The four-phase attrition simulation
//! - [`claims`] - Verified claims, the claim verifier and the local issuer
//! - [`game`] - The planet lifecycle state machine
//! - [`ledger`] - Storage and clock collaborators
//! - [`journal`] - Recording and replaying games

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod attrition;
pub mod claims;
pub mod combat;
pub mod commitment;
pub mod config;
pub mod error;
pub mod factions;
pub mod fleet;
pub mod game;
pub mod journal;
pub mod ledger;
pub mod planet;
pub mod units;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::attrition::{BattleReport, Forces, PhaseReport, PhasedAttrition};
    pub use crate::claims::{
        BattleClaim, ClaimIssuer, ClaimVerifier, DefenseClaim, PlanetClaim, RejectingVerifier,
        SealKey, TrustingVerifier, VerifiedClaim,
    };
    pub use crate::combat::{BattleOutcome, BinaryWinner, CombatStrategy, StrategyKind};
    pub use crate::commitment::{
        defense_commitment, is_suitable, location_id, BirthingDifficulty, Coordinates,
        DefenseCommitment, LocationId, PlayerId, Salt,
    };
    pub use crate::config::{AttritionRules, GameConfig};
    pub use crate::error::{ConquestError, ErrorKind, Result};
    pub use crate::factions::Faction;
    pub use crate::fleet::{AttackFleet, PlanetaryDefense, UnitCounts};
    pub use crate::game::{Game, Resolution};
    pub use crate::journal::{Journal, JournalAction, JournalEntry};
    pub use crate::ledger::{Clock, Ledger, ManualClock, MemoryLedger, WriteBatch};
    pub use crate::planet::{Planet, PlanetState};
    pub use crate::units::{UnitKind, UnitStats, UnitTable};
}
