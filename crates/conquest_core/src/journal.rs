//! Operation journal for recording and replaying games.
//!
//! A journal stores the configuration a game was started with and every
//! successful lifecycle operation in the order it was applied. Replaying the
//! entries against a fresh ledger recreates the game exactly, which
//! [`Journal::verify`] checks against the recorded final state hash.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::claims::{BattleClaim, ClaimVerifier, DefenseClaim, PlanetClaim, TrustingVerifier, VerifiedClaim};
use crate::commitment::{LocationId, PlayerId};
use crate::config::GameConfig;
use crate::error::{ConquestError, Result};
use crate::fleet::AttackFleet;
use crate::game::Game;
use crate::ledger::{ManualClock, MemoryLedger};

/// Journal file format version.
pub const JOURNAL_VERSION: u32 = 1;

/// A lifecycle operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalAction {
    /// [`Game::create_planet`].
    CreatePlanet(VerifiedClaim<PlanetClaim>),
    /// [`Game::defend_planet`].
    DefendPlanet {
        /// Defended planet.
        location: LocationId,
        /// Defense claim.
        claim: VerifiedClaim<DefenseClaim>,
    },
    /// [`Game::launch_attack`].
    LaunchAttack {
        /// Attacking planet.
        attacker: LocationId,
        /// Defending planet.
        defender: LocationId,
        /// Fleet as submitted.
        fleet: AttackFleet,
    },
    /// [`Game::resolve_attack`].
    ResolveAttack {
        /// Defending planet.
        defender: LocationId,
        /// Battle claim.
        claim: VerifiedClaim<BattleClaim>,
    },
    /// [`Game::forfeit_planet`].
    ForfeitPlanet {
        /// Defending planet.
        defender: LocationId,
    },
}

/// One recorded operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Block height when the operation was applied.
    pub height: u64,
    /// Player who submitted it.
    pub caller: PlayerId,
    /// The operation.
    pub action: JournalAction,
}

/// A recorded game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    /// Format version.
    pub version: u32,
    /// Configuration the game ran with.
    pub config: GameConfig,
    /// Operations in application order.
    pub entries: Vec<JournalEntry>,
    /// Height when recording stopped.
    pub final_height: u64,
    /// [`Game::state_hash`] when recording stopped.
    pub final_hash: u64,
}

impl Journal {
    /// Create an empty journal.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        Self {
            version: JOURNAL_VERSION,
            config,
            entries: Vec::new(),
            final_height: 0,
            final_hash: 0,
        }
    }

    /// Append an entry.
    pub fn record(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Stamp the end-of-game state.
    pub fn finalize(&mut self, final_height: u64, final_hash: u64) {
        self.final_height = final_height;
        self.final_hash = final_hash;
    }

    /// Number of recorded operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save the journal to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| ConquestError::Journal(format!("Failed to serialize journal: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| ConquestError::Journal(format!("Failed to write journal file: {e}")))?;
        Ok(())
    }

    /// Load a journal from a file.
    ///
    /// # Errors
    /// Returns an error if reading or deserialization fails, or the version is unknown.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| ConquestError::Journal(format!("Failed to read journal file: {e}")))?;
        let journal: Self = bincode::deserialize(&bytes)
            .map_err(|e| ConquestError::Journal(format!("Failed to deserialize journal: {e}")))?;

        if journal.version != JOURNAL_VERSION {
            return Err(ConquestError::Journal(format!(
                "Journal version mismatch: expected {JOURNAL_VERSION}, got {}",
                journal.version
            )));
        }

        Ok(journal)
    }

    /// Replay against a fresh in-memory game using the default verifier.
    ///
    /// # Errors
    /// Returns [`ConquestError::Journal`] naming the first entry that fails.
    pub fn replay(&self) -> Result<Game> {
        self.replay_with(Box::new(TrustingVerifier::default()))
    }

    /// Replay against a fresh in-memory game using `verifier`.
    ///
    /// # Errors
    /// Returns [`ConquestError::Journal`] naming the first entry that fails.
    pub fn replay_with(&self, verifier: Box<dyn ClaimVerifier>) -> Result<Game> {
        let mut game = Game::with_parts(
            self.config.clone(),
            MemoryLedger::new(),
            ManualClock::new(1),
            verifier,
        );

        for (index, entry) in self.entries.iter().enumerate() {
            game.clock().advance_to(entry.height);
            apply(&mut game, entry).map_err(|e| {
                ConquestError::Journal(format!("Entry {index} at height {}: {e}", entry.height))
            })?;
        }
        game.clock().advance_to(self.final_height);

        tracing::debug!(
            entries = self.entries.len(),
            state_hash = game.state_hash(),
            "Journal replayed"
        );
        Ok(game)
    }

    /// Replay and check the result against the recorded final hash.
    ///
    /// # Errors
    /// Returns [`ConquestError::Journal`] if replay fails or the hashes differ.
    pub fn verify(&self) -> Result<Game> {
        let game = self.replay()?;
        let hash = game.state_hash();
        if hash != self.final_hash {
            return Err(ConquestError::Journal(format!(
                "State hash mismatch after replay: expected {:016x}, got {hash:016x}",
                self.final_hash
            )));
        }
        Ok(game)
    }
}

fn apply(game: &mut Game, entry: &JournalEntry) -> Result<()> {
    let caller = entry.caller;
    match &entry.action {
        JournalAction::CreatePlanet(claim) => game.create_planet(caller, claim).map(|_| ()),
        JournalAction::DefendPlanet { location, claim } => {
            game.defend_planet(caller, *location, claim)
        }
        JournalAction::LaunchAttack {
            attacker,
            defender,
            fleet,
        } => game.launch_attack(caller, *attacker, *defender, *fleet),
        JournalAction::ResolveAttack { defender, claim } => {
            game.resolve_attack(caller, *defender, claim).map(|_| ())
        }
        JournalAction::ForfeitPlanet { defender } => {
            game.forfeit_planet(caller, *defender).map(|_| ())
        }
    }
}
