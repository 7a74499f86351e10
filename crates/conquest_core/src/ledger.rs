//! Storage and clock collaborators of the state machine.
//!
//! The state machine only reads through [`Ledger`] and writes by handing it a
//! complete [`WriteBatch`] once every precondition has passed, so a backend
//! only has to apply a batch all-or-nothing to keep operations atomic.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::commitment::{LocationId, PlayerId};
use crate::planet::Planet;

/// Writes produced by one lifecycle operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteBatch {
    /// New value of the planet counter, if it changes.
    pub number_of_planets: Option<u64>,
    /// Planets to insert or overwrite.
    pub planets: Vec<Planet>,
    /// Players that now own a homeworld.
    pub homeworlds: Vec<PlayerId>,
    /// Locations that are now claimed.
    pub claimed_locations: Vec<LocationId>,
}

impl WriteBatch {
    /// Empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a planet write.
    #[must_use]
    pub fn planet(mut self, planet: Planet) -> Self {
        self.planets.push(planet);
        self
    }
}

/// Key-value store holding the game state.
pub trait Ledger {
    /// Number of planets created so far.
    fn number_of_planets(&self) -> u64;

    /// Planet at `location`, if any.
    fn planet(&self, location: &LocationId) -> Option<Planet>;

    /// Whether `player` already founded a homeworld.
    fn player_has_homeworld(&self, player: &PlayerId) -> bool;

    /// Whether a planet was ever created at `location`.
    fn location_claimed(&self, location: &LocationId) -> bool;

    /// All planets ordered by location.
    fn planets(&self) -> Vec<Planet>;

    /// Apply every write of `batch` or none of them.
    fn commit(&mut self, batch: WriteBatch);
}

/// In-memory [`Ledger`] with ordered maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryLedger {
    number_of_planets: u64,
    planet_by_location: BTreeMap<LocationId, Planet>,
    player_has_homeworld: BTreeSet<PlayerId>,
    location_claimed: BTreeSet<LocationId>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for MemoryLedger {
    fn number_of_planets(&self) -> u64 {
        self.number_of_planets
    }

    fn planet(&self, location: &LocationId) -> Option<Planet> {
        self.planet_by_location.get(location).cloned()
    }

    fn player_has_homeworld(&self, player: &PlayerId) -> bool {
        self.player_has_homeworld.contains(player)
    }

    fn location_claimed(&self, location: &LocationId) -> bool {
        self.location_claimed.contains(location)
    }

    fn planets(&self) -> Vec<Planet> {
        self.planet_by_location.values().cloned().collect()
    }

    fn commit(&mut self, batch: WriteBatch) {
        if let Some(count) = batch.number_of_planets {
            self.number_of_planets = count;
        }
        for planet in batch.planets {
            self.planet_by_location.insert(planet.location, planet);
        }
        self.player_has_homeworld.extend(batch.homeworlds);
        self.location_claimed.extend(batch.claimed_locations);
    }
}

/// Source of the current block height.
pub trait Clock {
    /// Current height. Never decreases.
    fn current_height(&self) -> u64;
}

/// Clock advanced by hand, for tests, scenarios and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    height: AtomicU64,
}

impl ManualClock {
    /// Create a clock at `height`.
    #[must_use]
    pub const fn new(height: u64) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Move forward by `blocks` and return the new height.
    pub fn advance(&self, blocks: u64) -> u64 {
        let previous = self
            .height
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |h| {
                Some(h.saturating_add(blocks))
            })
            .unwrap_or_else(|h| h);
        previous.saturating_add(blocks)
    }

    /// Move forward to `height`. Earlier heights are ignored.
    pub fn advance_to(&self, height: u64) {
        self.height.fetch_max(height, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn current_height(&self) -> u64 {
        self.height.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::Faction;

    fn planet(byte: u8) -> Planet {
        Planet::new(
            PlayerId::from_name("bob"),
            LocationId([byte; 32]),
            Faction::A,
            0,
        )
    }

    #[test]
    fn test_commit_applies_batch() {
        let mut ledger = MemoryLedger::new();
        let player = PlayerId::from_name("bob");
        let p = planet(3);
        ledger.commit(WriteBatch {
            number_of_planets: Some(1),
            planets: vec![p.clone()],
            homeworlds: vec![player],
            claimed_locations: vec![p.location],
        });

        assert_eq!(ledger.number_of_planets(), 1);
        assert_eq!(ledger.planet(&p.location), Some(p.clone()));
        assert!(ledger.player_has_homeworld(&player));
        assert!(ledger.location_claimed(&p.location));
        assert!(!ledger.location_claimed(&LocationId::ZERO));
    }

    #[test]
    fn test_planets_are_ordered_by_location() {
        let mut ledger = MemoryLedger::new();
        ledger.commit(WriteBatch::new().planet(planet(9)).planet(planet(2)).planet(planet(5)));
        let order: Vec<u8> = ledger.planets().iter().map(|p| p.location.0[0]).collect();
        assert_eq!(order, vec![2, 5, 9]);
    }

    #[test]
    fn test_empty_batch_changes_nothing() {
        let mut ledger = MemoryLedger::new();
        ledger.commit(WriteBatch::new().planet(planet(1)));
        let before = ledger.clone();
        ledger.commit(WriteBatch::new());
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_manual_clock_is_monotonic() {
        let clock = ManualClock::new(10);
        assert_eq!(clock.advance(5), 15);
        clock.advance_to(12);
        assert_eq!(clock.current_height(), 15);
        clock.advance_to(40);
        assert_eq!(clock.current_height(), 40);
    }
}
