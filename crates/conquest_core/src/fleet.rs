//! Fleet compositions and their cost, crew and strength.
//!
//! Two compositions exist: the hidden [`PlanetaryDefense`] a planet commits
//! to, and the public [`AttackFleet`] it launches. Both expose their unit
//! counts through [`UnitCounts`], which provides the derived totals.
//!
//! All totals saturate instead of wrapping.

use serde::{Deserialize, Serialize};

use crate::commitment::LocationId;
use crate::factions::Faction;
use crate::units::{UnitKind, UnitTable};

/// Read access to per-kind unit counts.
pub trait UnitCounts {
    /// Number of units of `kind` (zero for kinds the composition cannot hold).
    fn count(&self, kind: UnitKind) -> u64;

    /// Σ count × cost.
    fn total_cost(&self, units: &UnitTable) -> u64 {
        weighted_sum(self, |kind| units.stats(kind).cost)
    }

    /// Σ count × crew.
    fn total_crew(&self, units: &UnitTable) -> u64 {
        weighted_sum(self, |kind| units.stats(kind).crew)
    }

    /// Σ count × combat value.
    fn simple_strength(&self, units: &UnitTable) -> u64 {
        weighted_sum(self, |kind| units.stats(kind).combat_value)
    }

    /// Σ count × attack.
    fn total_attack(&self, units: &UnitTable) -> u64 {
        weighted_sum(self, |kind| units.stats(kind).attack)
    }

    /// Σ count × health.
    fn total_health(&self, units: &UnitTable) -> u64 {
        weighted_sum(self, |kind| units.stats(kind).health)
    }

    /// Whether every count is zero.
    fn is_empty(&self) -> bool {
        UnitKind::ALL.iter().all(|&kind| self.count(kind) == 0)
    }
}

fn weighted_sum<C, F>(counts: &C, weight: F) -> u64
where
    C: UnitCounts + ?Sized,
    F: Fn(UnitKind) -> u64,
{
    UnitKind::ALL.iter().fold(0u64, |acc, &kind| {
        acc.saturating_add(counts.count(kind).saturating_mul(weight(kind)))
    })
}

/// The defense a planet commits to.
///
/// Never stored in the ledger directly, only as a salted commitment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanetaryDefense {
    /// Battleships.
    pub battleships: u64,
    /// Destroyers.
    pub destroyers: u64,
    /// Carriers.
    pub carriers: u64,
    /// Orbital defense platforms.
    pub orbital_defenses: u64,
}

impl PlanetaryDefense {
    /// Create a new defense.
    #[must_use]
    pub const fn new(battleships: u64, destroyers: u64, carriers: u64, orbital_defenses: u64) -> Self {
        Self {
            battleships,
            destroyers,
            carriers,
            orbital_defenses,
        }
    }

    /// Canonical byte encoding used for commitments.
    #[must_use]
    pub fn encode(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[0..8].copy_from_slice(&self.battleships.to_le_bytes());
        out[8..16].copy_from_slice(&self.destroyers.to_le_bytes());
        out[16..24].copy_from_slice(&self.carriers.to_le_bytes());
        out[24..32].copy_from_slice(&self.orbital_defenses.to_le_bytes());
        out
    }
}

impl UnitCounts for PlanetaryDefense {
    fn count(&self, kind: UnitKind) -> u64 {
        match kind {
            UnitKind::Battleship => self.battleships,
            UnitKind::Destroyer => self.destroyers,
            UnitKind::Carrier => self.carriers,
            UnitKind::OrbitalDefense => self.orbital_defenses,
            _ => 0,
        }
    }
}

/// A fleet sent against another planet.
///
/// `attacker` is stamped by the state machine when the attack is launched
/// so the defender can recover who attacked after resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttackFleet {
    /// Faction of the launching planet.
    pub faction: Faction,
    /// Battleships.
    pub battleships: u64,
    /// Destroyers.
    pub destroyers: u64,
    /// Carriers.
    pub carriers: u64,
    /// Troop transports.
    pub troop_transports: u64,
    /// Location of the attacking planet.
    pub attacker: LocationId,
}

/// Digest of an [`AttackFleet`], used to detect tampering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FleetDigest(pub [u8; 32]);

impl AttackFleet {
    /// Create a fleet that has not been launched yet.
    #[must_use]
    pub const fn new(
        faction: Faction,
        battleships: u64,
        destroyers: u64,
        carriers: u64,
        troop_transports: u64,
    ) -> Self {
        Self {
            faction,
            battleships,
            destroyers,
            carriers,
            troop_transports,
            attacker: LocationId::ZERO,
        }
    }

    /// The empty fleet stored in an idle attack slot.
    #[must_use]
    pub const fn empty() -> Self {
        Self::new(Faction::A, 0, 0, 0, 0)
    }

    /// Canonical byte encoding used for digests.
    #[must_use]
    pub fn encode(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0] = self.faction.code();
        out[1..9].copy_from_slice(&self.battleships.to_le_bytes());
        out[9..17].copy_from_slice(&self.destroyers.to_le_bytes());
        out[17..25].copy_from_slice(&self.carriers.to_le_bytes());
        out[25..33].copy_from_slice(&self.troop_transports.to_le_bytes());
        out[33..65].copy_from_slice(self.attacker.as_bytes());
        out
    }

    /// blake3 digest of the canonical encoding.
    #[must_use]
    pub fn digest(&self) -> FleetDigest {
        FleetDigest(*blake3::hash(&self.encode()).as_bytes())
    }

    /// Copy of this fleet stamped with the attacking planet.
    #[must_use]
    pub const fn launched_from(mut self, attacker: LocationId) -> Self {
        self.attacker = attacker;
        self
    }
}

impl Default for AttackFleet {
    fn default() -> Self {
        Self::empty()
    }
}

impl UnitCounts for AttackFleet {
    fn count(&self, kind: UnitKind) -> u64 {
        match kind {
            UnitKind::Battleship => self.battleships,
            UnitKind::Destroyer => self.destroyers,
            UnitKind::Carrier => self.carriers,
            UnitKind::TroopTransport => self.troop_transports,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defense_cost_and_crew() {
        let units = UnitTable::default();
        let defense = PlanetaryDefense::new(2, 3, 1, 4);
        // 2*40 + 3*20 + 1*60 + 4*30
        assert_eq!(defense.total_cost(&units), 320);
        // 2*100 + 3*50 + 1*150 + 4*20
        assert_eq!(defense.total_crew(&units), 580);
    }

    #[test]
    fn test_attack_cost_includes_transports() {
        let units = UnitTable::default();
        let fleet = AttackFleet::new(Faction::C, 1, 1, 1, 2);
        assert_eq!(fleet.total_cost(&units), 40 + 20 + 60 + 30);
    }

    #[test]
    fn test_simple_strength() {
        let units = UnitTable::default();
        let fleet = AttackFleet::new(Faction::B, 3, 2, 1, 10);
        assert_eq!(fleet.simple_strength(&units), 3 * 4 + 2 * 2 + 6);
    }

    #[test]
    fn test_totals_saturate() {
        let units = UnitTable::default();
        let defense = PlanetaryDefense::new(u64::MAX, u64::MAX, 0, 0);
        assert_eq!(defense.total_cost(&units), u64::MAX);
    }

    #[test]
    fn test_empty_fleet() {
        assert!(AttackFleet::empty().is_empty());
        assert!(!AttackFleet::new(Faction::A, 0, 0, 0, 1).is_empty());
        assert!(PlanetaryDefense::default().is_empty());
    }

    #[test]
    fn test_digest_covers_attacker() {
        let fleet = AttackFleet::new(Faction::C, 5, 5, 5, 0);
        let launched = fleet.launched_from(LocationId([7u8; 32]));
        assert_ne!(fleet.digest(), launched.digest());
        assert_eq!(launched.digest(), launched.digest());
    }

    #[test]
    fn test_digest_covers_counts_and_faction() {
        let base = AttackFleet::new(Faction::C, 5, 5, 5, 0);
        assert_ne!(base.digest(), AttackFleet::new(Faction::B, 5, 5, 5, 0).digest());
        assert_ne!(base.digest(), AttackFleet::new(Faction::C, 5, 5, 5, 1).digest());
    }
}
