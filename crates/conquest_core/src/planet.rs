//! The planet record stored in the ledger.

use serde::{Deserialize, Serialize};

use crate::commitment::{DefenseCommitment, LocationId, PlayerId};
use crate::factions::Faction;
use crate::fleet::AttackFleet;

/// Lifecycle state of an existing planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanetState {
    /// Owned, no crew committed to a defense.
    Undefended,
    /// Owned with a committed defense.
    Defended,
    /// An attack is outstanding.
    UnderAttack,
}

/// A uniquely located, uniquely owned planet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Planet {
    /// Owning player.
    pub owner: PlayerId,
    /// Primary key.
    pub location: LocationId,
    /// Faction fixed at creation.
    pub faction: Faction,
    /// Commitment to the hidden defense, zero if none.
    pub defense_commitment: DefenseCommitment,
    /// Crew manning the committed defense.
    pub defense_manpower: u64,
    /// Outstanding attack, [`AttackFleet::empty`] when idle.
    pub incoming_attack: AttackFleet,
    /// Height at which the outstanding attack was launched, zero when idle.
    pub incoming_attack_time: u64,
    /// Score. May go negative.
    pub points: i64,
}

impl Planet {
    /// A freshly founded planet: no defense, no attack.
    #[must_use]
    pub fn new(owner: PlayerId, location: LocationId, faction: Faction, points: i64) -> Self {
        Self {
            owner,
            location,
            faction,
            defense_commitment: DefenseCommitment::ZERO,
            defense_manpower: 0,
            incoming_attack: AttackFleet::empty(),
            incoming_attack_time: 0,
            points,
        }
    }

    /// Whether an attack is outstanding.
    #[must_use]
    pub const fn is_under_attack(&self) -> bool {
        self.incoming_attack_time != 0
    }

    /// Whether crew has been committed to a defense.
    #[must_use]
    pub const fn is_defended(&self) -> bool {
        self.defense_manpower > 0
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> PlanetState {
        if self.is_under_attack() {
            PlanetState::UnderAttack
        } else if self.is_defended() {
            PlanetState::Defended
        } else {
            PlanetState::Undefended
        }
    }

    /// Reset the attack slot.
    pub fn clear_attack(&mut self) {
        self.incoming_attack = AttackFleet::empty();
        self.incoming_attack_time = 0;
    }

    /// Feed every field into a state hasher in a fixed order.
    pub fn hash_into(&self, hasher: &mut blake3::Hasher) {
        hasher.update(self.owner.as_bytes());
        hasher.update(self.location.as_bytes());
        hasher.update(&[self.faction.code()]);
        hasher.update(self.defense_commitment.as_bytes());
        hasher.update(&self.defense_manpower.to_le_bytes());
        hasher.update(&self.incoming_attack.encode());
        hasher.update(&self.incoming_attack_time.to_le_bytes());
        hasher.update(&self.points.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet() -> Planet {
        Planet::new(
            PlayerId::from_name("alice"),
            LocationId([1u8; 32]),
            Faction::B,
            100,
        )
    }

    #[test]
    fn test_new_planet_is_undefended() {
        let planet = planet();
        assert_eq!(planet.state(), PlanetState::Undefended);
        assert_eq!(planet.incoming_attack, AttackFleet::empty());
        assert_eq!(planet.points, 100);
    }

    #[test]
    fn test_state_transitions() {
        let mut planet = planet();
        planet.defense_manpower = 250;
        assert_eq!(planet.state(), PlanetState::Defended);

        planet.incoming_attack = AttackFleet::new(Faction::B, 1, 0, 0, 0);
        planet.incoming_attack_time = 42;
        assert_eq!(planet.state(), PlanetState::UnderAttack);

        planet.clear_attack();
        assert_eq!(planet.state(), PlanetState::Defended);
        assert_eq!(planet.incoming_attack, AttackFleet::empty());
    }

    #[test]
    fn test_hash_covers_points() {
        let a = planet();
        let mut b = planet();
        b.points -= 1;

        let mut ha = blake3::Hasher::new();
        a.hash_into(&mut ha);
        let mut hb = blake3::Hasher::new();
        b.hash_into(&mut hb);
        assert_ne!(ha.finalize(), hb.finalize());
    }
}
