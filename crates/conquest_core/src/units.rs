//! Unit kinds and data-driven per-unit statistics.
//!
//! Every combat formula reads unit numbers from a [`UnitTable`] held by the
//! game configuration, so balance changes never touch the formulas.

use serde::{Deserialize, Serialize};

/// Every kind of unit that can appear in a battle.
///
/// The first five are built by players. Fighters and drones are launched by
/// carriers, and dropships by troop transports, once a battle starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    /// Heavy capital ship. Beats destroyers.
    Battleship,
    /// Missile escort. Beats carriers.
    Destroyer,
    /// Fighter and drone platform. Beats battleships.
    Carrier,
    /// Attack-only troop carrier.
    TroopTransport,
    /// Defense-only orbital platform.
    OrbitalDefense,
    /// Carrier-launched strike craft.
    Fighter,
    /// Carrier-launched drone.
    Drone,
    /// Transport-launched landing craft.
    Dropship,
}

impl UnitKind {
    /// All unit kinds in canonical order.
    pub const ALL: [UnitKind; 8] = [
        UnitKind::Battleship,
        UnitKind::Destroyer,
        UnitKind::Carrier,
        UnitKind::TroopTransport,
        UnitKind::OrbitalDefense,
        UnitKind::Fighter,
        UnitKind::Drone,
        UnitKind::Dropship,
    ];

    /// Index of this kind into [`UnitKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Battleship => 0,
            Self::Destroyer => 1,
            Self::Carrier => 2,
            Self::TroopTransport => 3,
            Self::OrbitalDefense => 4,
            Self::Fighter => 5,
            Self::Drone => 6,
            Self::Dropship => 7,
        }
    }

    /// Whether players build this unit directly (as opposed to it being launched mid-battle).
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(
            self,
            Self::Battleship
                | Self::Destroyer
                | Self::Carrier
                | Self::TroopTransport
                | Self::OrbitalDefense
        )
    }
}

/// Static statistics for one unit kind.
///
/// All values are non-negative integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Cost to field one unit.
    pub cost: u64,
    /// Crew needed to man one unit.
    pub crew: u64,
    /// Offensive output in a clash.
    pub attack: u64,
    /// Damage one unit absorbs in a clash.
    pub health: u64,
    /// Rock-paper-scissors strength used by the binary winner formula.
    #[serde(default)]
    pub combat_value: u64,
    /// Missiles fired per salvo.
    #[serde(default)]
    pub missile_salvo_capacity: u64,
    /// Missiles intercepted per salvo.
    #[serde(default)]
    pub interceptor_capacity: u64,
    /// Missile hits one unit's point defense absorbs before it is destroyed.
    #[serde(default)]
    pub point_defense_capacity: u64,
}

impl UnitStats {
    /// Stats for a unit that neither costs nor fights.
    pub const INERT: UnitStats = UnitStats {
        cost: 0,
        crew: 0,
        attack: 0,
        health: 0,
        combat_value: 0,
        missile_salvo_capacity: 0,
        interceptor_capacity: 0,
        point_defense_capacity: 0,
    };
}

/// Stats for every unit kind.
///
/// # Example RON
///
/// ```ron
/// UnitTable(
///     battleship: UnitStats(
///         cost: 40, crew: 100, attack: 50, health: 100,
///         combat_value: 4, missile_salvo_capacity: 4,
///         interceptor_capacity: 4, point_defense_capacity: 4,
///     ),
///     // ...
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitTable {
    /// Battleship stats.
    pub battleship: UnitStats,
    /// Destroyer stats.
    pub destroyer: UnitStats,
    /// Carrier stats.
    pub carrier: UnitStats,
    /// Troop transport stats.
    pub troop_transport: UnitStats,
    /// Orbital defense platform stats.
    pub orbital_defense: UnitStats,
    /// Fighter stats.
    pub fighter: UnitStats,
    /// Drone stats.
    pub drone: UnitStats,
    /// Dropship stats.
    pub dropship: UnitStats,
}

impl UnitTable {
    /// Look up the stats of a unit kind.
    #[must_use]
    pub const fn stats(&self, kind: UnitKind) -> &UnitStats {
        match kind {
            UnitKind::Battleship => &self.battleship,
            UnitKind::Destroyer => &self.destroyer,
            UnitKind::Carrier => &self.carrier,
            UnitKind::TroopTransport => &self.troop_transport,
            UnitKind::OrbitalDefense => &self.orbital_defense,
            UnitKind::Fighter => &self.fighter,
            UnitKind::Drone => &self.drone,
            UnitKind::Dropship => &self.dropship,
        }
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        Self {
            battleship: UnitStats {
                cost: 40,
                crew: 100,
                attack: 50,
                health: 100,
                combat_value: 4,
                missile_salvo_capacity: 4,
                interceptor_capacity: 4,
                point_defense_capacity: 4,
            },
            destroyer: UnitStats {
                cost: 20,
                crew: 50,
                attack: 25,
                health: 40,
                combat_value: 2,
                missile_salvo_capacity: 6,
                interceptor_capacity: 2,
                point_defense_capacity: 2,
            },
            carrier: UnitStats {
                cost: 60,
                crew: 150,
                attack: 10,
                health: 120,
                combat_value: 6,
                missile_salvo_capacity: 0,
                interceptor_capacity: 6,
                point_defense_capacity: 6,
            },
            troop_transport: UnitStats {
                cost: 15,
                crew: 40,
                attack: 2,
                health: 30,
                point_defense_capacity: 1,
                ..UnitStats::INERT
            },
            orbital_defense: UnitStats {
                cost: 30,
                crew: 20,
                attack: 40,
                health: 80,
                point_defense_capacity: 3,
                ..UnitStats::INERT
            },
            fighter: UnitStats {
                attack: 5,
                health: 5,
                point_defense_capacity: 1,
                ..UnitStats::INERT
            },
            drone: UnitStats {
                attack: 3,
                health: 3,
                point_defense_capacity: 1,
                ..UnitStats::INERT
            },
            dropship: UnitStats {
                attack: 1,
                health: 10,
                point_defense_capacity: 1,
                ..UnitStats::INERT
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, kind) in UnitKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_launched_units_are_free() {
        let table = UnitTable::default();
        for kind in UnitKind::ALL {
            if !kind.is_buildable() {
                assert_eq!(table.stats(kind).cost, 0, "{kind:?} should not cost anything");
                assert_eq!(table.stats(kind).crew, 0);
            }
        }
    }

    #[test]
    fn test_rock_paper_scissors_values() {
        let table = UnitTable::default();
        assert_eq!(table.battleship.combat_value, 4);
        assert_eq!(table.destroyer.combat_value, 2);
        assert_eq!(table.carrier.combat_value, 6);
    }

    #[test]
    fn test_table_ron_roundtrip() {
        let table = UnitTable::default();
        let text = ron::to_string(&table).unwrap();
        let parsed: UnitTable = ron::from_str(&text).unwrap();
        assert_eq!(parsed, table);
    }
}
