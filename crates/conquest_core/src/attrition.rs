//! Four-phase attrition simulation.
//!
//! A battle runs through four phases, each consuming the survivors of the
//! previous one:
//!
//! 1. [`long_range_exchange`] - missile salvos against interceptors; missiles
//!    that get through are spread over the target's ships by cost share.
//! 2. [`capital_clash`] - matched battleships plus half of the destroyers and
//!    carrier wings engage.
//! 3. [`fleet_engagement`] - everything that is left engages.
//! 4. [`planetary_drop`] - strike craft and dropships against the orbital
//!    defenses; surviving dropships land troops.
//!
//! Every phase function is pure and returns a report with per-side losses.
//! Callers thread the survivors explicitly with [`PhaseReport::survivors`].
//!
//! All divisions treat a zero divisor as a zero quotient and all subtractions
//! saturate at zero.

use serde::{Deserialize, Serialize};

use crate::combat::{BattleOutcome, CombatStrategy};
use crate::config::{AttritionRules, DAMAGE_POTENTIAL_SCALE};
use crate::fleet::{AttackFleet, PlanetaryDefense, UnitCounts};
use crate::units::{UnitKind, UnitStats, UnitTable};

/// Per-kind unit counts of one side during a battle.
///
/// Used both for the forces still in play and for the losses of a phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct Forces {
    pub battleships: u64,
    pub destroyers: u64,
    pub carriers: u64,
    pub troop_transports: u64,
    pub orbital_defenses: u64,
    pub fighters: u64,
    pub drones: u64,
    pub dropships: u64,
}

impl Forces {
    /// Attacking forces, with the carrier wings launched.
    #[must_use]
    pub fn from_attack(fleet: &AttackFleet, rules: &AttritionRules) -> Self {
        Self {
            battleships: fleet.battleships,
            destroyers: fleet.destroyers,
            carriers: fleet.carriers,
            troop_transports: fleet.troop_transports,
            fighters: fleet.carriers.saturating_mul(rules.fighters_per_carrier),
            drones: fleet.carriers.saturating_mul(rules.drones_per_carrier),
            ..Self::default()
        }
    }

    /// Defending forces, with the carrier wings launched.
    #[must_use]
    pub fn from_defense(defense: &PlanetaryDefense, rules: &AttritionRules) -> Self {
        Self {
            battleships: defense.battleships,
            destroyers: defense.destroyers,
            carriers: defense.carriers,
            orbital_defenses: defense.orbital_defenses,
            fighters: defense.carriers.saturating_mul(rules.fighters_per_carrier),
            drones: defense.carriers.saturating_mul(rules.drones_per_carrier),
            ..Self::default()
        }
    }

    /// Mutable access to the count of one kind.
    pub fn count_mut(&mut self, kind: UnitKind) -> &mut u64 {
        match kind {
            UnitKind::Battleship => &mut self.battleships,
            UnitKind::Destroyer => &mut self.destroyers,
            UnitKind::Carrier => &mut self.carriers,
            UnitKind::TroopTransport => &mut self.troop_transports,
            UnitKind::OrbitalDefense => &mut self.orbital_defenses,
            UnitKind::Fighter => &mut self.fighters,
            UnitKind::Drone => &mut self.drones,
            UnitKind::Dropship => &mut self.dropships,
        }
    }

    /// Build forces from a per-kind function.
    #[must_use]
    pub fn from_fn<F: FnMut(UnitKind) -> u64>(mut f: F) -> Self {
        let mut forces = Self::default();
        for kind in UnitKind::ALL {
            *forces.count_mut(kind) = f(kind);
        }
        forces
    }

    /// What is left after `losses`, per kind, saturating at zero.
    #[must_use]
    pub fn without(&self, losses: &Forces) -> Self {
        Self::from_fn(|kind| self.count(kind).saturating_sub(losses.count(kind)))
    }

    /// `percent` of every count, rounded down.
    #[must_use]
    pub fn percent(&self, percent: u64) -> Self {
        Self::from_fn(|kind| clamp(u128::from(self.count(kind)) * u128::from(percent) / 100))
    }

    /// Launch dropships from every troop transport still in play.
    #[must_use]
    pub fn with_dropships_launched(mut self, rules: &AttritionRules) -> Self {
        self.dropships = self
            .dropships
            .saturating_add(self.troop_transports.saturating_mul(rules.dropships_per_transport));
        self
    }

    /// Total number of units of all kinds.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        UnitKind::ALL
            .iter()
            .fold(0u64, |acc, &kind| acc.saturating_add(self.count(kind)))
    }
}

impl UnitCounts for Forces {
    fn count(&self, kind: UnitKind) -> u64 {
        match kind {
            UnitKind::Battleship => self.battleships,
            UnitKind::Destroyer => self.destroyers,
            UnitKind::Carrier => self.carriers,
            UnitKind::TroopTransport => self.troop_transports,
            UnitKind::OrbitalDefense => self.orbital_defenses,
            UnitKind::Fighter => self.fighters,
            UnitKind::Drone => self.drones,
            UnitKind::Dropship => self.dropships,
        }
    }
}

fn clamp(value: u128) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

fn div(numerator: u128, denominator: u128) -> u128 {
    numerator.checked_div(denominator).unwrap_or(0)
}

/// Common view over the per-phase reports.
pub trait PhaseReport {
    /// Units the attacker lost in this phase.
    fn attacker_losses(&self) -> &Forces;

    /// Units the defender lost in this phase.
    fn defender_losses(&self) -> &Forces;

    /// Whether the attacker won this phase.
    fn did_attacker_win(&self) -> bool;

    /// Remaining forces of both sides after applying this phase's losses.
    fn survivors(&self, attacker: &Forces, defender: &Forces) -> (Forces, Forces) {
        (
            attacker.without(self.attacker_losses()),
            defender.without(self.defender_losses()),
        )
    }
}

/// One side's missile fire during the long-range exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volley {
    /// Missiles fired over all salvos.
    pub missiles_launched: u64,
    /// Missiles this side can intercept over all salvos.
    pub interceptors: u64,
    /// This side's missiles that the opponent failed to intercept.
    pub missiles_got_through: u64,
}

/// Result of phase 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRangeReport {
    /// Attacker fire.
    pub attacker_volley: Volley,
    /// Defender fire.
    pub defender_volley: Volley,
    /// Attacker missiles assigned to each defending kind.
    pub attacker_allocation: Forces,
    /// Defender missiles assigned to each attacking kind.
    pub defender_allocation: Forces,
    /// Attacker ships destroyed.
    pub attacker_losses: Forces,
    /// Defender ships destroyed.
    pub defender_losses: Forces,
    /// Attacker destroyed strictly more cost than it lost.
    pub did_attacker_win: bool,
}

impl PhaseReport for LongRangeReport {
    fn attacker_losses(&self) -> &Forces {
        &self.attacker_losses
    }

    fn defender_losses(&self) -> &Forces {
        &self.defender_losses
    }

    fn did_attacker_win(&self) -> bool {
        self.did_attacker_win
    }
}

/// Outcome of two committed groups meeting under the damage-potential rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClashReport {
    /// Units the attacker put into the clash.
    pub attacker_committed: Forces,
    /// Units the defender put into the clash.
    pub defender_committed: Forces,
    /// Attacker attack × scale ÷ defender health.
    pub attacker_damage_potential: u64,
    /// Defender attack × scale ÷ attacker health.
    pub defender_damage_potential: u64,
    /// Attacker losses.
    pub attacker_losses: Forces,
    /// Defender losses.
    pub defender_losses: Forces,
    /// Attacker had strictly higher damage potential.
    pub did_attacker_win: bool,
}

impl PhaseReport for ClashReport {
    fn attacker_losses(&self) -> &Forces {
        &self.attacker_losses
    }

    fn defender_losses(&self) -> &Forces {
        &self.defender_losses
    }

    fn did_attacker_win(&self) -> bool {
        self.did_attacker_win
    }
}

/// Result of phase 4.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetaryDropReport {
    /// The strike craft and orbital defense clash.
    pub clash: ClashReport,
    /// Dropships that survived the clash.
    pub dropships_landed: u64,
    /// Troops delivered by the surviving dropships.
    pub troops_landed: u64,
}

impl PhaseReport for PlanetaryDropReport {
    fn attacker_losses(&self) -> &Forces {
        &self.clash.attacker_losses
    }

    fn defender_losses(&self) -> &Forces {
        &self.clash.defender_losses
    }

    fn did_attacker_win(&self) -> bool {
        self.clash.did_attacker_win
    }
}

/// Full record of a simulated battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Phase 1.
    pub long_range: LongRangeReport,
    /// Phase 2.
    pub capital_clash: ClashReport,
    /// Phase 3.
    pub fleet_engagement: ClashReport,
    /// Phase 4.
    pub planetary_drop: PlanetaryDropReport,
    /// Attacker forces after the last phase.
    pub attacker_remaining: Forces,
    /// Defender forces after the last phase.
    pub defender_remaining: Forces,
    /// The attacker won the drop and landed at least one troop.
    pub invasion_succeeded: bool,
}

fn per_salvo(forces: &Forces, units: &UnitTable, capacity: fn(&UnitStats) -> u64) -> u64 {
    UnitKind::ALL.iter().fold(0u64, |acc, &kind| {
        acc.saturating_add(forces.count(kind).saturating_mul(capacity(units.stats(kind))))
    })
}

/// Fire of one side over all salvos, against the opponent's interceptors.
#[must_use]
pub fn volley(side: &Forces, opponent: &Forces, units: &UnitTable, salvos: u64) -> Volley {
    let missiles_launched =
        per_salvo(side, units, |s| s.missile_salvo_capacity).saturating_mul(salvos);
    let interceptors = per_salvo(side, units, |s| s.interceptor_capacity).saturating_mul(salvos);
    let opposing_interceptors =
        per_salvo(opponent, units, |s| s.interceptor_capacity).saturating_mul(salvos);

    Volley {
        missiles_launched,
        interceptors,
        missiles_got_through: missiles_launched.saturating_sub(opposing_interceptors),
    }
}

/// Spread `missiles` over the target's kinds by each kind's share of total cost.
///
/// The per-kind results are rounded down, so they never sum to more than
/// `missiles`.
#[must_use]
pub fn allocate_missiles(target: &Forces, missiles: u64, units: &UnitTable) -> Forces {
    let total_cost: u128 = UnitKind::ALL
        .iter()
        .map(|&kind| u128::from(target.count(kind)) * u128::from(units.stats(kind).cost))
        .sum();
    Forces::from_fn(|kind| {
        let kind_cost = u128::from(target.count(kind)) * u128::from(units.stats(kind).cost);
        clamp(div(kind_cost * u128::from(missiles), total_cost))
    })
}

/// Ships destroyed by an allocation: `min(count, allocated ÷ point defense)`.
#[must_use]
pub fn missile_damage(target: &Forces, allocation: &Forces, units: &UnitTable) -> Forces {
    Forces::from_fn(|kind| {
        let pdc = u128::from(units.stats(kind).point_defense_capacity);
        let destroyed = clamp(div(u128::from(allocation.count(kind)), pdc));
        destroyed.min(target.count(kind))
    })
}

/// Phase 1: long-range missile exchange.
#[must_use]
pub fn long_range_exchange(
    attacker: &Forces,
    defender: &Forces,
    units: &UnitTable,
    rules: &AttritionRules,
) -> LongRangeReport {
    let attacker_volley = volley(attacker, defender, units, rules.missile_salvos);
    let defender_volley = volley(defender, attacker, units, rules.missile_salvos);

    let attacker_allocation =
        allocate_missiles(defender, attacker_volley.missiles_got_through, units);
    let defender_allocation =
        allocate_missiles(attacker, defender_volley.missiles_got_through, units);

    let defender_losses = missile_damage(defender, &attacker_allocation, units);
    let attacker_losses = missile_damage(attacker, &defender_allocation, units);

    LongRangeReport {
        did_attacker_win: defender_losses.total_cost(units) > attacker_losses.total_cost(units),
        attacker_volley,
        defender_volley,
        attacker_allocation,
        defender_allocation,
        attacker_losses,
        defender_losses,
    }
}

/// `attack × scale ÷ opposing health`, zero when the opponent has no health.
#[must_use]
pub fn damage_potential(side: &Forces, opponent: &Forces, units: &UnitTable) -> u64 {
    let attack = u128::from(side.total_attack(units)) * u128::from(DAMAGE_POTENTIAL_SCALE);
    clamp(div(attack, u128::from(opponent.total_health(units))))
}

/// Resolve two committed groups with the damage-potential rule.
///
/// The attacker wins when its damage potential is at least the defender's
/// and it brought attack power, so a tie between armed sides goes to the
/// attacker and a clash with no attack power on either side goes to the
/// defender. An attacker facing nothing wins as long as it can attack. The
/// winner loses `winner_loss_percent` of its committed units per kind, the
/// loser `loser_loss_percent`.
#[must_use]
pub fn clash(
    attacker_committed: Forces,
    defender_committed: Forces,
    units: &UnitTable,
    rules: &AttritionRules,
) -> ClashReport {
    let attacker_damage_potential = damage_potential(&attacker_committed, &defender_committed, units);
    let defender_damage_potential = damage_potential(&defender_committed, &attacker_committed, units);
    // An uncontested attacker still wins if it brought any attack power.
    let uncontested = defender_committed.total_health(units) == 0
        && attacker_committed.total_attack(units) > 0;
    let did_attacker_win = uncontested
        || (attacker_damage_potential >= defender_damage_potential
            && attacker_committed.total_attack(units) > 0);

    let (attacker_percent, defender_percent) = if did_attacker_win {
        (rules.winner_loss_percent, rules.loser_loss_percent)
    } else {
        (rules.loser_loss_percent, rules.winner_loss_percent)
    };

    ClashReport {
        attacker_losses: attacker_committed.percent(attacker_percent),
        defender_losses: defender_committed.percent(defender_percent),
        attacker_committed,
        defender_committed,
        attacker_damage_potential,
        defender_damage_potential,
        did_attacker_win,
    }
}

/// Units one side commits to the capital clash.
fn capital_commitment(side: &Forces, matched_battleships: u64) -> Forces {
    Forces {
        battleships: matched_battleships,
        destroyers: side.destroyers / 2,
        fighters: side.fighters / 2,
        drones: side.drones / 2,
        ..Forces::default()
    }
}

/// Phase 2: capital ship clash.
///
/// Battleships pair off 1:1; each side also commits half of its destroyers,
/// fighters and drones.
#[must_use]
pub fn capital_clash(
    attacker: &Forces,
    defender: &Forces,
    units: &UnitTable,
    rules: &AttritionRules,
) -> ClashReport {
    let matched = attacker.battleships.min(defender.battleships);
    clash(
        capital_commitment(attacker, matched),
        capital_commitment(defender, matched),
        units,
        rules,
    )
}

/// Phase 3: both remaining fleets engage in full.
#[must_use]
pub fn fleet_engagement(
    attacker: &Forces,
    defender: &Forces,
    units: &UnitTable,
    rules: &AttritionRules,
) -> ClashReport {
    clash(*attacker, *defender, units, rules)
}

/// Phase 4: planetary drop.
///
/// The attacker's fighters, drones and dropships face the defender's orbital
/// defenses, fighters and drones. Dropships must already be launched, see
/// [`Forces::with_dropships_launched`].
#[must_use]
pub fn planetary_drop(
    attacker: &Forces,
    defender: &Forces,
    units: &UnitTable,
    rules: &AttritionRules,
) -> PlanetaryDropReport {
    let strike = Forces {
        fighters: attacker.fighters,
        drones: attacker.drones,
        dropships: attacker.dropships,
        ..Forces::default()
    };
    let orbital = Forces {
        orbital_defenses: defender.orbital_defenses,
        fighters: defender.fighters,
        drones: defender.drones,
        ..Forces::default()
    };

    let outcome = clash(strike, orbital, units, rules);
    let dropships_landed = strike.dropships.saturating_sub(outcome.attacker_losses.dropships);
    let troops_landed = dropships_landed.saturating_mul(rules.troops_per_dropship);

    PlanetaryDropReport {
        clash: outcome,
        dropships_landed,
        troops_landed,
    }
}

/// The four-phase attrition simulation as a [`CombatStrategy`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PhasedAttrition {
    units: UnitTable,
    rules: AttritionRules,
}

impl PhasedAttrition {
    /// Create the simulation with the given unit table and constants.
    #[must_use]
    pub const fn new(units: UnitTable, rules: AttritionRules) -> Self {
        Self { units, rules }
    }

    /// Run all four phases and return the full report.
    #[must_use]
    pub fn simulate(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> BattleReport {
        let units = &self.units;
        let rules = &self.rules;
        let attacker = Forces::from_attack(attack, rules);
        let defender = Forces::from_defense(defense, rules);

        let long_range = long_range_exchange(&attacker, &defender, units, rules);
        let (attacker, defender) = long_range.survivors(&attacker, &defender);
        tracing::debug!(
            attacker_lost = long_range.attacker_losses.total_units(),
            defender_lost = long_range.defender_losses.total_units(),
            attacker_won = long_range.did_attacker_win,
            "Long-range exchange"
        );

        let capital = capital_clash(&attacker, &defender, units, rules);
        let (attacker, defender) = capital.survivors(&attacker, &defender);
        tracing::debug!(
            attacker_dp = capital.attacker_damage_potential,
            defender_dp = capital.defender_damage_potential,
            attacker_won = capital.did_attacker_win,
            "Capital clash"
        );

        let engagement = fleet_engagement(&attacker, &defender, units, rules);
        let (attacker, defender) = engagement.survivors(&attacker, &defender);
        tracing::debug!(
            attacker_dp = engagement.attacker_damage_potential,
            defender_dp = engagement.defender_damage_potential,
            attacker_won = engagement.did_attacker_win,
            "Fleet engagement"
        );

        let attacker = attacker.with_dropships_launched(rules);
        let drop = planetary_drop(&attacker, &defender, units, rules);
        let (attacker_remaining, defender_remaining) = drop.survivors(&attacker, &defender);
        tracing::debug!(
            dropships_landed = drop.dropships_landed,
            troops_landed = drop.troops_landed,
            attacker_won = drop.clash.did_attacker_win,
            "Planetary drop"
        );

        BattleReport {
            invasion_succeeded: drop.clash.did_attacker_win && drop.troops_landed > 0,
            long_range,
            capital_clash: capital,
            fleet_engagement: engagement,
            planetary_drop: drop,
            attacker_remaining,
            defender_remaining,
        }
    }
}

impl CombatStrategy for PhasedAttrition {
    fn name(&self) -> &'static str {
        "phased_attrition"
    }

    fn resolve(&self, attack: &AttackFleet, defense: &PlanetaryDefense) -> BattleOutcome {
        let report = self.simulate(attack, defense);
        BattleOutcome {
            defender_won: !report.invasion_succeeded,
            report: Some(report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factions::Faction;

    fn setup() -> (UnitTable, AttritionRules) {
        (UnitTable::default(), AttritionRules::default())
    }

    #[test]
    fn test_forces_launch_carrier_wings() {
        let (_, rules) = setup();
        let forces = Forces::from_attack(&AttackFleet::new(Faction::A, 0, 0, 2, 3), &rules);
        assert_eq!(forces.fighters, 20);
        assert_eq!(forces.drones, 40);
        assert_eq!(forces.troop_transports, 3);
        assert_eq!(forces.dropships, 0);
        assert_eq!(forces.with_dropships_launched(&rules).dropships, 12);
    }

    #[test]
    fn test_without_saturates() {
        let forces = Forces {
            battleships: 2,
            ..Forces::default()
        };
        let losses = Forces {
            battleships: 5,
            destroyers: 1,
            ..Forces::default()
        };
        assert_eq!(forces.without(&losses), Forces::default());
    }

    #[test]
    fn test_percent_rounds_down() {
        let forces = Forces {
            battleships: 9,
            destroyers: 1,
            ..Forces::default()
        };
        let fifth = forces.percent(20);
        assert_eq!(fifth.battleships, 1);
        assert_eq!(fifth.destroyers, 0);
    }

    #[test]
    fn test_long_range_destroys_defending_battleships() {
        let (units, rules) = setup();
        let attacker = Forces {
            destroyers: 10,
            ..Forces::default()
        };
        let defender = Forces {
            battleships: 5,
            ..Forces::default()
        };
        let report = long_range_exchange(&attacker, &defender, &units, &rules);

        // 10 destroyers * 6 * 3 salvos, minus 5 battleships * 4 * 3 interceptors.
        assert_eq!(report.attacker_volley.missiles_launched, 180);
        assert_eq!(report.attacker_volley.missiles_got_through, 120);
        assert_eq!(report.attacker_allocation.battleships, 120);
        assert_eq!(report.defender_losses.battleships, 5);

        // 60 defender missiles against 60 attacker interceptors.
        assert_eq!(report.defender_volley.missiles_got_through, 0);
        assert_eq!(report.attacker_losses, Forces::default());
        assert!(report.did_attacker_win);
    }

    #[test]
    fn test_no_missiles_destroy_nothing() {
        let (units, rules) = setup();
        let attacker = Forces::from_attack(&AttackFleet::new(Faction::B, 0, 0, 7, 4), &rules);
        let defender = Forces::from_defense(&PlanetaryDefense::new(0, 0, 0, 3), &rules);
        let report = long_range_exchange(&attacker, &defender, &units, &rules);
        assert_eq!(report.attacker_volley.missiles_launched, 0);
        assert_eq!(report.defender_losses, Forces::default());
    }

    #[test]
    fn test_allocation_of_empty_target_is_zero() {
        let (units, _) = setup();
        assert_eq!(
            allocate_missiles(&Forces::default(), 1000, &units),
            Forces::default()
        );
    }

    #[test]
    fn test_capital_clash_commitment() {
        let (units, rules) = setup();
        let attacker = Forces {
            battleships: 4,
            destroyers: 4,
            ..Forces::default()
        };
        let defender = Forces {
            battleships: 2,
            ..Forces::default()
        };
        let report = capital_clash(&attacker, &defender, &units, &rules);

        assert_eq!(report.attacker_committed.battleships, 2);
        assert_eq!(report.attacker_committed.destroyers, 2);
        assert_eq!(report.defender_committed.battleships, 2);
        // (2*50 + 2*25) * 1000 / 200
        assert_eq!(report.attacker_damage_potential, 750);
        // 100 * 1000 / 280
        assert_eq!(report.defender_damage_potential, 357);
        assert!(report.did_attacker_win);
        assert_eq!(report.attacker_losses, Forces::default());
        assert_eq!(report.defender_losses.battleships, 1);
    }

    #[test]
    fn test_mirrored_clash_goes_to_attacker() {
        let (units, rules) = setup();
        let side = Forces {
            destroyers: 10,
            ..Forces::default()
        };
        let report = clash(side, side, &units, &rules);
        assert_eq!(report.attacker_damage_potential, 625);
        assert_eq!(report.defender_damage_potential, 625);
        assert!(report.did_attacker_win);
        assert_eq!(report.attacker_losses.destroyers, 2);
        assert_eq!(report.defender_losses.destroyers, 5);
    }

    #[test]
    fn test_unarmed_tie_goes_to_defender() {
        let (mut units, rules) = setup();
        units.troop_transport.attack = 0;
        let side = Forces {
            troop_transports: 3,
            ..Forces::default()
        };
        let report = clash(side, side, &units, &rules);
        assert_eq!(report.attacker_damage_potential, 0);
        assert_eq!(report.defender_damage_potential, 0);
        assert!(!report.did_attacker_win);
    }

    #[test]
    fn test_empty_clash_is_defender_favoured() {
        let (units, rules) = setup();
        let report = clash(Forces::default(), Forces::default(), &units, &rules);
        assert_eq!(report.attacker_damage_potential, 0);
        assert_eq!(report.defender_damage_potential, 0);
        assert!(!report.did_attacker_win);
    }

    #[test]
    fn test_planetary_drop_lands_troops() {
        let (units, rules) = setup();
        let attacker = Forces {
            troop_transports: 2,
            fighters: 20,
            ..Forces::default()
        }
        .with_dropships_launched(&rules);
        let report = planetary_drop(&attacker, &Forces::default(), &units, &rules);

        assert!(report.clash.did_attacker_win);
        // 8 dropships, 20% of them lost.
        assert_eq!(report.clash.attacker_losses.dropships, 1);
        assert_eq!(report.dropships_landed, 7);
        assert_eq!(report.troops_landed, 175);
    }

    #[test]
    fn test_overwhelming_attack_invades() {
        let (units, rules) = setup();
        let sim = PhasedAttrition::new(units, rules);
        let attack = AttackFleet::new(Faction::C, 20, 20, 10, 10);
        let defense = PlanetaryDefense::new(1, 1, 0, 1);
        let outcome = sim.resolve(&attack, &defense);
        assert!(outcome.attacker_won());
        let report = outcome.report.expect("phased strategy always reports");
        assert!(report.invasion_succeeded);
        assert!(report.planetary_drop.troops_landed > 0);
    }

    #[test]
    fn test_attack_without_transports_never_invades() {
        let sim = PhasedAttrition::default();
        let attack = AttackFleet::new(Faction::C, 50, 50, 50, 0);
        let report = sim.simulate(&attack, &PlanetaryDefense::default());
        assert_eq!(report.planetary_drop.troops_landed, 0);
        assert!(!report.invasion_succeeded);
        assert!(sim.resolve(&attack, &PlanetaryDefense::default()).defender_won);
    }

    #[test]
    fn test_remaining_never_exceeds_initial() {
        let (units, rules) = setup();
        let sim = PhasedAttrition::new(units, rules.clone());
        let attack = AttackFleet::new(Faction::A, 7, 13, 3, 5);
        let defense = PlanetaryDefense::new(9, 4, 6, 11);
        let report = sim.simulate(&attack, &defense);

        let start = Forces::from_defense(&defense, &rules);
        for kind in UnitKind::ALL {
            assert!(report.defender_remaining.count(kind) <= start.count(kind));
        }
        assert!(report.attacker_remaining.battleships <= attack.battleships);
        assert!(report.attacker_remaining.troop_transports <= attack.troop_transports);
    }

    #[test]
    fn test_simulation_is_deterministic() {
        let sim = PhasedAttrition::default();
        let attack = AttackFleet::new(Faction::B, 12, 8, 4, 6);
        let defense = PlanetaryDefense::new(6, 10, 2, 8);
        assert_eq!(sim.simulate(&attack, &defense), sim.simulate(&attack, &defense));
    }
}
