//! Determinism testing utilities.
//!
//! Provides a harness for verifying that games and battles produce
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every node replaying the same operations must reach the same ledger.
//! Sources of non-determinism include:
//!
//! - **Floating-point math**: the core uses integers only.
//!
//! - **HashMap iteration order**: the ledger uses ordered maps and the
//!   state hash walks planets in location order.
//!
//! - **System randomness and wall clocks**: salts are caller supplied and
//!   time is a caller-supplied block height.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual formulas (location hashing, combat)
//! 2. **Property tests**: random fleets still produce repeatable outcomes
//! 3. **Integration tests**: full lifecycle scenarios are reproducible
//! 4. **Parallel tests**: running N games on N threads all match

use std::thread;

use conquest_core::prelude::*;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps applied per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for a deterministic game).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Game is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a stateful process multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `steps` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
///
/// # Example
///
/// ```ignore
/// use conquest_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,
///     20,
///     || setup_world(),
///     |world| { world.game.clock().advance(1); },
///     |world| world.game.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for i in 0..steps {
            step(&mut state, i);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    if !is_deterministic {
        tracing::warn!(runs, steps, ?hashes, "Runs diverged");
    }

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Result of parallel game runs.
#[derive(Debug, Clone)]
pub struct ParallelRunResult {
    /// Final state hash from each game.
    pub hashes: Vec<u64>,
    /// Number of games run.
    pub num_games: usize,
}

impl ParallelRunResult {
    /// Check if all games produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all games matched.
    ///
    /// # Panics
    ///
    /// Panics if games produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel games diverged!\n\
                 Games: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_games,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Play N games on scoped threads and collect their final state hashes.
///
/// `play` builds and drives one game to completion.
///
/// # Panics
///
/// Panics if a game thread panics.
pub fn run_parallel_games<F>(play: F, num_games: usize) -> ParallelRunResult
where
    F: Fn() -> Game + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| s.spawn(|| play().state_hash()))
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("game thread panicked"))
            .collect()
    });

    tracing::debug!(num_games, "Parallel games finished");
    ParallelRunResult { hashes, num_games }
}

/// Resolve the same matchup on N threads and check every outcome matches.
///
/// # Panics
///
/// Panics if a battle thread panics.
#[must_use]
pub fn verify_parallel_battles(
    strategy: &dyn CombatStrategy,
    attack: &AttackFleet,
    defense: &PlanetaryDefense,
    num_threads: usize,
) -> bool {
    let outcomes: Vec<BattleOutcome> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_threads)
            .map(|_| s.spawn(|| strategy.resolve(attack, defense)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("battle thread panicked"))
            .collect()
    });
    outcomes.windows(2).all(|w| w[0] == w[1])
}

/// Check that replaying a finished game's journal reproduces its state.
///
/// `play` must return a game with journaling enabled.
#[must_use]
pub fn verify_journal_determinism<F>(play: F) -> bool
where
    F: Fn() -> Game,
{
    let mut game = play();
    let Some(journal) = game.take_journal() else {
        return false;
    };
    match journal.replay() {
        Ok(replayed) => replayed.state_hash() == game.state_hash(),
        Err(_) => false,
    }
}

/// Proptest strategies for determinism and combat testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of the combat formulas and the lifecycle.
pub mod strategies {
    use conquest_core::prelude::*;
    use proptest::prelude::*;

    /// Any of the three factions.
    pub fn arb_faction() -> impl Strategy<Value = Faction> {
        prop_oneof![Just(Faction::A), Just(Faction::B), Just(Faction::C)]
    }

    /// Coordinates on the default map.
    pub fn arb_coordinates() -> impl Strategy<Value = Coordinates> {
        (0u64..=10_000, 0u64..=10_000).prop_map(|(x, y)| Coordinates::new(x, y))
    }

    /// Attack fleet with up to `max` units of each kind.
    pub fn arb_attack_fleet(max: u64) -> impl Strategy<Value = AttackFleet> {
        (arb_faction(), 0..=max, 0..=max, 0..=max, 0..=max)
            .prop_map(|(faction, bs, ds, cr, tt)| AttackFleet::new(faction, bs, ds, cr, tt))
    }

    /// Planetary defense with up to `max` units of each kind.
    pub fn arb_defense(max: u64) -> impl Strategy<Value = PlanetaryDefense> {
        (0..=max, 0..=max, 0..=max, 0..=max)
            .prop_map(|(bs, ds, cr, odp)| PlanetaryDefense::new(bs, ds, cr, odp))
    }

    /// Battle forces with up to `max` units of each kind.
    pub fn arb_forces(max: u64) -> impl Strategy<Value = Forces> {
        proptest::collection::vec(0..=max, 8).prop_map(|counts| {
            let mut forces = Forces::default();
            for (kind, count) in UnitKind::ALL.into_iter().zip(counts) {
                *forces.count_mut(kind) = count;
            }
            forces
        })
    }

    /// A salt.
    pub fn arb_salt() -> impl Strategy<Value = Salt> {
        any::<u64>().prop_map(Salt::from_u64)
    }
}
