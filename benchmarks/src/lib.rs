//! Shared helpers for ddap benchmark suites.

use ddap_kernel::digest::{commit_validation_set, TargetDigest};
use ddap_kernel::store::CandidateStore;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// A benchmark workload shape.
#[derive(Debug, Clone, Copy)]
pub struct Regime {
    pub name: &'static str,
    pub groups: usize,
    pub tasks_per_group: usize,
    pub candidates: usize,
    pub validation_size: usize,
    pub cost_of_mistake: u64,
}

/// Regimes from a handful of digests to a few hundred thousand.
pub const REGIMES: &[Regime] = &[
    Regime {
        name: "tiny_k1",
        groups: 4,
        tasks_per_group: 1,
        candidates: 4,
        validation_size: 1,
        cost_of_mistake: 0,
    },
    Regime {
        name: "quiz_k2",
        groups: 10,
        tasks_per_group: 1,
        candidates: 4,
        validation_size: 2,
        cost_of_mistake: 3,
    },
    Regime {
        name: "blocks_k2",
        groups: 6,
        tasks_per_group: 2,
        candidates: 3,
        validation_size: 2,
        cost_of_mistake: 1,
    },
    Regime {
        name: "quiz_k3",
        groups: 8,
        tasks_per_group: 1,
        candidates: 4,
        validation_size: 3,
        cost_of_mistake: 1,
    },
];

/// A uniform store for `regime`: every task has `candidates` values.
///
/// # Panics
///
/// Panics if the regime has zero tasks per group or zero candidates.
/// Benchmark setup failures are fatal.
#[must_use]
pub fn uniform_store(regime: &Regime) -> CandidateStore {
    let groups = (0..regime.groups)
        .map(|g| {
            (0..regime.tasks_per_group)
                .map(|t| {
                    let label = format!("Q{g}.{t}");
                    let candidates = (0..regime.candidates)
                        .map(|c| format!("A{g}.{t}.{c}"))
                        .collect::<Vec<_>>();
                    (label, candidates)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    CandidateStore::from_groups(groups).expect("uniform store")
}

/// A target committed from a random subset, ordering and assignment.
///
/// # Panics
///
/// Panics if the regime's validation size exceeds its group count.
#[must_use]
pub fn committed_target(store: &CandidateStore, regime: &Regime, seed: u64) -> TargetDigest {
    assert!(regime.validation_size <= store.group_count());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut groups: Vec<usize> = (0..store.group_count()).collect();
    groups.shuffle(&mut rng);

    let pairs: Vec<(&str, &str)> = groups[..regime.validation_size]
        .iter()
        .flat_map(|&g| store.group_tasks(g))
        .map(|task| {
            let value = task.candidates().choose(&mut rng).expect("non-empty");
            (task.label(), value.as_str())
        })
        .collect();
    let nonce = rng.gen_range(0..=regime.cost_of_mistake);
    commit_validation_set(&pairs, nonce)
}

/// A target no assignment reproduces, forcing a full sweep.
#[must_use]
pub fn unreachable_target() -> TargetDigest {
    TargetDigest::from_bytes([0u8; 32])
}
