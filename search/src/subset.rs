//! Subset Enumerator: every size-`k` subset of groups, cheapest first.
//!
//! Subsets are produced lazily by a best-first frontier ordered by
//! `(complexity score, groups)`, where `groups` is the subset's ascending
//! group indices. Comparing those lexicographically is the same as comparing
//! positions in natural combination order, so ties resolve deterministically.
//!
//! Groups are ranked by `(weight, index)`. A frontier entry is a set of `k`
//! ranks plus the rank slot it is still allowed to move. Each popped entry
//! pushes at most two successors: its active slot one rank up, or the slot
//! below it one rank up (which then becomes active). Every subset has exactly
//! one such path from `[0, 1, .., k-1]`, and every successor compares strictly
//! greater than its parent, so pops come out sorted and never repeat. The
//! heap holds at most one entry more than the number of subsets popped.
//!
//! The complexity score is the product of candidate counts over every task of
//! every group in the subset. A task with no recorded candidates scores as
//! [`UNRECORDED_CHOICE_WEIGHT`].

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ddap_kernel::store::CandidateStore;

/// Weight of a task with zero recorded candidates ("any of the usual 4 options").
pub const UNRECORDED_CHOICE_WEIGHT: u128 = 4;

/// Choice weight of a single task.
#[must_use]
pub fn choice_weight(candidate_count: usize) -> u128 {
    if candidate_count == 0 {
        UNRECORDED_CHOICE_WEIGHT
    } else {
        candidate_count as u128
    }
}

/// Product of choice weights over one group's tasks (saturating).
#[must_use]
pub fn group_weight(task_bases: &[usize]) -> u128 {
    task_bases
        .iter()
        .fold(1u128, |acc, &b| acc.saturating_mul(choice_weight(b)))
}

/// `C(n, k)` saturating at `u128::MAX`.
#[must_use]
pub fn binomial(n: usize, k: usize) -> u128 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc = 1u128;
    for i in 0..k {
        // Exact at every step: acc * (n - i) is divisible by (i + 1).
        acc = match acc.checked_mul((n - i) as u128) {
            Some(v) => v / (i as u128 + 1),
            None => return u128::MAX,
        };
    }
    acc
}

/// One dispatched subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSubset {
    /// Zero-based dispatch position.
    pub position: u64,
    /// Product of choice weights over the subset's tasks.
    pub score: u128,
    /// Group indices, ascending.
    pub groups: Vec<usize>,
}

/// Heap key. `groups` breaks score ties in natural combination order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct FrontierKey {
    score: u128,
    groups: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FrontierEntry {
    key: Reverse<FrontierKey>,
    /// Ascending ranks into `SubsetFrontier::by_rank`.
    ranks: Vec<usize>,
    active: usize,
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Lazy cheapest-first stream of all size-`k` group subsets.
#[derive(Debug, Clone)]
pub struct SubsetFrontier {
    k: usize,
    /// Group index per rank, ordered by `(weight, index)`.
    by_rank: Vec<usize>,
    /// Group weight per group index.
    weights: Vec<u128>,
    heap: BinaryHeap<FrontierEntry>,
    dispatched: u64,
}

impl SubsetFrontier {
    /// Frontier over the store's groups. `k > n` yields nothing.
    #[must_use]
    pub fn new(store: &CandidateStore, k: usize) -> Self {
        let weights: Vec<u128> = store
            .shape()
            .iter()
            .map(|bases| group_weight(bases))
            .collect();
        Self::from_group_weights(&weights, k)
    }

    /// Frontier over per-group weights directly.
    #[must_use]
    pub fn from_group_weights(weights: &[u128], k: usize) -> Self {
        let mut by_rank: Vec<usize> = (0..weights.len()).collect();
        by_rank.sort_by_key(|&g| (weights[g], g));
        let mut frontier = Self {
            k,
            by_rank,
            weights: weights.to_vec(),
            heap: BinaryHeap::new(),
            dispatched: 0,
        };
        if k <= weights.len() {
            frontier.push((0..k).collect(), k.saturating_sub(1));
        }
        frontier
    }

    /// Total number of subsets, `C(n, k)`.
    #[must_use]
    pub fn total(&self) -> u128 {
        binomial(self.weights.len(), self.k)
    }

    fn push(&mut self, ranks: Vec<usize>, active: usize) {
        let mut groups: Vec<usize> = ranks.iter().map(|&r| self.by_rank[r]).collect();
        groups.sort_unstable();
        let score = groups
            .iter()
            .fold(1u128, |acc, &g| acc.saturating_mul(self.weights[g]));
        self.heap.push(FrontierEntry {
            key: Reverse(FrontierKey { score, groups }),
            ranks,
            active,
        });
    }

    fn expand(&mut self, ranks: &[usize], active: usize) {
        if ranks.is_empty() {
            return;
        }
        let bound = ranks.get(active + 1).copied().unwrap_or(self.by_rank.len());
        if ranks[active] + 1 < bound {
            let mut next = ranks.to_vec();
            next[active] += 1;
            self.push(next, active);
        }
        if active > 0 && ranks[active - 1] + 1 < ranks[active] {
            let mut next = ranks.to_vec();
            next[active - 1] += 1;
            self.push(next, active - 1);
        }
    }
}

impl Iterator for SubsetFrontier {
    type Item = ScheduledSubset;

    fn next(&mut self) -> Option<ScheduledSubset> {
        let entry = self.heap.pop()?;
        self.expand(&entry.ranks, entry.active);
        let Reverse(FrontierKey { score, groups }) = entry.key;
        let position = self.dispatched;
        self.dispatched += 1;
        Some(ScheduledSubset {
            position,
            score,
            groups,
        })
    }
}
