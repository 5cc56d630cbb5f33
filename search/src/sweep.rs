//! Ordering & Assignment Iterator.
//!
//! For one subset, [`SubsetSweep`] walks every group ordering (permutation)
//! and, for each ordering, every candidate combination (odometer). The
//! subset's tasks are flattened in the current group order, so labels and
//! chosen values come out as parallel sequences in hash order.
//!
//! [`AssignmentCursor`] strings sweeps together across a
//! [`SubsetFrontier`]: it is the explicit, resumable state of the whole
//! search (dispatched subset, permutation, odometer digits). It is finite and
//! not restartable once exhausted.
//!
//! Sweep buffers are reused; only moving to the next subset allocates.

use ddap_kernel::store::CandidateStore;

use crate::odometer::Odometer;
use crate::permutation::next_permutation;
use crate::subset::{ScheduledSubset, SubsetFrontier};

/// Which level of a sweep moved on [`SubsetSweep::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepStep {
    /// Next candidate combination under the same ordering.
    Combination,
    /// Combinations exhausted; moved to the next group ordering.
    Permutation,
    /// All orderings of this subset are exhausted.
    Done,
}

/// Permutation × odometer walk over a single subset.
#[derive(Debug, Clone, Default)]
pub struct SubsetSweep {
    groups: Vec<usize>,
    /// Permutation over positions in `groups`.
    order: Vec<usize>,
    /// Global task indices in hash order.
    tasks: Vec<usize>,
    odometer: Odometer,
    exhausted: bool,
}

impl SubsetSweep {
    /// An exhausted sweep; call [`SubsetSweep::reset`] to position it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            exhausted: true,
            ..Self::default()
        }
    }

    /// Position at the first ordering (ascending group order) and the
    /// all-zero combination of `subset`.
    pub fn reset(&mut self, store: &CandidateStore, subset: &[usize]) {
        self.groups.clear();
        self.groups.extend_from_slice(subset);
        self.order.clear();
        self.order.extend(0..subset.len());
        self.exhausted = false;
        self.layout(store);
    }

    fn layout(&mut self, store: &CandidateStore) {
        self.tasks.clear();
        for &pos in &self.order {
            self.tasks.extend(store.groups()[self.groups[pos]].task_range());
        }
        self.odometer
            .reset(self.tasks.iter().map(|&t| store.task(t).base()));
    }

    /// Step to the next combination, rolling over to the next ordering when
    /// the odometer wraps.
    pub fn advance(&mut self, store: &CandidateStore) -> SweepStep {
        if self.exhausted {
            return SweepStep::Done;
        }
        if self.odometer.advance() {
            return SweepStep::Combination;
        }
        if next_permutation(&mut self.order) {
            self.layout(store);
            return SweepStep::Permutation;
        }
        self.exhausted = true;
        SweepStep::Done
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Subset group indices, ascending.
    #[must_use]
    pub fn subset(&self) -> &[usize] {
        &self.groups
    }

    /// Group indices in the current hash order.
    pub fn ordered_groups(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().map(|&pos| self.groups[pos])
    }

    /// Current odometer digits, one per task in hash order.
    #[must_use]
    pub fn digits(&self) -> &[usize] {
        self.odometer.digits()
    }

    /// `(global task index, candidate index)` for the current combination.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.tasks
            .iter()
            .copied()
            .zip(self.odometer.digits().iter().copied())
    }

    /// Labels in hash order.
    pub fn keys<'a>(&'a self, store: &'a CandidateStore) -> impl Iterator<Item = &'a str> + 'a {
        self.tasks.iter().map(move |&t| store.task(t).label())
    }

    /// Chosen candidates in hash order, parallel to [`SubsetSweep::keys`].
    pub fn values<'a>(&'a self, store: &'a CandidateStore) -> impl Iterator<Item = &'a str> + 'a {
        self.positions()
            .map(move |(t, d)| store.task(t).candidates()[d].as_str())
    }
}

/// Which level of the search moved on [`AssignmentCursor::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorStep {
    Combination,
    Permutation,
    /// Moved to the next subset from the frontier.
    Subset,
    /// Every subset is exhausted.
    Exhausted,
}

/// Resumable search state over every size-`k` subset, cheapest first.
#[derive(Debug, Clone)]
pub struct AssignmentCursor<'a> {
    store: &'a CandidateStore,
    frontier: SubsetFrontier,
    current: Option<ScheduledSubset>,
    sweep: SubsetSweep,
}

impl<'a> AssignmentCursor<'a> {
    /// Cursor at the first assignment of the cheapest subset. Exhausted
    /// immediately if no size-`k` subset exists.
    #[must_use]
    pub fn new(store: &'a CandidateStore, k: usize) -> Self {
        let mut frontier = SubsetFrontier::new(store, k);
        let current = frontier.next();
        let mut sweep = SubsetSweep::new();
        if let Some(subset) = &current {
            sweep.reset(store, &subset.groups);
        }
        Self {
            store,
            frontier,
            current,
            sweep,
        }
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.sweep.is_exhausted()
    }

    /// The subset being swept, with its dispatch position and score.
    #[must_use]
    pub fn subset(&self) -> Option<&ScheduledSubset> {
        self.current.as_ref()
    }

    /// Number of size-`k` subsets in the whole space.
    #[must_use]
    pub fn subset_total(&self) -> u128 {
        self.frontier.total()
    }

    /// The sweep over the current subset.
    #[must_use]
    pub fn sweep(&self) -> &SubsetSweep {
        &self.sweep
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.sweep.keys(self.store)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> + '_ {
        self.sweep.values(self.store)
    }

    /// Step to the next assignment.
    pub fn advance(&mut self) -> CursorStep {
        match self.sweep.advance(self.store) {
            SweepStep::Combination => CursorStep::Combination,
            SweepStep::Permutation => CursorStep::Permutation,
            SweepStep::Done => match self.frontier.next() {
                Some(subset) => {
                    self.sweep.reset(self.store, &subset.groups);
                    self.current = Some(subset);
                    CursorStep::Subset
                }
                None => CursorStep::Exhausted,
            },
        }
    }
}
