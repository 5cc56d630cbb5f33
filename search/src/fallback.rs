//! Fallback Recorder: diagnostic values for tasks outside a result.
//!
//! On a match, tasks outside the matched groups get a value drawn uniformly
//! from their candidates using a caller-supplied random source. On timeout
//! or exhaustion, every task reports the last candidate the search positioned
//! on for it. Neither is a validated answer.

use ddap_kernel::store::CandidateStore;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::outcome::{LastAttempt, RepresentativeValue};

/// Last candidate index positioned on, per global task index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastAttempts {
    slots: Vec<Option<usize>>,
}

impl LastAttempts {
    #[must_use]
    pub fn new(task_count: usize) -> Self {
        Self {
            slots: vec![None; task_count],
        }
    }

    /// Record the current `(task, candidate)` positions.
    pub fn record(&mut self, positions: impl IntoIterator<Item = (usize, usize)>) {
        for (task, candidate) in positions {
            self.slots[task] = Some(candidate);
        }
    }

    /// Overlay another recorder's slots onto these; recorded slots win.
    pub fn merge(&mut self, other: &Self) {
        for (mine, theirs) in self.slots.iter_mut().zip(&other.slots) {
            if theirs.is_some() {
                *mine = *theirs;
            }
        }
    }

    /// One entry per task, in store order.
    #[must_use]
    pub fn snapshot(&self, store: &CandidateStore) -> Vec<LastAttempt> {
        store
            .tasks()
            .iter()
            .zip(&self.slots)
            .map(|(task, slot)| LastAttempt {
                label: task.label().to_string(),
                value: slot.map(|c| task.candidates()[c].clone()),
            })
            .collect()
    }
}

/// Representative values for every task whose group is not in `matched_groups`.
pub fn representatives<R: Rng + ?Sized>(
    store: &CandidateStore,
    matched_groups: &[usize],
    rng: &mut R,
) -> Vec<RepresentativeValue> {
    store
        .tasks()
        .iter()
        .enumerate()
        .filter(|(i, _)| !matched_groups.contains(&store.group_of(*i)))
        .filter_map(|(_, task)| {
            task.candidates()
                .choose(&mut *rng)
                .map(|value| RepresentativeValue {
                    label: task.label().to_string(),
                    value: value.clone(),
                })
        })
        .collect()
}
