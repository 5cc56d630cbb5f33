//! Search outcomes and counters.
//!
//! A matched assignment and the diagnostic values shown for tasks outside it
//! are different types on purpose: [`AssignedValue`] re-hashes to the target,
//! [`RepresentativeValue`] and [`LastAttempt`] carry no correctness guarantee.

use ddap_kernel::canon::{canonical_json_bytes, CanonError};

/// One `(label, value)` pair of a matched assignment, in hash order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedValue {
    pub label: String,
    pub value: String,
}

/// A display-only value for a task outside the matched groups, drawn
/// uniformly from its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeValue {
    pub label: String,
    pub value: String,
}

/// The last value the search positioned on for a task. `None` if the task
/// was never part of an attempted subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastAttempt {
    pub label: String,
    pub value: Option<String>,
}

/// How a search terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A subset, ordering, assignment and nonce hash to the target.
    Matched {
        /// Group indices in hash order.
        groups: Vec<usize>,
        /// Pairs in the exact order hashed.
        assignment: Vec<AssignedValue>,
        nonce: u64,
        /// One entry per task outside `groups`, in store order.
        outside: Vec<RepresentativeValue>,
    },
    /// The whole space was searched without a match.
    Exhausted {
        /// One entry per task, in store order.
        last_attempts: Vec<LastAttempt>,
    },
    /// The time budget expired before a match or exhaustion.
    TimedOut {
        /// One entry per task, in store order.
        last_attempts: Vec<LastAttempt>,
    },
}

impl SearchOutcome {
    #[must_use]
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }

    /// Stable lower-case name of the variant.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Matched { .. } => "matched",
            Self::Exhausted { .. } => "exhausted",
            Self::TimedOut { .. } => "timed_out",
        }
    }

    /// The matched pairs as `(label, value)` tuples, ready for re-hashing.
    #[must_use]
    pub fn matched_pairs(&self) -> Option<Vec<(&str, &str)>> {
        match self {
            Self::Matched { assignment, .. } => Some(
                assignment
                    .iter()
                    .map(|a| (a.label.as_str(), a.value.as_str()))
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Work counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatsV1 {
    /// Size-`k` subsets in the whole space (saturating).
    pub schedule_len: u64,
    /// Subsets whose sweep was started.
    pub subsets_dispatched: u64,
    /// Group orderings started.
    pub permutations_visited: u64,
    /// Candidate combinations hashed.
    pub combinations_visited: u64,
    /// Digest evaluations (combinations × nonces tried).
    pub digests_evaluated: u64,
}

impl SearchStatsV1 {
    /// Sum the counters of another worker into these. `schedule_len` is shared.
    pub fn absorb(&mut self, other: &Self) {
        self.subsets_dispatched += other.subsets_dispatched;
        self.permutations_visited += other.permutations_visited;
        self.combinations_visited += other.combinations_visited;
        self.digests_evaluated += other.digests_evaluated;
    }
}

/// Outcome plus counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: SearchOutcome,
    pub stats: SearchStatsV1,
}

// ---------------------------------------------------------------------------
// Canonical JSON serialization
// ---------------------------------------------------------------------------

impl SearchResult {
    /// Serialize to canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CanonError`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, CanonError> {
        canonical_json_bytes(&self.to_json_value())
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::json!({
            "outcome": outcome_to_json(&self.outcome),
            "stats": stats_to_json(&self.stats),
        })
    }
}

fn outcome_to_json(o: &SearchOutcome) -> serde_json::Value {
    match o {
        SearchOutcome::Matched {
            groups,
            assignment,
            nonce,
            outside,
        } => serde_json::json!({
            "assignment": assignment
                .iter()
                .map(|a| serde_json::json!({"label": a.label, "value": a.value}))
                .collect::<Vec<_>>(),
            "groups": groups,
            "nonce": nonce,
            "outside": outside
                .iter()
                .map(|r| serde_json::json!({"label": r.label, "representative": r.value}))
                .collect::<Vec<_>>(),
            "type": o.kind(),
        }),
        SearchOutcome::Exhausted { last_attempts } | SearchOutcome::TimedOut { last_attempts } => {
            serde_json::json!({
                "last_attempts": last_attempts
                    .iter()
                    .map(|l| serde_json::json!({"label": l.label, "last_attempted": l.value}))
                    .collect::<Vec<_>>(),
                "type": o.kind(),
            })
        }
    }
}

fn stats_to_json(s: &SearchStatsV1) -> serde_json::Value {
    serde_json::json!({
        "combinations_visited": s.combinations_visited,
        "digests_evaluated": s.digests_evaluated,
        "permutations_visited": s.permutations_visited,
        "schedule_len": s.schedule_len,
        "subsets_dispatched": s.subsets_dispatched,
    })
}
