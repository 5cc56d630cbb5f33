//! Search entry point and evaluation loop.

use std::time::{Duration, Instant};

use ddap_kernel::digest::TargetDigest;
use ddap_kernel::store::CandidateStore;
use log::{debug, trace, warn};
use rand::Rng;

use crate::error::SearchError;
use crate::fallback::{representatives, LastAttempts};
use crate::matcher::DigestMatcher;
use crate::outcome::{AssignedValue, SearchOutcome, SearchResult, SearchStatsV1};
use crate::policy::SearchConfigV1;
use crate::sweep::{AssignmentCursor, CursorStep, SubsetSweep};

/// Wall-clock budget measured from search start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    timeout: Option<Duration>,
}

impl Deadline {
    pub(crate) fn start(timeout: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            timeout,
        }
    }

    pub(crate) fn expired(&self) -> bool {
        self.timeout
            .is_some_and(|limit| self.start.elapsed() >= limit)
    }
}

/// Run the search over `store` for `target`.
///
/// Subsets are tried cheapest first; within a subset every group ordering,
/// every candidate combination and every nonce in `0..=cost_of_mistake`.
/// Subsets are produced on demand, so the size of the subset space never
/// delays the first digest or the deadline check.
/// `rng` is only used for display values of tasks outside a match.
///
/// `validation_size` larger than the number of groups is not an error: no
/// subset exists, so the result is `Exhausted` immediately.
///
/// # Errors
///
/// Returns [`SearchError::InvalidInput`] if the configuration fails
/// validation. No digest is evaluated in that case.
pub fn search<R: Rng + ?Sized>(
    store: &CandidateStore,
    target: &TargetDigest,
    config: &SearchConfigV1,
    rng: &mut R,
) -> Result<SearchResult, SearchError> {
    config.validate()?;
    let deadline = Deadline::start(config.timeout);
    let k = config.validation_size;
    let mut stats = SearchStatsV1::default();
    let mut last = LastAttempts::new(store.task_count());

    let mut cursor = AssignmentCursor::new(store, k);
    stats.schedule_len = u64::try_from(cursor.subset_total()).unwrap_or(u64::MAX);
    if cursor.is_exhausted() {
        debug!(
            "validation size {k} exceeds {} groups; nothing to search",
            store.group_count()
        );
        return Ok(SearchResult {
            outcome: SearchOutcome::Exhausted {
                last_attempts: last.snapshot(store),
            },
            stats,
        });
    }
    debug!(
        "search start: {} groups, k = {k}, nonces 0..={}, {} subsets",
        store.group_count(),
        config.cost_of_mistake,
        cursor.subset_total()
    );

    let mut matcher = DigestMatcher::new(*target);
    stats.subsets_dispatched = 1;
    stats.permutations_visited = 1;

    loop {
        stats.combinations_visited += 1;
        last.record(cursor.sweep().positions());
        let prefix = matcher.prepare(cursor.keys(), cursor.values());

        for nonce in 0..=config.cost_of_mistake {
            if matcher.evaluations() % config.check_interval == 0 && deadline.expired() {
                stats.digests_evaluated = matcher.evaluations();
                return Ok(timed_out(store, &cursor, &last, stats));
            }
            if matcher.matches(&prefix, nonce) {
                stats.digests_evaluated = matcher.evaluations();
                debug!(
                    "match at subset {}, nonce {nonce}, after {} digest evaluations",
                    stats.subsets_dispatched, stats.digests_evaluated
                );
                return Ok(SearchResult {
                    outcome: matched_outcome(store, cursor.sweep(), nonce, rng),
                    stats,
                });
            }
        }

        match cursor.advance() {
            CursorStep::Combination => {}
            CursorStep::Permutation => stats.permutations_visited += 1,
            CursorStep::Subset => {
                stats.subsets_dispatched += 1;
                stats.permutations_visited += 1;
                if stats.subsets_dispatched % config.check_interval == 0 && deadline.expired() {
                    last.record(cursor.sweep().positions());
                    stats.digests_evaluated = matcher.evaluations();
                    return Ok(timed_out(store, &cursor, &last, stats));
                }
                if let Some(subset) = cursor.subset() {
                    trace!(
                        "subset {} (score {}): groups {:?}",
                        subset.position + 1,
                        subset.score,
                        subset.groups
                    );
                }
            }
            CursorStep::Exhausted => break,
        }
    }

    stats.digests_evaluated = matcher.evaluations();
    debug!(
        "search exhausted after {} digest evaluations",
        stats.digests_evaluated
    );
    Ok(SearchResult {
        outcome: SearchOutcome::Exhausted {
            last_attempts: last.snapshot(store),
        },
        stats,
    })
}

fn timed_out(
    store: &CandidateStore,
    cursor: &AssignmentCursor<'_>,
    last: &LastAttempts,
    stats: SearchStatsV1,
) -> SearchResult {
    warn!(
        "search timed out after {} digest evaluations at subset {} of {}",
        stats.digests_evaluated,
        stats.subsets_dispatched,
        cursor.subset_total()
    );
    SearchResult {
        outcome: SearchOutcome::TimedOut {
            last_attempts: last.snapshot(store),
        },
        stats,
    }
}

/// Validate raw caller input and run [`search`].
///
/// `groups` is an ordered list of groups, each an ordered list of
/// `(label, candidates)`; `target_hex` is the 64-character hex digest.
///
/// # Errors
///
/// Returns [`SearchError::InvalidInput`] for a malformed digest, a task with
/// no candidates, an empty group, or an invalid configuration.
pub fn find_validation_set<R: Rng + ?Sized>(
    groups: Vec<Vec<(String, Vec<String>)>>,
    target_hex: &str,
    config: &SearchConfigV1,
    rng: &mut R,
) -> Result<SearchResult, SearchError> {
    let target = TargetDigest::parse_hex(target_hex)?;
    let store = CandidateStore::from_groups(groups)?;
    search(&store, &target, config, rng)
}

/// Build a `Matched` outcome from the sweep's current position.
pub(crate) fn matched_outcome<R: Rng + ?Sized>(
    store: &CandidateStore,
    sweep: &SubsetSweep,
    nonce: u64,
    rng: &mut R,
) -> SearchOutcome {
    let assignment = sweep
        .keys(store)
        .zip(sweep.values(store))
        .map(|(label, value)| AssignedValue {
            label: label.to_string(),
            value: value.to_string(),
        })
        .collect();
    SearchOutcome::Matched {
        groups: sweep.ordered_groups().collect(),
        assignment,
        nonce,
        outside: representatives(store, sweep.subset(), rng),
    }
}
