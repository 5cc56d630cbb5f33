//! Sharded search across scoped worker threads.
//!
//! Workers claim subsets from one shared [`SubsetFrontier`] behind a mutex,
//! so the cheapest subsets are always dispatched first globally. Each claimed
//! subset is swept in full by one worker; no `(subset, permutation)` range is
//! shared.
//! The first match, or the first worker to see the deadline pass, raises a
//! shared stop flag that every worker polls at its check interval.
//!
//! When several workers match before the stop flag propagates, the match at
//! the earliest dispatch position is kept. Which pre-image is reported can
//! still differ from the sequential [`crate::search::search`] when more than
//! one exists.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use ddap_kernel::digest::TargetDigest;
use ddap_kernel::store::CandidateStore;
use log::{debug, warn};
use rand::Rng;

use crate::error::SearchError;
use crate::fallback::LastAttempts;
use crate::matcher::DigestMatcher;
use crate::outcome::{SearchOutcome, SearchResult, SearchStatsV1};
use crate::policy::SearchConfigV1;
use crate::search::{matched_outcome, Deadline};
use crate::subset::{ScheduledSubset, SubsetFrontier};
use crate::sweep::{SubsetSweep, SweepStep};

/// A match reported by a worker: the sweep is frozen at the matching position.
struct Found {
    position: u64,
    sweep: SubsetSweep,
    nonce: u64,
}

struct Shared {
    frontier: Mutex<SubsetFrontier>,
    stop: AtomicBool,
    timed_out: AtomicBool,
    found: Mutex<Option<Found>>,
}

/// Poisoning is ignored; a worker panic is re-raised on join.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl Shared {
    fn claim(&self) -> Option<ScheduledSubset> {
        lock(&self.frontier).next()
    }

    fn offer(&self, found: Found) {
        {
            let mut slot = lock(&self.found);
            let earlier = match slot.as_ref() {
                Some(existing) => found.position < existing.position,
                None => true,
            };
            if earlier {
                *slot = Some(found);
            }
        }
        self.stop.store(true, Ordering::Release);
    }

    fn time_out(&self) {
        self.timed_out.store(true, Ordering::Release);
        self.stop.store(true, Ordering::Release);
    }
}

struct WorkerReport {
    last: LastAttempts,
    stats: SearchStatsV1,
}

/// Run the search on `workers` threads.
///
/// Same contract as [`crate::search::search`]; `rng` is used on the calling
/// thread only, after all workers have joined.
///
/// # Errors
///
/// Returns [`SearchError::InvalidInput`] if `workers` is zero or the
/// configuration fails validation.
pub fn search_parallel<R: Rng + ?Sized>(
    store: &CandidateStore,
    target: &TargetDigest,
    config: &SearchConfigV1,
    workers: usize,
    rng: &mut R,
) -> Result<SearchResult, SearchError> {
    config.validate()?;
    if workers == 0 {
        return Err(SearchError::InvalidInput {
            detail: "worker count must be at least 1".into(),
        });
    }
    let deadline = Deadline::start(config.timeout);
    let k = config.validation_size;
    let mut stats = SearchStatsV1::default();
    let mut last = LastAttempts::new(store.task_count());

    let frontier = SubsetFrontier::new(store, k);
    let total = frontier.total();
    stats.schedule_len = u64::try_from(total).unwrap_or(u64::MAX);
    if total == 0 {
        return Ok(SearchResult {
            outcome: SearchOutcome::Exhausted {
                last_attempts: last.snapshot(store),
            },
            stats,
        });
    }

    let workers = usize::try_from(total)
        .map_or(workers, |total| workers.min(total))
        .max(1);
    debug!("parallel search start: {workers} workers, {total} subsets");

    let shared = Shared {
        frontier: Mutex::new(frontier),
        stop: AtomicBool::new(false),
        timed_out: AtomicBool::new(false),
        found: Mutex::new(None),
    };

    let reports: Vec<WorkerReport> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| run_worker(store, target, config, &shared, &deadline)))
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(report) => report,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    });

    for report in &reports {
        stats.absorb(&report.stats);
        last.merge(&report.last);
    }

    let found = shared
        .found
        .into_inner()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    let outcome = if let Some(found) = found {
        debug!(
            "parallel match at subset {}, nonce {}",
            found.position + 1,
            found.nonce
        );
        matched_outcome(store, &found.sweep, found.nonce, rng)
    } else if shared.timed_out.load(Ordering::Acquire) {
        warn!(
            "parallel search timed out after {} digest evaluations",
            stats.digests_evaluated
        );
        SearchOutcome::TimedOut {
            last_attempts: last.snapshot(store),
        }
    } else {
        SearchOutcome::Exhausted {
            last_attempts: last.snapshot(store),
        }
    };
    Ok(SearchResult { outcome, stats })
}

fn run_worker(
    store: &CandidateStore,
    target: &TargetDigest,
    config: &SearchConfigV1,
    shared: &Shared,
    deadline: &Deadline,
) -> WorkerReport {
    let mut matcher = DigestMatcher::new(*target);
    let mut sweep = SubsetSweep::new();
    let mut last = LastAttempts::new(store.task_count());
    let mut stats = SearchStatsV1::default();

    'claim: while !shared.stop.load(Ordering::Acquire) {
        let Some(subset) = shared.claim() else {
            break;
        };
        sweep.reset(store, &subset.groups);
        stats.subsets_dispatched += 1;
        stats.permutations_visited += 1;
        if stats.subsets_dispatched % config.check_interval == 0 && deadline.expired() {
            last.record(sweep.positions());
            shared.time_out();
            break;
        }

        loop {
            stats.combinations_visited += 1;
            last.record(sweep.positions());
            let prefix = matcher.prepare(sweep.keys(store), sweep.values(store));

            for nonce in 0..=config.cost_of_mistake {
                if matcher.evaluations() % config.check_interval == 0 {
                    if shared.stop.load(Ordering::Acquire) {
                        break 'claim;
                    }
                    if deadline.expired() {
                        shared.time_out();
                        break 'claim;
                    }
                }
                if matcher.matches(&prefix, nonce) {
                    shared.offer(Found {
                        position: subset.position,
                        sweep: sweep.clone(),
                        nonce,
                    });
                    break 'claim;
                }
            }

            match sweep.advance(store) {
                SweepStep::Combination => {}
                SweepStep::Permutation => stats.permutations_visited += 1,
                SweepStep::Done => break,
            }
        }
    }

    stats.digests_evaluated = matcher.evaluations();
    WorkerReport { last, stats }
}
