//! Sharded search lock tests: same coverage as the sequential search,
//! shared cancellation on match and on timeout.

use std::time::Duration;

use ddap_kernel::digest::{commit_validation_set, verify_assignment, TargetDigest};
use ddap_search::estimate::estimate;
use ddap_search::parallel::search_parallel;
use ddap_search::policy::SearchConfigV1;
use ddap_search::search::search;
use lock_tests::quiz_worlds::{random_commitment, random_store};
use rand::rngs::StdRng;
use rand::SeedableRng;

// ---------------------------------------------------------------------------
// ACCEPTANCE: PARALLEL-EXHAUSTIVE
// ---------------------------------------------------------------------------

#[test]
fn sharded_exhaustion_covers_the_same_space() {
    let store = random_store(5, 2, 2, &mut StdRng::seed_from_u64(8));
    let target = TargetDigest::from_bytes([0xee; 32]);
    let config = SearchConfigV1::new(3, 1).with_check_interval(16);

    let sequential = search(&store, &target, &config, &mut StdRng::seed_from_u64(0)).unwrap();
    for workers in [1, 2, 3, 8] {
        let sharded =
            search_parallel(&store, &target, &config, workers, &mut StdRng::seed_from_u64(0))
                .unwrap();
        assert_eq!(sharded.outcome.kind(), "exhausted", "{workers} workers");
        assert_eq!(sharded.stats, sequential.stats, "{workers} workers");
    }
    assert_eq!(
        u128::from(sequential.stats.digests_evaluated),
        estimate(&store, 3, 1).full_sweep_evaluations
    );
}

#[test]
fn sharded_exhaustion_records_every_task() {
    let store = random_store(4, 2, 3, &mut StdRng::seed_from_u64(9));
    let target = TargetDigest::from_bytes([1; 32]);
    let config = SearchConfigV1::new(2, 0);

    let result = search_parallel(&store, &target, &config, 3, &mut StdRng::seed_from_u64(0)).unwrap();
    let ddap_search::outcome::SearchOutcome::Exhausted { last_attempts } = &result.outcome else {
        panic!("expected Exhausted, got {:?}", result.outcome);
    };
    assert_eq!(last_attempts.len(), store.task_count());
    assert!(last_attempts.iter().all(|l| l.value.is_some()));
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: PARALLEL-FIRST-MATCH-CANCELS
// ---------------------------------------------------------------------------

#[test]
fn sharded_match_stops_before_the_full_sweep() {
    let store = random_store(5, 2, 3, &mut StdRng::seed_from_u64(10));
    let commitment = random_commitment(&store, 2, 1, &mut StdRng::seed_from_u64(11));
    let config = SearchConfigV1::new(2, 1).with_check_interval(8);

    let result = search_parallel(
        &store,
        &commitment.target,
        &config,
        4,
        &mut StdRng::seed_from_u64(0),
    )
    .unwrap();
    let pairs = result.outcome.matched_pairs().expect("match");
    assert!(verify_assignment(&pairs, commitment.nonce, &commitment.target));
    assert!(
        u128::from(result.stats.digests_evaluated) <= estimate(&store, 2, 1).full_sweep_evaluations
    );
}

#[test]
fn single_worker_agrees_with_sequential_search() {
    let store = random_store(4, 2, 3, &mut StdRng::seed_from_u64(14));
    let commitment = random_commitment(&store, 2, 2, &mut StdRng::seed_from_u64(15));
    let config = SearchConfigV1::new(2, 2);

    let sequential =
        search(&store, &commitment.target, &config, &mut StdRng::seed_from_u64(3)).unwrap();
    let sharded = search_parallel(
        &store,
        &commitment.target,
        &config,
        1,
        &mut StdRng::seed_from_u64(3),
    )
    .unwrap();
    assert_eq!(sharded, sequential);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: PARALLEL-TIMEOUT
// ---------------------------------------------------------------------------

#[test]
fn sharded_zero_timeout_is_timed_out() {
    let store = random_store(4, 2, 3, &mut StdRng::seed_from_u64(16));
    let target = commit_validation_set(&[("g0t0", "g0t0c0")], 0);
    let config = SearchConfigV1::new(2, 0).with_timeout(Duration::ZERO);

    let result = search_parallel(&store, &target, &config, 4, &mut StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(result.outcome.kind(), "timed_out");
    assert_eq!(result.stats.digests_evaluated, 0);
}
