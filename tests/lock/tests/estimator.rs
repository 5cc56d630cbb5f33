//! Complexity estimator lock tests.

use ddap_kernel::store::CandidateStore;
use ddap_search::estimate::{count_complexity, estimate, estimate_shape};
use ddap_search::permutation::factorial;
use ddap_search::subset::SubsetFrontier;
use lock_tests::quiz_worlds::random_store;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ---------------------------------------------------------------------------
// ACCEPTANCE: ESTIMATOR-WORKED-EXAMPLE
// ---------------------------------------------------------------------------

#[test]
fn single_group_of_two_binary_tasks_estimates_four() {
    let store = CandidateStore::from_groups(vec![vec![
        ("FR", vec!["Paris", "Lyon"]),
        ("DE", vec!["Berlin", "Munich"]),
    ]])
    .unwrap();
    assert_eq!(count_complexity(&store, 1, 0), 4);
}

#[test]
fn nonce_range_scales_linearly() {
    let shape = vec![vec![2, 3], vec![4], vec![1, 1, 5]];
    let base = estimate_shape(&shape, 2, 0).expected_evaluations;
    for cost in 1..6u64 {
        assert_eq!(
            estimate_shape(&shape, 2, cost).expected_evaluations,
            base * u128::from(cost + 1)
        );
    }
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: ESTIMATOR-AGREES-WITH-SCHEDULE
// ---------------------------------------------------------------------------

#[test]
fn subset_product_sum_equals_schedule_score_sum() {
    for seed in 0..25 {
        let mut rng = StdRng::seed_from_u64(seed);
        let store = random_store(rng.gen_range(1..=8), 3, 5, &mut rng);
        let k = rng.gen_range(1..=store.group_count());
        let summed: u128 = SubsetFrontier::new(&store, k).map(|s| s.score).sum();

        let est = estimate(&store, k, 0);
        assert_eq!(est.subset_product_sum, summed, "seed {seed}");
        assert_eq!(est.permutations, factorial(k), "seed {seed}");
        assert!(est.expected_evaluations <= est.full_sweep_evaluations);
        assert_eq!(
            est.expected_evaluations,
            summed * factorial(k).div_ceil(2),
            "seed {seed}"
        );
    }
}

#[test]
fn estimate_is_computed_without_enumerating() {
    // C(60, 30) subsets; the estimate never enumerates them.
    let shape = vec![vec![4, 4]; 60];
    let est = estimate_shape(&shape, 30, 10);
    assert!(est.exceeds(1_000_000_000));
    assert_eq!(est.expected_evaluations, u128::MAX);
}
