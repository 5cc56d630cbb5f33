//! Round-trip lock tests: commit a random pre-image, search for its digest,
//! and require a match that re-hashes to the target.
//!
//! A different but equally valid pre-image is acceptable; the assertion is
//! that the reported pairs and nonce reproduce the digest.

use ddap_kernel::digest::verify_assignment;
use ddap_search::outcome::SearchOutcome;
use ddap_search::parallel::search_parallel;
use ddap_search::policy::SearchConfigV1;
use ddap_search::search::search;
use lock_tests::quiz_worlds::{random_commitment, random_store};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SEEDS: u64 = 40;

// ---------------------------------------------------------------------------
// ACCEPTANCE: ROUNDTRIP-SEQUENTIAL
// ---------------------------------------------------------------------------

#[test]
fn committed_assignment_is_found_sequentially() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(seed);
        let store = random_store(rng.gen_range(1..=4), 2, 3, &mut rng);
        let k = rng.gen_range(1..=store.group_count());
        let cost = rng.gen_range(0..=3);
        let commitment = random_commitment(&store, k, cost, &mut rng);

        let config = SearchConfigV1::new(k, cost);
        let result = search(&store, &commitment.target, &config, &mut rng).unwrap();

        let SearchOutcome::Matched {
            groups,
            nonce,
            outside,
            ..
        } = &result.outcome
        else {
            panic!("seed {seed}: expected match, got {:?}", result.outcome);
        };
        let pairs = result.outcome.matched_pairs().unwrap();
        assert!(
            verify_assignment(&pairs, *nonce, &commitment.target),
            "seed {seed}: reported match does not re-hash"
        );
        assert_eq!(groups.len(), k, "seed {seed}");

        // Labels and values embed their task ids, so the pre-image is unique.
        let expected: Vec<(&str, &str)> = commitment
            .pairs
            .iter()
            .map(|(l, v)| (l.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, expected, "seed {seed}");
        assert_eq!(*nonce, commitment.nonce, "seed {seed}");
        assert_eq!(groups, &commitment.groups, "seed {seed}");

        let inside: usize = groups.iter().map(|&g| store.groups()[g].len()).sum();
        assert_eq!(outside.len(), store.task_count() - inside, "seed {seed}");
    }
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: ROUNDTRIP-PARALLEL
// ---------------------------------------------------------------------------

#[test]
fn committed_assignment_is_found_by_sharded_search() {
    for seed in 0..SEEDS {
        let mut rng = StdRng::seed_from_u64(1_000 + seed);
        let store = random_store(rng.gen_range(2..=4), 2, 2, &mut rng);
        let k = rng.gen_range(1..=store.group_count());
        let cost = rng.gen_range(0..=2);
        let commitment = random_commitment(&store, k, cost, &mut rng);
        let workers = rng.gen_range(1..=4);

        let config = SearchConfigV1::new(k, cost).with_check_interval(7);
        let result =
            search_parallel(&store, &commitment.target, &config, workers, &mut rng).unwrap();

        let SearchOutcome::Matched { nonce, .. } = &result.outcome else {
            panic!("seed {seed}: expected match, got {:?}", result.outcome);
        };
        let pairs = result.outcome.matched_pairs().unwrap();
        assert!(
            verify_assignment(&pairs, *nonce, &commitment.target),
            "seed {seed}: reported match does not re-hash"
        );
    }
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: ROUNDTRIP-SHARED-VALUES
// ---------------------------------------------------------------------------

#[test]
fn ambiguous_concatenations_still_rehash() {
    // "AB"+"C" and "A"+"BC" concatenate identically, so either grouping
    // may be reported. Whatever comes back must reproduce the digest.
    let store = ddap_kernel::store::CandidateStore::from_groups(vec![
        vec![("A", vec!["BC", "X"])],
        vec![("AB", vec!["C", "Y"])],
        vec![("Q", vec!["q"])],
    ])
    .unwrap();
    let target = ddap_kernel::digest::commit_validation_set(&[("AB", "C")], 0);
    let config = SearchConfigV1::new(1, 0);

    let result = search(&store, &target, &config, &mut StdRng::seed_from_u64(3)).unwrap();
    let pairs = result.outcome.matched_pairs().expect("match");
    assert!(verify_assignment(&pairs, 0, &target));
}
