//! Scenario lock tests: the worked capitals example, its timeout twin, and
//! the degenerate and invalid inputs that must never reach the hot loop.

use std::time::Duration;

use ddap_kernel::digest::{canonical_digest, commit_validation_set, verify_assignment};
use ddap_search::error::SearchError;
use ddap_search::outcome::{AssignedValue, SearchOutcome};
use ddap_search::policy::SearchConfigV1;
use ddap_search::search::{find_validation_set, search};
use lock_tests::quiz_worlds::capitals_store;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng() -> StdRng {
    StdRng::seed_from_u64(0xDDA9)
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: SCENARIO-CAPITALS-MATCH
// ---------------------------------------------------------------------------

#[test]
fn capitals_scenario_matches_paris_at_nonce_zero() {
    let store = capitals_store();
    let target = commit_validation_set(&[("FR", "Paris")], 0);
    let config = SearchConfigV1::new(1, 1);

    let result = search(&store, &target, &config, &mut rng()).unwrap();
    let SearchOutcome::Matched {
        assignment,
        nonce,
        outside,
        ..
    } = &result.outcome
    else {
        panic!("expected Matched, got {:?}", result.outcome);
    };
    assert_eq!(
        assignment,
        &vec![AssignedValue {
            label: "FR".into(),
            value: "Paris".into()
        }]
    );
    assert_eq!(*nonce, 0);
    assert_eq!(outside.len(), 1);
    assert_eq!(outside[0].label, "DE");
    assert!(["Berlin", "Munich"].contains(&outside[0].value.as_str()));
}

#[test]
fn hash_input_is_labels_then_values_then_decimal_nonce() {
    use sha2::{Digest, Sha256};
    let expected: [u8; 32] = Sha256::digest(b"FRDEParisMunich17").into();
    assert_eq!(
        canonical_digest(&[("FR", "Paris"), ("DE", "Munich")], 17),
        expected
    );
    assert_eq!(
        commit_validation_set(&[("FR", "Paris")], 0).to_hex(),
        hex::encode(Sha256::digest(b"FRParis0"))
    );
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: SCENARIO-CAPITALS-TIMEOUT
// ---------------------------------------------------------------------------

#[test]
fn zero_timeout_is_timed_out_never_exhausted_or_matched() {
    let store = capitals_store();
    let target = commit_validation_set(&[("FR", "Paris")], 0);
    let config = SearchConfigV1::new(1, 1).with_timeout(Duration::ZERO);

    let result = search(&store, &target, &config, &mut rng()).unwrap();
    let SearchOutcome::TimedOut { last_attempts } = &result.outcome else {
        panic!("expected TimedOut, got {:?}", result.outcome);
    };
    let labels: Vec<&str> = last_attempts.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["FR", "DE"]);
}

#[test]
fn generous_timeout_does_not_change_the_answer() {
    let store = capitals_store();
    let target = commit_validation_set(&[("DE", "Berlin"), ("FR", "Lyon")], 1);
    let config = SearchConfigV1::new(2, 1).with_timeout(Duration::from_secs(60));

    let result = search(&store, &target, &config, &mut rng()).unwrap();
    let pairs = result.outcome.matched_pairs().expect("match");
    assert_eq!(pairs, vec![("DE", "Berlin"), ("FR", "Lyon")]);
    assert!(verify_assignment(&pairs, 1, &target));
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: INFEASIBLE-IS-EXHAUSTED
// ---------------------------------------------------------------------------

#[test]
fn validation_size_beyond_groups_is_exhausted() {
    let store = capitals_store();
    let target = commit_validation_set(&[("FR", "Paris")], 0);
    let result = search(&store, &target, &SearchConfigV1::new(3, 0), &mut rng()).unwrap();
    assert_eq!(result.outcome.kind(), "exhausted");
    assert_eq!(result.stats.digests_evaluated, 0);
}

#[test]
fn nonce_outside_range_is_exhausted() {
    let store = capitals_store();
    let target = commit_validation_set(&[("FR", "Paris")], 2);
    let result = search(&store, &target, &SearchConfigV1::new(1, 1), &mut rng()).unwrap();
    let SearchOutcome::Exhausted { last_attempts } = &result.outcome else {
        panic!("expected Exhausted, got {:?}", result.outcome);
    };
    // Both single-group subsets were swept to their last candidate.
    let values: Vec<Option<&str>> = last_attempts.iter().map(|l| l.value.as_deref()).collect();
    assert_eq!(values, vec![Some("Lyon"), Some("Munich")]);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: INVALID-INPUT-FAILS-FAST
// ---------------------------------------------------------------------------

#[test]
fn malformed_digests_are_invalid_input() {
    let groups = || vec![vec![("FR".to_string(), vec!["Paris".to_string()])]];
    let config = SearchConfigV1::new(1, 0);
    let bad_inputs = [
        String::new(),
        "abc".to_string(),
        "g".repeat(64),
        "a".repeat(65),
    ];
    for bad in &bad_inputs {
        let err = find_validation_set(groups(), bad, &config, &mut rng()).unwrap_err();
        assert!(
            matches!(err, SearchError::InvalidInput { .. }),
            "{bad:?} gave {err:?}"
        );
    }
}

#[test]
fn uppercase_hex_digest_is_accepted() {
    let groups = vec![vec![("FR".to_string(), vec!["Paris".to_string()])]];
    let target = commit_validation_set(&[("FR", "Paris")], 0)
        .to_hex()
        .to_uppercase();
    let result =
        find_validation_set(groups, &target, &SearchConfigV1::new(1, 0), &mut rng()).unwrap();
    assert!(result.outcome.is_matched());
}

#[test]
fn empty_candidate_list_is_invalid_input() {
    let groups = vec![
        vec![("FR".to_string(), vec!["Paris".to_string()])],
        vec![("DE".to_string(), Vec::new())],
    ];
    let target = commit_validation_set(&[("FR", "Paris")], 0).to_hex();
    let err =
        find_validation_set(groups, &target, &SearchConfigV1::new(1, 0), &mut rng()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput { .. }));
}

#[test]
fn zero_validation_size_is_invalid_input() {
    let store = capitals_store();
    let target = commit_validation_set(&[("FR", "Paris")], 0);
    let err = search(&store, &target, &SearchConfigV1::new(0, 0), &mut rng()).unwrap_err();
    assert!(matches!(err, SearchError::InvalidInput { .. }));
}
