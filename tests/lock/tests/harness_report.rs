//! Harness lock tests: generate a quiz, run it, persist the report
//! directory, and verify it offline.

use ddap_harness::config::RunConfig;
use ddap_harness::fixture::QuizFixtureV1;
use ddap_harness::report_dir::{
    read_report_dir, verify_report_dir, write_report_dir, ReportDirError, FIXTURE_FILENAME,
};
use ddap_harness::runner::run;
use ddap_kernel::digest::verify_assignment;
use lock_tests::quiz_worlds::quiz_fixture;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn config(validation_size: usize, cost_of_mistake: u64) -> RunConfig {
    RunConfig {
        validation_size,
        cost_of_mistake,
        timeout: None,
        rng_seed: Some(42),
        ..RunConfig::default()
    }
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: HARNESS-GENERATED-QUIZ-ROUNDTRIP
// ---------------------------------------------------------------------------

#[test]
fn generated_quiz_is_recovered_by_the_runner() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let (fixture, commitment) = quiz_fixture(2, 2, &mut rng);

        let report = run(&fixture, &config(2, 2)).unwrap();
        let pairs = report
            .result
            .outcome
            .matched_pairs()
            .unwrap_or_else(|| panic!("seed {seed}: {:?}", report.result.outcome));

        let expected: Vec<(&str, &str)> = commitment
            .pairs
            .iter()
            .map(|(l, v)| (l.as_str(), v.as_str()))
            .collect();
        assert_eq!(pairs, expected, "seed {seed}");
        assert!(verify_assignment(&pairs, commitment.nonce, &fixture.target));
    }
}

#[test]
fn fixture_survives_json_round_trip_before_running() {
    let (fixture, _) = quiz_fixture(1, 0, &mut StdRng::seed_from_u64(4));
    let bytes = fixture.to_canonical_json_bytes().unwrap();
    let reloaded = QuizFixtureV1::from_json_bytes(&bytes).unwrap();

    let a = run(&fixture, &config(1, 0)).unwrap();
    let b = run(&reloaded, &config(1, 0)).unwrap();
    assert_eq!(
        a.to_canonical_json_bytes().unwrap(),
        b.to_canonical_json_bytes().unwrap()
    );
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: HARNESS-REPORT-DIR
// ---------------------------------------------------------------------------

#[test]
fn report_directory_writes_reads_and_verifies() {
    let (fixture, _) = quiz_fixture(2, 1, &mut StdRng::seed_from_u64(17));
    let report = run(&fixture, &config(2, 1)).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let written = write_report_dir(&fixture, &report, dir.path()).unwrap();
    let loaded = read_report_dir(dir.path()).unwrap();
    assert_eq!(loaded, written);
    assert_eq!(loaded.run_report, report.to_canonical_json_bytes().unwrap());
    verify_report_dir(dir.path()).unwrap();

    let persisted: serde_json::Value = serde_json::from_slice(&loaded.run_report).unwrap();
    assert_eq!(persisted["result"]["outcome"]["type"], "matched");
    assert_eq!(persisted["target_digest"], fixture.target.to_hex());
    assert!(persisted.get("elapsed").is_none());
}

#[test]
fn report_directory_rejects_a_swapped_fixture() {
    let (fixture, _) = quiz_fixture(1, 0, &mut StdRng::seed_from_u64(18));
    let report = run(&fixture, &config(1, 0)).unwrap();
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&fixture, &report, dir.path()).unwrap();

    let (other, _) = quiz_fixture(1, 0, &mut StdRng::seed_from_u64(19));
    std::fs::write(
        dir.path().join(FIXTURE_FILENAME),
        other.to_canonical_json_bytes().unwrap(),
    )
    .unwrap();
    let err = verify_report_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ReportDirError::HashMismatch { .. }), "{err:?}");
}

#[test]
fn timed_out_report_still_persists_and_verifies() {
    let (fixture, _) = quiz_fixture(3, 0, &mut StdRng::seed_from_u64(20));
    let cfg = RunConfig {
        timeout: Some(std::time::Duration::ZERO),
        ..config(3, 0)
    };
    let report = run(&fixture, &cfg).unwrap();
    assert_eq!(report.result.outcome.kind(), "timed_out");

    let dir = tempfile::tempdir().unwrap();
    write_report_dir(&fixture, &report, dir.path()).unwrap();
    verify_report_dir(dir.path()).unwrap();
}
