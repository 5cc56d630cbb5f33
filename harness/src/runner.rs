//! Harness runner: fixture in, run report out.
//!
//! # Pipeline
//!
//! ```text
//! fixture.store() → estimate() → [warn if over ceiling]
//!   → search() | search_parallel() → RunReportV1
//! ```
//!
//! The runner owns no search logic. It picks the random source, chooses the
//! sequential or sharded search by worker count, and packages the result.

use std::time::{Duration, Instant};

use ddap_kernel::canon::canonical_json_bytes;
use ddap_kernel::digest::TargetDigest;
use ddap_search::error::SearchError;
use ddap_search::estimate::{estimate, ComplexityEstimateV1};
use ddap_search::outcome::SearchResult;
use ddap_search::parallel::search_parallel;
use ddap_search::search::search;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::RunConfig;
use crate::fixture::{FixtureError, QuizFixtureV1};

/// Schema tag written into every run report.
pub const REPORT_SCHEMA_VERSION: &str = "run_report.v1";

/// Error during a harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The fixture could not be turned into a store.
    Fixture(FixtureError),
    /// The search rejected its input.
    Search(SearchError),
    /// Canonical JSON serialization failed.
    CanonFailed { detail: String },
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixture(e) => write!(f, "fixture error: {e}"),
            Self::Search(e) => write!(f, "search error: {e}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for RunError {}

impl From<FixtureError> for RunError {
    fn from(e: FixtureError) -> Self {
        Self::Fixture(e)
    }
}

impl From<SearchError> for RunError {
    fn from(e: SearchError) -> Self {
        Self::Search(e)
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReportV1 {
    pub target: TargetDigest,
    pub config: RunConfig,
    pub estimate: ComplexityEstimateV1,
    pub result: SearchResult,
    /// Wall-clock time spent in the search. Not part of the canonical bytes.
    pub elapsed: Duration,
}

impl RunReportV1 {
    /// Whether the pre-flight estimate exceeded the feasibility ceiling.
    #[must_use]
    pub fn infeasible(&self) -> bool {
        self.estimate
            .exceeds(u128::from(self.config.feasibility_ceiling))
    }

    /// Deterministic projection of the report. Estimate figures are decimal
    /// strings since they may exceed `u64`.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let est = &self.estimate;
        serde_json::json!({
            "config": self.config.to_json_value(),
            "estimate": {
                "expected_evaluations": est.expected_evaluations.to_string(),
                "full_sweep_evaluations": est.full_sweep_evaluations.to_string(),
                "infeasible": self.infeasible(),
                "nonce_range": est.nonce_range.to_string(),
                "permutations": est.permutations.to_string(),
                "subset_product_sum": est.subset_product_sum.to_string(),
            },
            "result": self.result.to_json_value(),
            "schema_version": REPORT_SCHEMA_VERSION,
            "target_digest": self.target.to_hex(),
        })
    }

    /// Serialize to canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::CanonFailed`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, RunError> {
        canonical_json_bytes(&self.to_json_value()).map_err(|e| RunError::CanonFailed {
            detail: format!("{e}"),
        })
    }
}

/// Run a fixture under `config`, seeding the Fallback Recorder from
/// `config.rng_seed` or OS entropy.
///
/// # Errors
///
/// Returns [`RunError`] if the fixture cannot form a store or the search
/// rejects the configuration.
pub fn run(fixture: &QuizFixtureV1, config: &RunConfig) -> Result<RunReportV1, RunError> {
    let mut rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    run_with_rng(fixture, config, &mut rng)
}

/// [`run`] with a caller-supplied random source.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_rng<R: Rng + ?Sized>(
    fixture: &QuizFixtureV1,
    config: &RunConfig,
    rng: &mut R,
) -> Result<RunReportV1, RunError> {
    let store = fixture.store()?;
    let search_config = config.search_config();
    search_config.validate()?;

    let est = estimate(&store, config.validation_size, config.cost_of_mistake);
    if est.exceeds(u128::from(config.feasibility_ceiling)) {
        warn!(
            "estimated {} digest evaluations exceeds the feasibility ceiling of {}",
            est.expected_evaluations, config.feasibility_ceiling
        );
    }
    debug!(
        "run: {} groups, {} tasks, k = {}, {} workers",
        store.group_count(),
        store.task_count(),
        config.validation_size,
        config.workers
    );

    let start = Instant::now();
    let result = if config.workers > 1 {
        search_parallel(&store, &fixture.target, &search_config, config.workers, rng)?
    } else {
        search(&store, &fixture.target, &search_config, rng)?
    };
    let elapsed = start.elapsed();
    info!(
        "run finished: {} after {} digest evaluations in {:?}",
        result.outcome.kind(),
        result.stats.digests_evaluated,
        elapsed
    );

    Ok(RunReportV1 {
        target: fixture.target,
        config: config.clone(),
        estimate: est,
        result,
        elapsed,
    })
}
