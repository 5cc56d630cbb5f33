//! Search configuration.

use std::time::Duration;

use crate::error::SearchError;

/// Default number of digest evaluations between wall-clock checks.
pub const DEFAULT_CHECK_INTERVAL: u64 = 4096;

/// Immutable configuration for one search call.
///
/// There are no process-wide defaults; every search receives one of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfigV1 {
    /// Number of groups the matched subset must contain (`k`).
    pub validation_size: usize,
    /// Inclusive upper bound of the nonce range `0..=cost_of_mistake`.
    pub cost_of_mistake: u64,
    /// Wall-clock bound. `None` runs to exhaustion.
    pub timeout: Option<Duration>,
    /// Digest evaluations between timeout checks.
    pub check_interval: u64,
}

impl SearchConfigV1 {
    /// Config with no timeout and the default check interval.
    #[must_use]
    pub fn new(validation_size: usize, cost_of_mistake: u64) -> Self {
        Self {
            validation_size,
            cost_of_mistake,
            timeout: None,
            check_interval: DEFAULT_CHECK_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_check_interval(mut self, check_interval: u64) -> Self {
        self.check_interval = check_interval;
        self
    }

    /// Number of nonces tried per candidate combination.
    #[must_use]
    pub fn nonce_range(&self) -> u128 {
        u128::from(self.cost_of_mistake) + 1
    }

    /// Reject configurations that cannot drive a search.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidInput`] if `validation_size` or
    /// `check_interval` is zero.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.validation_size == 0 {
            return Err(SearchError::InvalidInput {
                detail: "validation_size must be at least 1".into(),
            });
        }
        if self.check_interval == 0 {
            return Err(SearchError::InvalidInput {
                detail: "check_interval must be at least 1".into(),
            });
        }
        Ok(())
    }
}
