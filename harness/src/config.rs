//! Run configuration: optional overrides on top of fixed defaults.
//!
//! Loaded from a JSON object. Unknown keys are ignored; a key that is
//! present with the wrong type is an error. `"timeout_ms": null` disables the
//! timeout, while an absent `timeout_ms` keeps the default.

use std::time::Duration;

use ddap_search::policy::{SearchConfigV1, DEFAULT_CHECK_INTERVAL};

/// Default number of groups in the validation subset.
pub const DEFAULT_VALIDATION_SIZE: usize = 5;
/// Default wall-clock budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default inclusive nonce bound.
pub const DEFAULT_COST_OF_MISTAKE: u64 = 0;
/// Estimated digest evaluations above which a run is flagged infeasible.
pub const DEFAULT_FEASIBILITY_CEILING: u64 = 1_000_000_000;
/// Default worker count (sequential search).
pub const DEFAULT_WORKERS: usize = 1;

/// Error loading a [`RunConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Input is not valid JSON.
    Parse { detail: String },
    /// Top-level value is not an object.
    NotAnObject,
    /// A known key has a value of the wrong type or range.
    InvalidField { key: String, detail: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { detail } => write!(f, "config parse error: {detail}"),
            Self::NotAnObject => write!(f, "config must be a JSON object"),
            Self::InvalidField { key, detail } => write!(f, "config field {key:?}: {detail}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Everything a harness run needs beyond the fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub validation_size: usize,
    pub cost_of_mistake: u64,
    /// `None` runs to exhaustion.
    pub timeout: Option<Duration>,
    pub check_interval: u64,
    /// Pre-flight warning threshold on expected digest evaluations.
    pub feasibility_ceiling: u64,
    /// Seed for the Fallback Recorder. `None` seeds from OS entropy.
    pub rng_seed: Option<u64>,
    /// `1` runs the sequential search; more shards across threads.
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            validation_size: DEFAULT_VALIDATION_SIZE,
            cost_of_mistake: DEFAULT_COST_OF_MISTAKE,
            timeout: Some(DEFAULT_TIMEOUT),
            check_interval: DEFAULT_CHECK_INTERVAL,
            feasibility_ceiling: DEFAULT_FEASIBILITY_CEILING,
            rng_seed: None,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl RunConfig {
    /// Parse from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON or a mistyped field.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::Parse {
                detail: format!("{e}"),
            })?;
        Self::from_json_value(&value)
    }

    /// Apply the keys present in `value` over [`RunConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `value` is not an object or a known key is
    /// mistyped.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, ConfigError> {
        let obj = value.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut config = Self::default();

        if let Some(v) = obj.get("validation_size") {
            config.validation_size = as_usize("validation_size", v)?;
        }
        if let Some(v) = obj.get("cost_of_mistake") {
            config.cost_of_mistake = as_u64("cost_of_mistake", v)?;
        }
        if let Some(v) = obj.get("timeout_ms") {
            config.timeout = if v.is_null() {
                None
            } else {
                Some(Duration::from_millis(as_u64("timeout_ms", v)?))
            };
        }
        if let Some(v) = obj.get("check_interval") {
            config.check_interval = as_u64("check_interval", v)?;
        }
        if let Some(v) = obj.get("feasibility_ceiling") {
            config.feasibility_ceiling = as_u64("feasibility_ceiling", v)?;
        }
        if let Some(v) = obj.get("rng_seed") {
            config.rng_seed = if v.is_null() {
                None
            } else {
                Some(as_u64("rng_seed", v)?)
            };
        }
        if let Some(v) = obj.get("workers") {
            config.workers = as_usize("workers", v)?;
        }
        Ok(config)
    }

    /// The immutable search configuration derived from this run config.
    #[must_use]
    pub fn search_config(&self) -> SearchConfigV1 {
        SearchConfigV1 {
            validation_size: self.validation_size,
            cost_of_mistake: self.cost_of_mistake,
            timeout: self.timeout,
            check_interval: self.check_interval,
        }
    }

    /// Configuration echo for run reports. Keys mirror the input format.
    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let timeout_ms = self
            .timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
        serde_json::json!({
            "check_interval": self.check_interval,
            "cost_of_mistake": self.cost_of_mistake,
            "feasibility_ceiling": self.feasibility_ceiling,
            "rng_seed": self.rng_seed,
            "timeout_ms": timeout_ms,
            "validation_size": self.validation_size,
            "workers": self.workers,
        })
    }
}

fn as_u64(key: &str, v: &serde_json::Value) -> Result<u64, ConfigError> {
    v.as_u64().ok_or_else(|| ConfigError::InvalidField {
        key: key.to_string(),
        detail: format!("expected a non-negative integer, got {v}"),
    })
}

fn as_usize(key: &str, v: &serde_json::Value) -> Result<usize, ConfigError> {
    let n = as_u64(key, v)?;
    usize::try_from(n).map_err(|_| ConfigError::InvalidField {
        key: key.to_string(),
        detail: format!("{n} does not fit in usize"),
    })
}
