//! Quiz fixtures: the task table plus the published target digest.
//!
//! # JSON format (`QuizFixtureV1`)
//!
//! ```text
//! {
//!   "schema_version": "quiz_fixture.v1",
//!   "target_digest": "<64 lowercase hex>",
//!   "tasks": [
//!     {"group": "1", "label": "FR", "candidates": "Paris|Lyon", "selected": ""},
//!     ...
//!   ]
//! }
//! ```
//!
//! `group` may be a string or a non-negative integer. `candidates` and
//! `selected` may be pipe-delimited strings or arrays of strings; `selected`
//! is optional. Serialization always writes arrays.

use ddap_kernel::canon::canonical_json_bytes;
use ddap_kernel::digest::{commit_validation_set, DigestParseError, TargetDigest};
use ddap_kernel::store::{split_candidates, CandidateStore, StoreError, TaskRow};
use rand::seq::SliceRandom;
use rand::Rng;

/// Schema tag written into every fixture.
pub const FIXTURE_SCHEMA_VERSION: &str = "quiz_fixture.v1";

/// Error loading or building a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// Input is not valid JSON.
    Parse { detail: String },
    /// `schema_version` is present but not recognized.
    VersionMismatch { found: String },
    /// A required field is absent.
    MissingField { field: String },
    /// A field has the wrong shape.
    InvalidField { field: String, detail: String },
    /// `target_digest` is malformed.
    Target(DigestParseError),
    /// The task table cannot form a store.
    Store(StoreError),
    /// More validation groups requested than the table has.
    NotEnoughGroups { requested: usize, available: usize },
    /// The answer key has no value for a task in a chosen group.
    MissingAnswer { label: String },
    /// Canonical JSON serialization failed.
    CanonFailed { detail: String },
}

impl std::fmt::Display for FixtureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse { detail } => write!(f, "fixture parse error: {detail}"),
            Self::VersionMismatch { found } => {
                write!(f, "fixture schema version mismatch: {found}")
            }
            Self::MissingField { field } => write!(f, "fixture missing field: {field}"),
            Self::InvalidField { field, detail } => {
                write!(f, "fixture field {field}: {detail}")
            }
            Self::Target(e) => write!(f, "fixture target digest: {e}"),
            Self::Store(e) => write!(f, "fixture tasks: {e}"),
            Self::NotEnoughGroups {
                requested,
                available,
            } => write!(
                f,
                "cannot choose {requested} validation groups from {available}"
            ),
            Self::MissingAnswer { label } => write!(f, "answer key has no value for {label}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
        }
    }
}

impl std::error::Error for FixtureError {}

impl From<StoreError> for FixtureError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<DigestParseError> for FixtureError {
    fn from(e: DigestParseError) -> Self {
        Self::Target(e)
    }
}

/// A published quiz: task rows in table order plus the target digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizFixtureV1 {
    pub rows: Vec<TaskRow>,
    pub target: TargetDigest,
}

/// The secret side of a generated fixture: what was hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentV1 {
    /// Group ids in the order they were hashed.
    pub groups: Vec<String>,
    /// `(label, value)` pairs in hash order.
    pub pairs: Vec<(String, String)>,
    pub nonce: u64,
}

impl QuizFixtureV1 {
    /// Parse from JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError`] on malformed JSON, a missing or mistyped
    /// field, or a malformed target digest.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, FixtureError> {
        let value: serde_json::Value =
            serde_json::from_slice(bytes).map_err(|e| FixtureError::Parse {
                detail: format!("{e}"),
            })?;
        Self::from_json_value(&value)
    }

    /// Parse from a JSON value.
    ///
    /// # Errors
    ///
    /// See [`QuizFixtureV1::from_json_bytes`].
    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, FixtureError> {
        if let Some(found) = value.get("schema_version") {
            if found.as_str() != Some(FIXTURE_SCHEMA_VERSION) {
                return Err(FixtureError::VersionMismatch {
                    found: found.to_string(),
                });
            }
        }

        let target_hex = value["target_digest"]
            .as_str()
            .ok_or_else(|| FixtureError::MissingField {
                field: "target_digest".into(),
            })?;
        let target = TargetDigest::parse_hex(target_hex)?;

        let tasks = value["tasks"]
            .as_array()
            .ok_or_else(|| FixtureError::MissingField {
                field: "tasks".into(),
            })?;
        let rows = tasks
            .iter()
            .enumerate()
            .map(|(i, entry)| parse_row(i, entry))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rows, target })
    }

    #[must_use]
    pub fn to_json_value(&self) -> serde_json::Value {
        let tasks: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "candidates": row.offered,
                    "group": row.group,
                    "label": row.label,
                    "selected": row.selected,
                })
            })
            .collect();
        serde_json::json!({
            "schema_version": FIXTURE_SCHEMA_VERSION,
            "target_digest": self.target.to_hex(),
            "tasks": tasks,
        })
    }

    /// Serialize to canonical JSON bytes.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::CanonFailed`] if serialization fails.
    pub fn to_canonical_json_bytes(&self) -> Result<Vec<u8>, FixtureError> {
        canonical_json_bytes(&self.to_json_value()).map_err(|e| FixtureError::CanonFailed {
            detail: format!("{e}"),
        })
    }

    /// Group the rows into a [`CandidateStore`], applying selection
    /// normalization.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Store`] if a row has no effective candidates.
    pub fn store(&self) -> Result<CandidateStore, FixtureError> {
        Ok(CandidateStore::from_rows(&self.rows)?)
    }

    /// Generate a fixture the way a task generator publishes one: choose
    /// `validation_size` groups uniformly at random, hash the answer-key value
    /// of every task in them (in row order within each group) together with a
    /// nonce drawn from `0..=cost_of_mistake`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NotEnoughGroups`] if the table has fewer groups
    /// than requested, or [`FixtureError::MissingAnswer`] if `answers` has no
    /// entry for a chosen task.
    pub fn generate<R: Rng + ?Sized>(
        rows: Vec<TaskRow>,
        answers: &[(String, String)],
        validation_size: usize,
        cost_of_mistake: u64,
        rng: &mut R,
    ) -> Result<(Self, CommitmentV1), FixtureError> {
        let mut group_ids: Vec<&str> = Vec::new();
        for row in &rows {
            if !group_ids.contains(&row.group.as_str()) {
                group_ids.push(row.group.as_str());
            }
        }
        if validation_size > group_ids.len() {
            return Err(FixtureError::NotEnoughGroups {
                requested: validation_size,
                available: group_ids.len(),
            });
        }

        let chosen: Vec<String> = group_ids
            .choose_multiple(&mut *rng, validation_size)
            .map(|id| (*id).to_string())
            .collect();

        let mut pairs = Vec::new();
        for id in &chosen {
            for row in rows.iter().filter(|row| &row.group == id) {
                let value = answers
                    .iter()
                    .find(|(label, _)| label == &row.label)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| FixtureError::MissingAnswer {
                        label: row.label.clone(),
                    })?;
                pairs.push((row.label.clone(), value));
            }
        }

        let nonce = rng.gen_range(0..=cost_of_mistake);
        let target = commit_validation_set(&pairs, nonce);
        Ok((
            Self { rows, target },
            CommitmentV1 {
                groups: chosen,
                pairs,
                nonce,
            },
        ))
    }
}

fn parse_row(index: usize, entry: &serde_json::Value) -> Result<TaskRow, FixtureError> {
    let field = |name: &str| format!("tasks[{index}].{name}");

    let group = match &entry["group"] {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) if n.is_u64() => n.to_string(),
        serde_json::Value::Null => {
            return Err(FixtureError::MissingField {
                field: field("group"),
            })
        }
        other => {
            return Err(FixtureError::InvalidField {
                field: field("group"),
                detail: format!("expected string or integer, got {other}"),
            })
        }
    };
    let label = entry["label"]
        .as_str()
        .ok_or_else(|| FixtureError::MissingField {
            field: field("label"),
        })?
        .to_string();
    let offered = match &entry["candidates"] {
        serde_json::Value::Null => {
            return Err(FixtureError::MissingField {
                field: field("candidates"),
            })
        }
        v => candidate_list(v, || field("candidates"))?,
    };
    let selected = match &entry["selected"] {
        serde_json::Value::Null => Vec::new(),
        v => candidate_list(v, || field("selected"))?,
    };

    Ok(TaskRow {
        group,
        label,
        offered,
        selected,
    })
}

fn candidate_list(
    value: &serde_json::Value,
    field: impl Fn() -> String,
) -> Result<Vec<String>, FixtureError> {
    match value {
        serde_json::Value::String(raw) => Ok(split_candidates(raw)),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| FixtureError::InvalidField {
                        field: field(),
                        detail: format!("expected string, got {item}"),
                    })
            })
            .collect(),
        other => Err(FixtureError::InvalidField {
            field: field(),
            detail: format!("expected string or array, got {other}"),
        }),
    }
}
