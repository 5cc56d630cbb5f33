//! Report directory persistence: write/read/verify a run to/from disk.
//!
//! # Directory layout (`ReportDirectoryV1`)
//!
//! ```text
//! <dir>/
//!   report_manifest.json   canonical JSON, artifact listing with content hashes
//!   report_digest.txt      "sha256:<hex>" of the manifest bytes
//!   fixture.json           canonical QuizFixtureV1
//!   run_report.json        canonical RunReportV1
//! ```
//!
//! The directory path is never part of any hash surface.
//!
//! # Fail-closed semantics
//!
//! - Missing metadata or artifact files → error
//! - Artifact names that are not a single plain file name → error
//! - Extra undeclared files → error
//! - Content hash or manifest digest mismatch → error
//! - Report target differs from the fixture target → error
//! - A `matched` report whose assignment does not re-hash to the target → error

use std::collections::BTreeSet;
use std::path::{Component, Path};

use ddap_kernel::canon::canonical_json_bytes;
use ddap_kernel::digest::verify_assignment;
use sha2::{Digest, Sha256};

use crate::fixture::{FixtureError, QuizFixtureV1};
use crate::runner::RunReportV1;

pub const MANIFEST_FILENAME: &str = "report_manifest.json";
pub const DIGEST_FILENAME: &str = "report_digest.txt";
pub const FIXTURE_FILENAME: &str = "fixture.json";
pub const REPORT_FILENAME: &str = "run_report.json";

const MANIFEST_SCHEMA_VERSION: &str = "report_dir.v1";
const HASH_PREFIX: &str = "sha256:";

/// Error writing, reading or verifying a report directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportDirError {
    /// I/O error.
    Io { detail: String },
    /// Canonical JSON serialization failed.
    CanonFailed { detail: String },
    /// A metadata or declared artifact file is missing.
    MissingFile { name: String },
    /// An undeclared file exists in the directory.
    ExtraFile { name: String },
    /// The manifest is malformed or has an unknown schema version.
    ManifestInvalid { detail: String },
    /// An artifact's bytes do not hash to the manifest's declaration.
    HashMismatch {
        name: String,
        declared: String,
        actual: String,
    },
    /// `report_digest.txt` does not match the manifest.
    DigestMismatch { stored: String, recomputed: String },
    /// `fixture.json` does not parse.
    Fixture(FixtureError),
    /// `run_report.json` is malformed.
    ReportInvalid { detail: String },
    /// The report was produced for a different target than the fixture's.
    TargetMismatch { fixture: String, report: String },
    /// A matched assignment does not re-hash to the target.
    AssignmentMismatch,
}

impl std::fmt::Display for ReportDirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::CanonFailed { detail } => write!(f, "canonical JSON error: {detail}"),
            Self::MissingFile { name } => write!(f, "missing file: {name}"),
            Self::ExtraFile { name } => write!(f, "undeclared extra file: {name}"),
            Self::ManifestInvalid { detail } => write!(f, "manifest invalid: {detail}"),
            Self::HashMismatch {
                name,
                declared,
                actual,
            } => write!(
                f,
                "content hash mismatch for {name}: declared={declared}, actual={actual}"
            ),
            Self::DigestMismatch { stored, recomputed } => write!(
                f,
                "digest mismatch: stored={stored}, recomputed={recomputed}"
            ),
            Self::Fixture(e) => write!(f, "fixture error: {e}"),
            Self::ReportInvalid { detail } => write!(f, "run report invalid: {detail}"),
            Self::TargetMismatch { fixture, report } => write!(
                f,
                "report target {report} does not match fixture target {fixture}"
            ),
            Self::AssignmentMismatch => {
                write!(f, "matched assignment does not re-hash to the target")
            }
        }
    }
}

impl std::error::Error for ReportDirError {}

/// The files of a report directory, as bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDirV1 {
    pub fixture: Vec<u8>,
    pub run_report: Vec<u8>,
    pub manifest: Vec<u8>,
    /// `sha256:<hex>` of `manifest`.
    pub digest: String,
}

/// `sha256:<hex>` of `bytes`.
#[must_use]
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{HASH_PREFIX}{}", hex::encode(Sha256::digest(bytes)))
}

/// Write a fixture and its run report to `dir` in `ReportDirectoryV1` format.
///
/// Creates the directory if it does not exist.
///
/// # Errors
///
/// Returns [`ReportDirError`] on I/O failure or canonical JSON error.
pub fn write_report_dir(
    fixture: &QuizFixtureV1,
    report: &RunReportV1,
    dir: &Path,
) -> Result<ReportDirV1, ReportDirError> {
    let fixture_bytes = fixture
        .to_canonical_json_bytes()
        .map_err(|e| ReportDirError::CanonFailed {
            detail: format!("{e}"),
        })?;
    let report_bytes = report
        .to_canonical_json_bytes()
        .map_err(|e| ReportDirError::CanonFailed {
            detail: format!("{e}"),
        })?;
    let manifest = build_manifest(&fixture_bytes, &report_bytes)?;
    let digest = content_hash(&manifest);

    std::fs::create_dir_all(dir).map_err(|e| ReportDirError::Io {
        detail: format!("create_dir_all: {e}"),
    })?;
    write_atomic(&dir.join(FIXTURE_FILENAME), &fixture_bytes)?;
    write_atomic(&dir.join(REPORT_FILENAME), &report_bytes)?;
    write_atomic(&dir.join(MANIFEST_FILENAME), &manifest)?;
    write_atomic(&dir.join(DIGEST_FILENAME), digest.as_bytes())?;

    Ok(ReportDirV1 {
        fixture: fixture_bytes,
        run_report: report_bytes,
        manifest,
        digest,
    })
}

/// Read a report directory, checking its manifest, content hashes and digest.
///
/// # Errors
///
/// Returns [`ReportDirError`] on any integrity failure.
pub fn read_report_dir(dir: &Path) -> Result<ReportDirV1, ReportDirError> {
    let manifest = read_required(dir, MANIFEST_FILENAME)?;
    let stored_digest = read_required(dir, DIGEST_FILENAME)?;
    let stored_digest = String::from_utf8_lossy(&stored_digest).trim().to_string();

    let recomputed = content_hash(&manifest);
    if recomputed != stored_digest {
        return Err(ReportDirError::DigestMismatch {
            stored: stored_digest,
            recomputed,
        });
    }

    let manifest_value: serde_json::Value =
        serde_json::from_slice(&manifest).map_err(|e| ReportDirError::ManifestInvalid {
            detail: format!("{e}"),
        })?;
    if manifest_value["schema_version"].as_str() != Some(MANIFEST_SCHEMA_VERSION) {
        return Err(ReportDirError::ManifestInvalid {
            detail: format!("schema_version {}", manifest_value["schema_version"]),
        });
    }
    let entries = manifest_value["artifacts"]
        .as_array()
        .ok_or_else(|| ReportDirError::ManifestInvalid {
            detail: "\"artifacts\" is not an array".into(),
        })?;

    let mut declared = BTreeSet::new();
    for entry in entries {
        let name = entry["name"]
            .as_str()
            .ok_or_else(|| ReportDirError::ManifestInvalid {
                detail: "artifact entry missing \"name\"".into(),
            })?;
        let hash = entry["content_hash"]
            .as_str()
            .ok_or_else(|| ReportDirError::ManifestInvalid {
                detail: format!("missing \"content_hash\" for {name}"),
            })?;
        if !is_plain_file_name(name) {
            return Err(ReportDirError::ManifestInvalid {
                detail: format!("artifact name {name:?} is not a plain file name"),
            });
        }
        let bytes = read_required(dir, name)?;
        let actual = content_hash(&bytes);
        if actual != hash {
            return Err(ReportDirError::HashMismatch {
                name: name.to_string(),
                declared: hash.to_string(),
                actual,
            });
        }
        declared.insert(name.to_string());
    }
    for required in [FIXTURE_FILENAME, REPORT_FILENAME] {
        if !declared.contains(required) {
            return Err(ReportDirError::ManifestInvalid {
                detail: format!("{required} is not declared"),
            });
        }
    }

    for name in list_files(dir)? {
        if !declared.contains(&name) && name != MANIFEST_FILENAME && name != DIGEST_FILENAME {
            return Err(ReportDirError::ExtraFile { name });
        }
    }

    Ok(ReportDirV1 {
        fixture: read_required(dir, FIXTURE_FILENAME)?,
        run_report: read_required(dir, REPORT_FILENAME)?,
        manifest,
        digest: stored_digest,
    })
}

/// Read a report directory, then check the report against its fixture:
/// same target digest, and a `matched` assignment re-hashes to it.
///
/// This is the offline check a quiz taker runs on a published report.
///
/// # Errors
///
/// Returns [`ReportDirError`] on read failure or any semantic mismatch.
pub fn verify_report_dir(dir: &Path) -> Result<ReportDirV1, ReportDirError> {
    let loaded = read_report_dir(dir)?;
    let fixture =
        QuizFixtureV1::from_json_bytes(&loaded.fixture).map_err(ReportDirError::Fixture)?;
    let report: serde_json::Value =
        serde_json::from_slice(&loaded.run_report).map_err(|e| ReportDirError::ReportInvalid {
            detail: format!("{e}"),
        })?;

    let report_target = report["target_digest"].as_str().unwrap_or_default();
    if report_target != fixture.target.to_hex() {
        return Err(ReportDirError::TargetMismatch {
            fixture: fixture.target.to_hex(),
            report: report_target.to_string(),
        });
    }

    let outcome = &report["result"]["outcome"];
    if outcome["type"].as_str() == Some("matched") {
        let (pairs, nonce) = matched_assignment(outcome)?;
        if !verify_assignment(&pairs, nonce, &fixture.target) {
            return Err(ReportDirError::AssignmentMismatch);
        }
    }
    Ok(loaded)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_manifest(fixture: &[u8], report: &[u8]) -> Result<Vec<u8>, ReportDirError> {
    let value = serde_json::json!({
        "artifacts": [
            {"content_hash": content_hash(fixture), "name": FIXTURE_FILENAME},
            {"content_hash": content_hash(report), "name": REPORT_FILENAME},
        ],
        "schema_version": MANIFEST_SCHEMA_VERSION,
    });
    canonical_json_bytes(&value).map_err(|e| ReportDirError::CanonFailed {
        detail: format!("{e}"),
    })
}

fn matched_assignment(
    outcome: &serde_json::Value,
) -> Result<(Vec<(&str, &str)>, u64), ReportDirError> {
    let invalid = |detail: &str| ReportDirError::ReportInvalid {
        detail: detail.to_string(),
    };
    let nonce = outcome["nonce"]
        .as_u64()
        .ok_or_else(|| invalid("matched outcome has no nonce"))?;
    let pairs = outcome["assignment"]
        .as_array()
        .ok_or_else(|| invalid("matched outcome has no assignment"))?
        .iter()
        .map(|entry| match (entry["label"].as_str(), entry["value"].as_str()) {
            (Some(label), Some(value)) => Ok((label, value)),
            _ => Err(invalid("assignment entry needs label and value")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((pairs, nonce))
}

/// Write bytes via temp file + rename.
fn write_atomic(path: &Path, content: &[u8]) -> Result<(), ReportDirError> {
    let dir = path.parent().ok_or_else(|| ReportDirError::Io {
        detail: "no parent directory".into(),
    })?;
    let temp_name = format!(
        ".tmp_{}",
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    let temp_path = dir.join(temp_name);

    std::fs::write(&temp_path, content).map_err(|e| ReportDirError::Io {
        detail: format!("write {}: {e}", temp_path.display()),
    })?;
    std::fs::rename(&temp_path, path).map_err(|e| ReportDirError::Io {
        detail: format!("rename {} → {}: {e}", temp_path.display(), path.display()),
    })
}

/// A single normal path component, spelled exactly as given.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(only)), None) => only == name,
        _ => false,
    }
}

fn read_required(dir: &Path, name: &str) -> Result<Vec<u8>, ReportDirError> {
    std::fs::read(dir.join(name)).map_err(|_| ReportDirError::MissingFile {
        name: name.to_string(),
    })
}

/// Regular files in `dir`, skipping temp files left by [`write_atomic`].
fn list_files(dir: &Path) -> Result<BTreeSet<String>, ReportDirError> {
    let io = |e: std::io::Error| ReportDirError::Io {
        detail: format!("read_dir: {e}"),
    };
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir).map_err(io)? {
        let entry = entry.map_err(io)?;
        if !entry.file_type().map_err(io)?.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !name.starts_with(".tmp_") {
                files.insert(name.to_string());
            }
        }
    }
    Ok(files)
}
