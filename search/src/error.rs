//! Typed search errors.
//!
//! `SearchError` represents pre-flight failures only. Runtime terminations
//! (match found, space exhausted, time budget spent) are expressed via
//! [`crate::outcome::SearchOutcome`] and always carry diagnostics.

use ddap_kernel::digest::DigestParseError;
use ddap_kernel::store::StoreError;

/// Typed failure for pre-flight search validation.
///
/// Returned before any digest is evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Malformed digest, empty candidate list, or an unusable configuration.
    InvalidInput { detail: String },
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { detail } => write!(f, "invalid search input: {detail}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<DigestParseError> for SearchError {
    fn from(e: DigestParseError) -> Self {
        Self::InvalidInput {
            detail: e.to_string(),
        }
    }
}

impl From<StoreError> for SearchError {
    fn from(e: StoreError) -> Self {
        Self::InvalidInput {
            detail: e.to_string(),
        }
    }
}
