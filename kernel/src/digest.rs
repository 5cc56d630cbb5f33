//! Canonical digest of a candidate assignment.
//!
//! Wire format (bit-exact):
//!
//! ```text
//! SHA256( join(labels, "") || join(values, "") || decimal(nonce) )
//! ```
//!
//! Labels and values are concatenated with no separator, in hash order.
//! The nonce is its ordinary base-10 form (`"0"` for zero). No domain prefix.
//!
//! **Exactly one place defines this format.** Search, commitment and
//! verification all route through [`DigestPrefix`].

use std::fmt::Write as _;

use sha2::{Digest, Sha256};

/// Digest length in bytes (SHA-256).
pub const DIGEST_LEN: usize = 32;

/// Length of a hex-encoded target digest.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Typed failure parsing a hex-encoded target digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    /// Input is not 64 characters long.
    WrongLength { len: usize },
    /// Input contains a non-hex character.
    NotHex { detail: String },
}

impl std::fmt::Display for DigestParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongLength { len } => {
                write!(f, "target digest must be {DIGEST_HEX_LEN} hex characters, got {len}")
            }
            Self::NotHex { detail } => write!(f, "target digest is not hex: {detail}"),
        }
    }
}

impl std::error::Error for DigestParseError {}

/// The digest a search is looking for. Opaque beyond full-length equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetDigest([u8; DIGEST_LEN]);

impl TargetDigest {
    /// Parse a 64-character hex string. Upper-case hex is accepted and
    /// normalized; [`TargetDigest::to_hex`] always yields lower-case.
    ///
    /// # Errors
    ///
    /// Returns [`DigestParseError`] on wrong length or non-hex input.
    pub fn parse_hex(s: &str) -> Result<Self, DigestParseError> {
        if s.len() != DIGEST_HEX_LEN {
            return Err(DigestParseError::WrongLength { len: s.len() });
        }
        let mut bytes = [0u8; DIGEST_LEN];
        hex::decode_to_slice(s, &mut bytes).map_err(|e| DigestParseError::NotHex {
            detail: e.to_string(),
        })?;
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Full 256-bit equality.
    #[must_use]
    pub fn matches(&self, digest: &[u8; DIGEST_LEN]) -> bool {
        self.0 == *digest
    }
}

impl std::str::FromStr for TargetDigest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl std::fmt::Display for TargetDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Hash state with labels and values already absorbed.
///
/// The nonce is the only suffix that varies in the innermost loop, so the
/// shared prefix is absorbed once and cloned per nonce.
#[derive(Clone)]
pub struct DigestPrefix {
    state: Sha256,
}

impl DigestPrefix {
    /// Absorb `labels` then `values`, each concatenated with no separator.
    pub fn new<'a, K, V>(labels: K, values: V) -> Self
    where
        K: IntoIterator<Item = &'a str>,
        V: IntoIterator<Item = &'a str>,
    {
        let mut state = Sha256::new();
        for label in labels {
            state.update(label.as_bytes());
        }
        for value in values {
            state.update(value.as_bytes());
        }
        Self { state }
    }

    /// Finish with `nonce`. `scratch` is reused for the decimal rendering so
    /// the hot loop does not allocate.
    #[must_use]
    pub fn finish(&self, nonce: u64, scratch: &mut String) -> [u8; DIGEST_LEN] {
        scratch.clear();
        // Writing to a String cannot fail.
        let _ = write!(scratch, "{nonce}");
        let mut state = self.state.clone();
        state.update(scratch.as_bytes());
        state.finalize().into()
    }
}

/// One-shot canonical digest of `(label, value)` pairs in hash order.
#[must_use]
pub fn canonical_digest<L, V>(pairs: &[(L, V)], nonce: u64) -> [u8; DIGEST_LEN]
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    let prefix = DigestPrefix::new(
        pairs.iter().map(|(l, _)| l.as_ref()),
        pairs.iter().map(|(_, v)| v.as_ref()),
    );
    prefix.finish(nonce, &mut String::new())
}

/// The target a task generator publishes for a chosen validation set.
#[must_use]
pub fn commit_validation_set<L, V>(pairs: &[(L, V)], nonce: u64) -> TargetDigest
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    TargetDigest(canonical_digest(pairs, nonce))
}

/// Re-hash a reported assignment and compare against `target`.
#[must_use]
pub fn verify_assignment<L, V>(pairs: &[(L, V)], nonce: u64, target: &TargetDigest) -> bool
where
    L: AsRef<str>,
    V: AsRef<str>,
{
    target.matches(&canonical_digest(pairs, nonce))
}
