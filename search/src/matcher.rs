//! Digest Matcher: canonical digest per nonce, compared against the target.

use ddap_kernel::digest::{DigestPrefix, TargetDigest};

/// Compares candidate assignments against a fixed target and counts every
/// evaluation.
#[derive(Debug, Clone)]
pub struct DigestMatcher {
    target: TargetDigest,
    scratch: String,
    evaluations: u64,
}

impl DigestMatcher {
    #[must_use]
    pub fn new(target: TargetDigest) -> Self {
        Self {
            target,
            scratch: String::with_capacity(20),
            evaluations: 0,
        }
    }

    /// Absorb one assignment's labels and values. Reused across all nonces.
    pub fn prepare<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
        values: impl IntoIterator<Item = &'a str>,
    ) -> DigestPrefix {
        DigestPrefix::new(keys, values)
    }

    /// Evaluate one nonce. Full 256-bit comparison.
    pub fn matches(&mut self, prefix: &DigestPrefix, nonce: u64) -> bool {
        self.evaluations += 1;
        let digest = prefix.finish(nonce, &mut self.scratch);
        self.target.matches(&digest)
    }

    /// Digest evaluations so far.
    #[must_use]
    pub fn evaluations(&self) -> u64 {
        self.evaluations
    }
}
