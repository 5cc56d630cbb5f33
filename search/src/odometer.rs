//! Mixed-radix counter over per-task candidate choices.
//!
//! Digit `i` ranges over `0..bases[i]`. [`Odometer::advance`] increments the
//! last digit and ripple-carries toward the first, so every one of
//! `∏ bases[i]` digit vectors is visited exactly once, in lexicographic order.

/// A resettable mixed-radix counter. Buffers are reused across resets.
#[derive(Debug, Clone, Default)]
pub struct Odometer {
    digits: Vec<usize>,
    bases: Vec<usize>,
}

impl Odometer {
    /// Counter positioned at the all-zero vector.
    ///
    /// A zero base would make the space empty; callers guarantee every base
    /// is at least 1 (the candidate store rejects empty candidate lists).
    #[must_use]
    pub fn new(bases: &[usize]) -> Self {
        let mut odometer = Self::default();
        odometer.reset(bases.iter().copied());
        odometer
    }

    /// Reposition at zero with new bases.
    pub fn reset(&mut self, bases: impl IntoIterator<Item = usize>) {
        self.bases.clear();
        self.bases.extend(bases);
        self.digits.clear();
        self.digits.resize(self.bases.len(), 0);
    }

    #[must_use]
    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    /// Step to the next digit vector.
    ///
    /// Returns `false` when the counter wraps back to all zeros, i.e. the
    /// space is exhausted. The digits are left at zero in that case.
    pub fn advance(&mut self) -> bool {
        for i in (0..self.digits.len()).rev() {
            self.digits[i] += 1;
            if self.digits[i] < self.bases[i] {
                return true;
            }
            self.digits[i] = 0;
        }
        false
    }
}
