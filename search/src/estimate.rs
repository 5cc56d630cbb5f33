//! Complexity Estimator: predicted digest evaluations, without searching.
//!
//! ```text
//! expected = S_k × (cost_of_mistake + 1) × ceil(k! / 2)
//! S_k      = Σ over size-k subsets of ∏ over their tasks of candidate_count_or_4
//! ```
//!
//! `S_k` is the `x^k` coefficient of `∏_g (1 + w_g·x)` where `w_g` is the
//! product of task weights in group `g`. One convolution pass over the
//! groups, truncated at degree `k`; the subsets are never materialized.
//!
//! The halving assumes a match sits uniformly at random inside the sweep that
//! contains it. It is an expectation, not a bound: only the wall-clock
//! timeout bounds a real search.

use ddap_kernel::store::CandidateStore;

use crate::permutation::factorial;
use crate::subset::group_weight;

/// Breakdown of an estimate. All arithmetic saturates at `u128::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComplexityEstimateV1 {
    /// `S_k`: sum over subsets of their candidate-combination counts.
    pub subset_product_sum: u128,
    /// `k!` group orderings per subset.
    pub permutations: u128,
    /// `cost_of_mistake + 1`.
    pub nonce_range: u128,
    /// Expected evaluations before a match.
    pub expected_evaluations: u128,
    /// Evaluations for a sweep that finds nothing.
    pub full_sweep_evaluations: u128,
}

impl ComplexityEstimateV1 {
    /// Whether the expected work exceeds `ceiling` evaluations.
    #[must_use]
    pub fn exceeds(&self, ceiling: u128) -> bool {
        self.expected_evaluations > ceiling
    }
}

/// `x^k` coefficient of `∏ (1 + w·x)` over `weights`.
#[must_use]
pub fn subset_product_sum(weights: &[u128], k: usize) -> u128 {
    if k > weights.len() {
        return 0;
    }
    let mut coeffs = vec![0u128; k + 1];
    coeffs[0] = 1;
    for (seen, &w) in weights.iter().enumerate() {
        // Descending so each group is used at most once.
        for j in (1..=k.min(seen + 1)).rev() {
            coeffs[j] = coeffs[j].saturating_add(coeffs[j - 1].saturating_mul(w));
        }
    }
    coeffs[k]
}

/// Estimate from candidate-count shape (one inner vec per group).
#[must_use]
pub fn estimate_shape(shape: &[Vec<usize>], k: usize, cost_of_mistake: u64) -> ComplexityEstimateV1 {
    let weights: Vec<u128> = shape.iter().map(|bases| group_weight(bases)).collect();
    let subset_product_sum = subset_product_sum(&weights, k);
    let permutations = factorial(k);
    let nonce_range = u128::from(cost_of_mistake) + 1;
    let per_nonce = subset_product_sum.saturating_mul(nonce_range);
    ComplexityEstimateV1 {
        subset_product_sum,
        permutations,
        nonce_range,
        expected_evaluations: per_nonce.saturating_mul(permutations.div_ceil(2)),
        full_sweep_evaluations: per_nonce.saturating_mul(permutations),
    }
}

/// Estimate for a store.
#[must_use]
pub fn estimate(store: &CandidateStore, k: usize, cost_of_mistake: u64) -> ComplexityEstimateV1 {
    estimate_shape(&store.shape(), k, cost_of_mistake)
}

/// Expected number of digest evaluations for a full search configuration.
#[must_use]
pub fn count_complexity(store: &CandidateStore, k: usize, cost_of_mistake: u64) -> u128 {
    estimate(store, k, cost_of_mistake).expected_evaluations
}
