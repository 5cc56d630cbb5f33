//! In-place lexicographic permutation stepping.

/// Rearrange `order` into its lexicographic successor.
///
/// Returns `false` (and leaves `order` sorted ascending again) when `order`
/// was the last permutation. Starting from ascending order, repeated calls
/// visit all `k!` orderings exactly once.
pub fn next_permutation(order: &mut [usize]) -> bool {
    let n = order.len();
    if n < 2 {
        return false;
    }
    // Longest non-increasing suffix starts at `pivot + 1`.
    let Some(pivot) = (0..n - 1).rev().find(|&i| order[i] < order[i + 1]) else {
        order.reverse();
        return false;
    };
    let Some(successor) = (pivot + 1..n).rev().find(|&j| order[j] > order[pivot]) else {
        return false;
    };
    order.swap(pivot, successor);
    order[pivot + 1..].reverse();
    true
}

/// `k!` saturating at `u128::MAX`.
#[must_use]
pub fn factorial(k: usize) -> u128 {
    (2..=k).fold(1u128, |acc, i| acc.saturating_mul(i as u128))
}
