//! DDAP Search: schedule, enumerate and hash candidate assignments until one
//! reproduces a target digest.
//!
//! This crate depends only on `ddap_kernel`; it does NOT depend on
//! `ddap_harness`.
//!
//! # Crate dependency graph
//!
//! ```text
//! ddap_kernel  ←  ddap_search  ←  ddap_harness
//! (store, hash)   (frontier, sweep)  (fixtures, runner, report dir)
//! ```
//!
//! # Key types
//!
//! - [`SubsetFrontier`] -- size-k group subsets, cheapest first, on demand
//! - [`SubsetSweep`] / [`AssignmentCursor`] -- orderings × candidate combinations
//! - [`SearchConfigV1`] -- validation size, nonce range, timeout
//! - [`SearchOutcome`] -- `Matched`, `Exhausted` or `TimedOut`
//! - [`ComplexityEstimateV1`] -- predicted work, without searching

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod estimate;
pub mod fallback;
pub mod matcher;
pub mod odometer;
pub mod outcome;
pub mod parallel;
pub mod permutation;
pub mod policy;
pub mod search;
pub mod subset;
pub mod sweep;

pub use error::SearchError;
pub use estimate::{count_complexity, estimate, ComplexityEstimateV1};
pub use outcome::{
    AssignedValue, LastAttempt, RepresentativeValue, SearchOutcome, SearchResult, SearchStatsV1,
};
pub use parallel::search_parallel;
pub use policy::SearchConfigV1;
pub use search::{find_validation_set, search};
pub use subset::SubsetFrontier;
pub use sweep::{AssignmentCursor, SubsetSweep};
