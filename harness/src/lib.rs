//! DDAP Harness: run-level orchestration around the search.
//!
//! The harness loads a quiz fixture and a run configuration, pre-flights the
//! complexity estimate, runs the search, and packages the result as a
//! canonical run report that can be persisted and verified offline.
//!
//! The harness does NOT implement search logic; it delegates to
//! `ddap_search`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod fixture;
pub mod report_dir;
pub mod runner;
