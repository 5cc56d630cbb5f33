//! DDAP Kernel: the data model and hashing core of the validation-set finder.
//!
//! # API Surface
//!
//! - [`store::CandidateStore`] -- groups of labeled tasks with candidate lists
//! - [`digest::DigestPrefix`] -- the canonical `labels || values || nonce` digest
//! - [`digest::TargetDigest`] -- a parsed, fixed-length target
//! - [`canon::canonical_json_bytes`] -- the single canonical JSON writer
//!
//! The kernel has no search logic. `ddap_search` drives it.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canon;
pub mod digest;
pub mod store;
