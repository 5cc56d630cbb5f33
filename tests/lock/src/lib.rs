//! Shared fixtures for the lock tests.
//!
//! Everything random here takes an explicit seeded source so each test is
//! reproducible from its seed alone.

#![forbid(unsafe_code)]
