//! Store-backed use cases.
//!
//! # Responsibility
//! - Combine store reads with statistics so callers never juggle snapshots.
//! - Apply configured policies (range validation, zero average).

pub mod cycle_service;
