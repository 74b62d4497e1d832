//! Cycle statistics over snapshots of period records.
//!
//! # Responsibility
//! - Derive cycle lengths, averages and date predictions.
//! - Stay free of storage access; callers pass record slices in.
//!
//! # Invariants
//! - Inputs for averages and history must be ascending by start date.
//! - Halving the average uses floor division so results are deterministic for
//!   negative averages too.

pub mod cycle;
