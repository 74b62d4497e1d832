//! Domain model for recorded periods.
//!
//! # Responsibility
//! - Define the record shape shared by the store and the statistics engine.
//! - Parse user-entered calendar dates.
//!
//! # Invariants
//! - Every stored record is identified by a unique, increasing `PeriodId`.
//! - Records are never mutated after insertion.

pub mod date_input;
pub mod period;
