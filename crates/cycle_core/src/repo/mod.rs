//! Period store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the durable operations callers may perform on period records.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Every call goes straight to SQLite; nothing is cached between calls.
//! - Errors are classified as init, write or read failures.

pub mod period_repo;
