//! Core of the cycle tracker: period storage and cycle statistics.
//!
//! The CLI crate only prompts and renders; every durable operation and every
//! derived number comes from here.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod stats;

pub use config::{Config, ConfigError};
pub use logging::init_logging;
pub use model::date_input::{format_date, parse_input_date, InputFormatError, DATE_FORMAT};
pub use model::period::{Period, PeriodId, PeriodRecord, PeriodValidationError, RangePolicy};
pub use repo::period_repo::{
    initialize, PeriodRepository, SortDirection, SqlitePeriodRepository, StoreError, StoreResult,
};
pub use service::cycle_service::{CyclePolicies, CycleService, ServiceError};
pub use stats::cycle::{FertileWindow, HistoryRow, ZeroAveragePolicy, FALLBACK_CYCLE_LENGTH};
