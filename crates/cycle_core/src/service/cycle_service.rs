//! Period tracking use-case service.
//!
//! # Invariants
//! - Each operation takes a fresh snapshot from the store.
//! - Predictions on an empty store are `None`, never a panic.

use crate::model::period::{Period, PeriodId, PeriodRecord, PeriodValidationError, RangePolicy};
use crate::repo::period_repo::{PeriodRepository, SortDirection, StoreError, StoreResult};
use crate::stats::cycle::{
    average_cycle_length, fertile_window_from_prediction, history_rows, next_period_date,
    FertileWindow, HistoryRow, ZeroAveragePolicy, FALLBACK_CYCLE_LENGTH,
};
use chrono::NaiveDate;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for adding periods.
#[derive(Debug)]
pub enum ServiceError {
    Store(StoreError),
    Validation(PeriodValidationError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<PeriodValidationError> for ServiceError {
    fn from(value: PeriodValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Policies applied by `CycleService`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CyclePolicies {
    pub range: RangePolicy,
    pub zero_average: ZeroAveragePolicy,
}

/// Period tracking operations over an injected store handle.
pub struct CycleService<R: PeriodRepository> {
    repo: R,
    policies: CyclePolicies,
}

impl<R: PeriodRepository> CycleService<R> {
    pub fn new(repo: R, policies: CyclePolicies) -> Self {
        Self { repo, policies }
    }

    /// Underlying store handle.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Records a period after applying the range policy.
    pub fn add_period(&self, start: NaiveDate, end: NaiveDate) -> Result<PeriodId, ServiceError> {
        Period::new(start, end).validate(self.policies.range)?;
        Ok(self.repo.insert(start, end)?)
    }

    /// Removes the most recently inserted record, by id.
    pub fn remove_last_period(&self) -> StoreResult<Option<PeriodRecord>> {
        self.repo.delete_most_recently_inserted()
    }

    /// Average cycle length over the whole store.
    ///
    /// A read failure is logged and yields `FALLBACK_CYCLE_LENGTH`.
    pub fn average_cycle_length(&self) -> i64 {
        match self.repo.fetch_all(SortDirection::Ascending) {
            Ok(records) => average_cycle_length(&records, self.policies.zero_average),
            Err(err) => {
                warn!("event=cycle_average module=service status=fallback error={err}");
                FALLBACK_CYCLE_LENGTH
            }
        }
    }

    /// Next start date: latest-starting record's end plus the average.
    pub fn predict_next_period_date(&self) -> StoreResult<Option<NaiveDate>> {
        let Some(last) = self.repo.fetch_most_recent_by_start_date()? else {
            return Ok(None);
        };
        Ok(next_period_date(&last, self.average_cycle_length()))
    }

    /// Fertile window counted from the predicted next start date.
    pub fn predict_fertile_window(&self) -> StoreResult<Option<FertileWindow>> {
        let Some(last) = self.repo.fetch_most_recent_by_start_date()? else {
            return Ok(None);
        };
        let average = self.average_cycle_length();
        Ok(next_period_date(&last, average)
            .and_then(|predicted| fertile_window_from_prediction(predicted, average)))
    }

    /// Full history ascending by start date, with per-record fertile windows.
    pub fn render_history(&self) -> StoreResult<Vec<HistoryRow>> {
        let records = self.repo.fetch_all(SortDirection::Ascending)?;
        let average = average_cycle_length(&records, self.policies.zero_average);
        Ok(history_rows(&records, average))
    }
}
