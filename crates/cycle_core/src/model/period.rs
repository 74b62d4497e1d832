//! Period record model.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `end_date >= start_date` is only enforced under `RangePolicy::RejectInverted`.

use chrono::{Duration, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier; higher means inserted later.
pub type PeriodId = i64;

/// One persisted period as stored in the `periods` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRecord {
    pub id: PeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl PeriodRecord {
    /// Returns the date-only projection of this record.
    pub fn period(&self) -> Period {
        Period {
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

/// Start/end pair without storage identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// Whole calendar days from start to end. Negative for inverted ranges.
    pub fn cycle_length(&self) -> i64 {
        days_between(self.start_date, self.end_date)
    }

    /// Checks the range against `policy`.
    pub fn validate(&self, policy: RangePolicy) -> Result<(), PeriodValidationError> {
        if policy == RangePolicy::RejectInverted && self.end_date < self.start_date {
            return Err(PeriodValidationError::InvertedRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Whether `add` accepts an end date earlier than the start date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePolicy {
    #[default]
    Permissive,
    RejectInverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodValidationError {
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl Display for PeriodValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvertedRange { start, end } => {
                write!(f, "end date {end} is earlier than start date {start}")
            }
        }
    }
}

impl Error for PeriodValidationError {}

/// Signed whole-day difference `to - from`.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Moves `date` by `days`, returning `None` outside chrono's supported range.
pub fn shift_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

#[cfg(test)]
mod tests {
    use super::{days_between, shift_days, Period, PeriodValidationError, RangePolicy};
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn cycle_length_counts_calendar_days() {
        let period = Period::new(date("2024-01-01"), date("2024-01-05"));
        assert_eq!(period.cycle_length(), 4);
    }

    #[test]
    fn cycle_length_is_negative_for_inverted_range() {
        let period = Period::new(date("2024-01-05"), date("2024-01-01"));
        assert_eq!(period.cycle_length(), -4);
    }

    #[test]
    fn days_between_spans_leap_day() {
        assert_eq!(days_between(date("2024-02-28"), date("2024-03-01")), 2);
    }

    #[test]
    fn shift_days_handles_negative_offsets_and_overflow() {
        assert_eq!(shift_days(date("2024-03-01"), -1), Some(date("2024-02-29")));
        assert_eq!(shift_days(NaiveDate::MAX, 1), None);
    }

    #[test]
    fn permissive_policy_accepts_inverted_range() {
        let period = Period::new(date("2024-01-05"), date("2024-01-01"));
        assert!(period.validate(RangePolicy::Permissive).is_ok());
    }

    #[test]
    fn reject_policy_flags_inverted_range_only() {
        let inverted = Period::new(date("2024-01-05"), date("2024-01-01"));
        assert_eq!(
            inverted.validate(RangePolicy::RejectInverted),
            Err(PeriodValidationError::InvertedRange {
                start: date("2024-01-05"),
                end: date("2024-01-01"),
            })
        );

        let single_day = Period::new(date("2024-01-05"), date("2024-01-05"));
        assert!(single_day.validate(RangePolicy::RejectInverted).is_ok());
    }
}
