//! Average cycle length, next-period and fertile-window arithmetic.

use crate::model::date_input::format_date;
use crate::model::period::{days_between, shift_days, PeriodRecord};
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Average used when fewer than two records exist or the store is unreadable.
pub const FALLBACK_CYCLE_LENGTH: i64 = 28;

/// Days before the half-cycle mark at which the fertile window opens.
const FERTILE_LEAD_DAYS: i64 = 5;

/// How a computed average of exactly zero is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroAveragePolicy {
    /// Use `0` as computed.
    #[default]
    Keep,
    /// Replace `0` with `FALLBACK_CYCLE_LENGTH`.
    Fallback,
}

/// Estimated fertile days, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FertileWindow {
    /// Window anchored at `anchor`: `[anchor + avg/2 - 5, anchor + avg/2]`.
    fn anchored_at(anchor: NaiveDate, average_cycle_length: i64) -> Option<Self> {
        let half = average_cycle_length.div_euclid(2);
        Some(Self {
            start: shift_days(anchor, half - FERTILE_LEAD_DAYS)?,
            end: shift_days(anchor, half)?,
        })
    }
}

impl Display for FertileWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", format_date(self.start), format_date(self.end))
    }
}

/// One rendered line of period history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRow {
    pub record: PeriodRecord,
    pub cycle_length: i64,
    /// Window anchored at this record's own start date.
    pub fertile_window: Option<FertileWindow>,
}

impl Display for HistoryRow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Start Date: {}, End Date: {}, Cycle Length: {} days, Estimated Fertile Window: ",
            format_date(self.record.start_date),
            format_date(self.record.end_date),
            self.cycle_length
        )?;
        match &self.fertile_window {
            Some(window) => write!(f, "{window}"),
            None => write!(f, "unavailable"),
        }
    }
}

/// Whole days from a record's start to its end.
pub fn cycle_length(record: &PeriodRecord) -> i64 {
    record.period().cycle_length()
}

/// Mean gap between one period's end and the next period's start.
///
/// `records` must be ascending by start date. Returns
/// `FALLBACK_CYCLE_LENGTH` for fewer than two records; the division truncates.
pub fn average_cycle_length(records: &[PeriodRecord], policy: ZeroAveragePolicy) -> i64 {
    if records.len() < 2 {
        return FALLBACK_CYCLE_LENGTH;
    }

    let (total_days, total_periods) =
        records
            .windows(2)
            .fold((0_i64, 0_i64), |(days, periods), pair| {
                let gap = days_between(pair[0].end_date, pair[1].start_date);
                debug!(
                    "event=cycle_gap module=stats from={} to={} days={gap}",
                    pair[0].end_date, pair[1].start_date
                );
                (days + gap, periods + 1)
            });

    let average = total_days / total_periods.max(1);
    debug!(
        "event=cycle_average module=stats total_days={total_days} total_periods={total_periods} average={average}"
    );

    match policy {
        ZeroAveragePolicy::Fallback if average == 0 => FALLBACK_CYCLE_LENGTH,
        _ => average,
    }
}

/// Predicted next start: the last period's end plus the average.
pub fn next_period_date(last: &PeriodRecord, average_cycle_length: i64) -> Option<NaiveDate> {
    shift_days(last.end_date, average_cycle_length)
}

/// Fertile window counted from a predicted next start date.
pub fn fertile_window_from_prediction(
    predicted_start: NaiveDate,
    average_cycle_length: i64,
) -> Option<FertileWindow> {
    FertileWindow::anchored_at(predicted_start, average_cycle_length)
}

/// History lines, each with a fertile window counted from the record's own
/// start date (unlike `fertile_window_from_prediction`).
pub fn history_rows(records: &[PeriodRecord], average_cycle_length: i64) -> Vec<HistoryRow> {
    records
        .iter()
        .map(|record| HistoryRow {
            record: *record,
            cycle_length: cycle_length(record),
            fertile_window: FertileWindow::anchored_at(record.start_date, average_cycle_length),
        })
        .collect()
}
