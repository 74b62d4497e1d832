//! Text rendering of history and predictions.
//!
//! Storage failures are turned into one readable line each; rendering always
//! continues with the next section.

use cycle_core::{format_date, CycleService, PeriodRepository};
use log::warn;
use std::io::{self, Write};

pub const NEXT_PERIOD_UNAVAILABLE: &str = "Unable to predict next period date.";
pub const FERTILE_WINDOW_UNAVAILABLE: &str = "Unable to calculate the predicted fertile window.";

/// History, next start and fertile window, in that order.
pub fn write_full_report<R: PeriodRepository>(
    service: &CycleService<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    write_history(service, out)?;
    write_next_period(service, out)?;
    write_fertile_window(service, out)
}

pub fn write_history<R: PeriodRepository>(
    service: &CycleService<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "\nPeriod History: ")?;
    match service.render_history() {
        Ok(rows) if rows.is_empty() => writeln!(out, "No periods recorded yet."),
        Ok(rows) => rows.iter().try_for_each(|row| writeln!(out, "{row}")),
        Err(err) => {
            warn!("event=render_history module=cli status=error error={err}");
            writeln!(out, "Error printing period history: {err}")
        }
    }
}

pub fn write_next_period<R: PeriodRepository>(
    service: &CycleService<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    match service.predict_next_period_date() {
        Ok(Some(date)) => writeln!(
            out,
            "\nPredicted Start Date of Next Period: {}",
            format_date(date)
        ),
        Ok(None) => writeln!(out, "{NEXT_PERIOD_UNAVAILABLE}"),
        Err(err) => {
            writeln!(out, "Error getting last period: {err}")?;
            writeln!(out, "{NEXT_PERIOD_UNAVAILABLE}")
        }
    }
}

pub fn write_fertile_window<R: PeriodRepository>(
    service: &CycleService<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    match service.predict_fertile_window() {
        Ok(Some(window)) => writeln!(out, "Predicted Fertile Window: {window}"),
        Ok(None) => writeln!(out, "{FERTILE_WINDOW_UNAVAILABLE}"),
        Err(err) => {
            writeln!(out, "Error getting last period: {err}")?;
            writeln!(out, "{FERTILE_WINDOW_UNAVAILABLE}")
        }
    }
}
