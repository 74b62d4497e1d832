//! Interactive dialogue: disclaimer, action menu, final report.
//!
//! # Invariants
//! - Declining the disclaimer touches no storage.
//! - Once accepted, the run always ends with the full report, whatever failed
//!   before it.

use crate::report::{
    write_full_report, write_history, write_next_period, FERTILE_WINDOW_UNAVAILABLE,
    NEXT_PERIOD_UNAVAILABLE,
};
use cycle_core::{
    initialize, parse_input_date, CyclePolicies, CycleService, PeriodRepository, ServiceError,
    SqlitePeriodRepository,
};
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

const DISCLAIMER: &str = "\
=====================================================================
                          CYCLE TRACKER

DISCLAIMER:
This software application (the 'CYCLE TRACKER') is intended as an educational tool.

The CYCLE TRACKER does not provide medical or any other health care advice, diagnosis or treatment. The CYCLE TRACKER and its health-related information and resources are not a substitute for the advice of a professional health care provider.

Always consult your professional health care provider about any health-related decision. DO NOT ignore or delay seeking professional health advice because of information you have read or received through the App.

By using the CYCLE TRACKER, you acknowledge that you understand this disclaimer and that you agree to use this App for educational purposes only.

Would you like to proceed with this educational experience? (yes/no)
======================================================================";

const DECLINED_MESSAGE: &str =
    "You did not agree to the terms of the disclaimer. Exiting the application.";
const INVALID_DATE_MESSAGE: &str = "Invalid input format. Please enter in format yyyy-mm-dd";

/// Inputs resolved from flags and configuration.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub db_path: PathBuf,
    pub remove_last: bool,
    pub policies: CyclePolicies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Declined,
    Completed,
}

/// Runs one full session. Only console I/O failures are returned as errors.
pub fn run(
    input: &mut impl BufRead,
    out: &mut impl Write,
    options: &SessionOptions,
) -> io::Result<SessionOutcome> {
    writeln!(out, "{DISCLAIMER}")?;
    out.flush()?;
    if !read_answer(input)?.eq_ignore_ascii_case("yes") {
        writeln!(out, "{DECLINED_MESSAGE}")?;
        info!("event=session_end module=cli status=declined");
        return Ok(SessionOutcome::Declined);
    }

    let conn = match initialize(&options.db_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!("event=session_store module=cli status=error error={err}");
            writeln!(out, "Error initializing period tracker: {err}")?;
            writeln!(out, "\nPeriod History: ")?;
            writeln!(out, "{NEXT_PERIOD_UNAVAILABLE}")?;
            writeln!(out, "{FERTILE_WINDOW_UNAVAILABLE}")?;
            return Ok(SessionOutcome::Completed);
        }
    };
    let service = CycleService::new(SqlitePeriodRepository::new(&conn), options.policies);

    if options.remove_last {
        remove_last(&service, out)?;
    } else {
        run_menu(&service, input, out)?;
    }

    write_full_report(&service, out)?;
    info!("event=session_end module=cli status=ok");
    Ok(SessionOutcome::Completed)
}

fn run_menu<R: PeriodRepository>(
    service: &CycleService<R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(
        out,
        "What would you like to do? (Enter R to review data or A to add new data)"
    )?;
    out.flush()?;

    match read_answer(input)?.to_ascii_uppercase().as_str() {
        "R" => {
            write_history(service, out)?;
            write_next_period(service, out)
        }
        "A" => add_period(service, input, out),
        _ => writeln!(
            out,
            "Invalid option. Please enter R to review data or A to add new data."
        ),
    }
}

fn add_period<R: PeriodRepository>(
    service: &CycleService<R>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Please enter the start date (yyyy-mm-dd): ")?;
    out.flush()?;
    let start = read_answer(input)?;
    writeln!(out, "Please enter the end date (yyyy-mm-dd): ")?;
    out.flush()?;
    let end = read_answer(input)?;

    let (start, end) = match (parse_input_date(&start), parse_input_date(&end)) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(err), _) | (_, Err(err)) => {
            info!("event=period_add module=cli status=rejected reason=input_format");
            writeln!(out, "{INVALID_DATE_MESSAGE} ({err})")?;
            return Ok(());
        }
    };

    match service.add_period(start, end) {
        Ok(_) => writeln!(out, "Period added."),
        Err(ServiceError::Validation(err)) => writeln!(out, "Period not added: {err}"),
        Err(ServiceError::Store(err)) => writeln!(out, "Error adding period: {err}"),
    }
}

fn remove_last<R: PeriodRepository>(
    service: &CycleService<R>,
    out: &mut impl Write,
) -> io::Result<()> {
    match service.remove_last_period() {
        Ok(Some(_)) => writeln!(out, "Successfully removed the last period."),
        Ok(None) => writeln!(out, "No periods to remove."),
        Err(err) => writeln!(out, "Error removing last period: {err}"),
    }
}

/// Reads one line, trimmed. End of input reads as an empty answer.
fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cycle_core::db::open_db;
    use cycle_core::RangePolicy;
    use std::io::Cursor;

    fn options(dir: &tempfile::TempDir) -> SessionOptions {
        SessionOptions {
            db_path: dir.path().join("db.sqlite3"),
            remove_last: false,
            policies: CyclePolicies::default(),
        }
    }

    fn run_with(options: &SessionOptions, input: &str) -> (SessionOutcome, String) {
        let mut output = Vec::new();
        let outcome = run(&mut Cursor::new(input.as_bytes()), &mut output, options).unwrap();
        (outcome, String::from_utf8(output).unwrap())
    }

    fn stored_count(options: &SessionOptions) -> usize {
        let conn = open_db(&options.db_path).unwrap();
        SqlitePeriodRepository::new(&conn).count().unwrap()
    }

    #[test]
    fn declining_disclaimer_exits_without_creating_storage() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir);

        let (outcome, output) = run_with(&options, "no\n");

        assert_eq!(outcome, SessionOutcome::Declined);
        assert!(output.contains(DECLINED_MESSAGE));
        assert!(!options.db_path.exists());
    }

    #[test]
    fn empty_input_counts_as_decline() {
        let dir = tempfile::tempdir().unwrap();
        let (outcome, _) = run_with(&options(&dir), "");
        assert_eq!(outcome, SessionOutcome::Declined);
    }

    #[test]
    fn adding_a_period_prints_it_with_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir);

        let (outcome, output) = run_with(&options, "YES\na\n2024-03-01\n2024-03-05\n");

        assert_eq!(outcome, SessionOutcome::Completed);
        assert!(output.contains("Period added."));
        assert!(output.contains(
            "Start Date: 2024-03-01, End Date: 2024-03-05, Cycle Length: 4 days, \
             Estimated Fertile Window: 2024-03-10 - 2024-03-15"
        ));
        assert!(output.contains("Predicted Start Date of Next Period: 2024-04-02"));
        assert!(output.contains("Predicted Fertile Window: 2024-04-11 - 2024-04-16"));
        assert_eq!(stored_count(&options), 1);
    }

    #[test]
    fn invalid_date_skips_insert_but_still_reports() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir);

        let (_, output) = run_with(&options, "yes\nA\n2024/03/01\n2024-03-05\n");

        assert!(output.contains(INVALID_DATE_MESSAGE));
        assert!(output.contains("No periods recorded yet."));
        assert!(output.contains(NEXT_PERIOD_UNAVAILABLE));
        assert!(output.contains(FERTILE_WINDOW_UNAVAILABLE));
        assert_eq!(stored_count(&options), 0);
    }

    #[test]
    fn review_prints_history_before_final_report() {
        let dir = tempfile::tempdir().unwrap();
        let options = options(&dir);
        run_with(&options, "yes\nA\n2024-03-01\n2024-03-05\n");

        let (_, output) = run_with(&options, "yes\nr\n");

        assert_eq!(output.matches("Period History: ").count(), 2);
        assert_eq!(
            output
                .matches("Predicted Start Date of Next Period: 2024-04-02")
                .count(),
            2
        );
    }

    #[test]
    fn unknown_menu_option_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (_, output) = run_with(&options(&dir), "yes\nX\n");
        assert!(output.contains("Invalid option."));
        assert!(output.contains(NEXT_PERIOD_UNAVAILABLE));
    }

    #[test]
    fn remove_last_skips_menu_and_deletes_latest_insert() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(&dir);
        run_with(&options, "yes\nA\n2024-03-01\n2024-03-05\n");
        run_with(&options, "yes\nA\n2024-01-01\n2024-01-05\n");

        options.remove_last = true;
        let (_, output) = run_with(&options, "yes\n");

        assert!(!output.contains("What would you like to do?"));
        assert!(output.contains("Successfully removed the last period."));
        assert!(output.contains("Start Date: 2024-03-01"));
        assert!(!output.contains("Start Date: 2024-01-01"));

        let (_, output) = run_with(&options, "yes\n");
        assert!(output.contains("Successfully removed the last period."));
        let (_, output) = run_with(&options, "yes\n");
        assert!(output.contains("No periods to remove."));
    }

    #[test]
    fn rejected_inverted_range_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options(&dir);
        options.policies.range = RangePolicy::RejectInverted;

        let (_, output) = run_with(&options, "yes\nA\n2024-03-05\n2024-03-01\n");

        assert!(output.contains("Period not added: end date 2024-03-01"));
        assert_eq!(stored_count(&options), 0);
    }

    #[test]
    fn unopenable_storage_still_reaches_report() {
        let dir = tempfile::tempdir().unwrap();
        let options = SessionOptions {
            db_path: dir.path().join("missing").join("db.sqlite3"),
            ..options(&dir)
        };

        let (outcome, output) = run_with(&options, "yes\n");

        assert_eq!(outcome, SessionOutcome::Completed);
        assert!(output.contains("Error initializing period tracker"));
        assert!(output.contains(NEXT_PERIOD_UNAVAILABLE));
        assert!(output.contains(FERTILE_WINDOW_UNAVAILABLE));
    }
}
