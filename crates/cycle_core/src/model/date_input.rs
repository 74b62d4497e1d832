//! Parsing of user-entered `yyyy-MM-dd` dates.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Display/input format for every date the tool shows or accepts.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date shape pattern must compile")
});

/// Raised when user text is not a valid `yyyy-MM-dd` calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFormatError {
    pub input: String,
}

impl Display for InputFormatError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "`{}` is not a date in format yyyy-mm-dd", self.input)
    }
}

impl Error for InputFormatError {}

/// Parses a trimmed `yyyy-MM-dd` string into a calendar date.
pub fn parse_input_date(input: &str) -> Result<NaiveDate, InputFormatError> {
    let trimmed = input.trim();
    let invalid = || InputFormatError {
        input: trimmed.to_string(),
    };

    if !DATE_SHAPE.is_match(trimmed) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| invalid())
}

/// Formats a date the same way it is accepted as input.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
