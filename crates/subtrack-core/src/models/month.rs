//! Month-year date handling
//!
//! Dates cross the API boundary as `"MM-YYYY"` strings. Internally every
//! date is a `NaiveDate` pinned to the first day of its month.

use chrono::{Datelike, Months, NaiveDate};

use crate::error::AppError;

/// Message returned when a month-year string cannot be parsed
pub const INVALID_MONTH_YEAR: &str = "invalid date format, expected MM-YYYY";

/// Parse a `"MM-YYYY"` string into the first day of that month
///
/// The month must be exactly two digits (01-12) and the year exactly four.
pub fn parse_month_year(value: &str) -> Result<NaiveDate, AppError> {
    let invalid = || AppError::Validation(INVALID_MONTH_YEAR.to_string());

    let (month, year) = value.split_once('-').ok_or_else(invalid)?;

    if month.len() != 2 || year.len() != 4 {
        return Err(invalid());
    }
    if !month.bytes().all(|b| b.is_ascii_digit()) || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Format a date as `"MM-YYYY"`
pub fn format_month_year(date: NaiveDate) -> String {
    date.format("%m-%Y").to_string()
}

/// Normalize a date to the first day of its month
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last calendar day of the month containing `date`
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}
