//! Calendar date helpers shared by the transaction store and the statistics.
//!
//! Dates cross the API boundary as `YYYY-MM-DD` strings.

use time::{Date, Month, format_description::BorrowedFormatItem, macros::format_description};

use crate::Error;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` string.
///
/// # Errors
///
/// Returns [Error::InvalidFormat] if `text` is not a valid calendar date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT)
        .map_err(|error| Error::InvalidFormat(format!("invalid date \"{text}\": {error}")))
}

/// Parse an optional `YYYY-MM-DD` query parameter, treating an empty string as absent.
pub fn parse_optional_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text {
        Some(text) if !text.trim().is_empty() => parse_date(text).map(Some),
        _ => Ok(None),
    }
}

/// Format `date` as `YYYY-MM-DD`.
pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// The last calendar day of `month` in `year`.
pub fn last_day_of_month(year: i32, month: Month) -> Option<Date> {
    let (next_year, next_month) = match month {
        Month::December => (year + 1, Month::January),
        month => (year, month.next()),
    };

    Date::from_calendar_date(next_year, next_month, 1)
        .ok()?
        .previous_day()
}

/// The date with day-of-month `day` in `month` of `year`, clamped to the last day of that month.
///
/// A repeat on the 31st lands on the 30th in April and on the 28th or 29th in February.
pub fn clamped_date(year: i32, month: Month, day: u8) -> Option<Date> {
    let last_day = last_day_of_month(year, month)?;

    Date::from_calendar_date(year, month, day.min(last_day.day())).ok()
}

/// The first and last calendar days of the month containing `date`.
pub fn month_bounds(date: Date) -> Option<(Date, Date)> {
    let first = date.replace_day(1).ok()?;
    let last = last_day_of_month(date.year(), date.month())?;

    Some((first, last))
}

/// Iterate over every date from `from` to `to`, inclusive.
///
/// Yields nothing if `from` is after `to`.
pub fn days_inclusive(from: Date, to: Date) -> impl Iterator<Item = Date> {
    std::iter::successors(Some(from), |date| date.next_day()).take_while(move |date| *date <= to)
}
