//! Repeat specifications for recurring transactions.
//!
//! A repeat spec is a comma-separated list of tokens, each either a day of the
//! month (`1` to `31`) or an English weekday name or abbreviation, e.g.
//! `"1, 15"` or `"mon, Friday"`. The text crosses the API verbatim as the
//! `repeatTime` field of a transaction.

use std::fmt::Display;

use time::{Date, Duration, Weekday};

use crate::{
    Error,
    date::{clamped_date, last_day_of_month},
};

/// A single parsed token of a repeat spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatToken {
    /// Repeat on this day of every month.
    DayOfMonth(u8),
    /// Repeat on this day of every week.
    Weekday(Weekday),
}

impl RepeatToken {
    fn parse(token: &str) -> Result<Self, Error> {
        if let Ok(day) = token.parse::<i64>() {
            return match u8::try_from(day) {
                Ok(day @ 1..=31) => Ok(Self::DayOfMonth(day)),
                _ => Err(Error::InvalidFormat(format!(
                    "invalid day of the month {day} in repeat spec, must be between 1 and 31"
                ))),
            };
        }

        parse_weekday(token).map(Self::Weekday).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "invalid repeat spec token \"{token}\", must be a day of the month (1-31) \
                or one of: mon, tue, wed, thu, fri, sat, sun"
            ))
        })
    }

    /// The first date on or after `reference` matching a day-of-month token,
    /// or the first date strictly after `reference` matching a weekday token.
    fn candidate(self, reference: Date) -> Option<Date> {
        match self {
            Self::DayOfMonth(day) if day >= reference.day() => {
                clamped_date(reference.year(), reference.month(), day)
            }
            Self::DayOfMonth(day) => {
                let following_month = last_day_of_month(reference.year(), reference.month())?
                    .next_day()?;
                clamped_date(following_month.year(), following_month.month(), day)
            }
            Self::Weekday(weekday) => {
                let delta = (i64::from(weekday.number_days_from_monday())
                    - i64::from(reference.weekday().number_days_from_monday()))
                .rem_euclid(7);
                let delta = if delta == 0 { 7 } else { delta };

                reference.checked_add(Duration::days(delta))
            }
        }
    }
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    let weekday = match token.to_lowercase().as_str() {
        "mon" | "monday" => Weekday::Monday,
        "tue" | "tuesday" => Weekday::Tuesday,
        "wed" | "wednesday" => Weekday::Wednesday,
        "thu" | "thursday" => Weekday::Thursday,
        "fri" | "friday" => Weekday::Friday,
        "sat" | "saturday" => Weekday::Saturday,
        "sun" | "sunday" => Weekday::Sunday,
        _ => return None,
    };

    Some(weekday)
}

/// A validated, non-empty repeat spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatSpec {
    text: String,
    tokens: Vec<RepeatToken>,
}

impl RepeatSpec {
    /// Parse a repeat spec.
    ///
    /// Blank tokens (e.g. from a trailing comma) are skipped. Returns `Ok(None)`
    /// when the spec has no tokens at all, meaning the transaction does not repeat.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidFormat] naming the first token that is neither a
    /// day of the month between 1 and 31 nor a weekday.
    pub fn parse(text: &str) -> Result<Option<Self>, Error> {
        let tokens = text
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(RepeatToken::parse)
            .collect::<Result<Vec<_>, _>>()?;

        if tokens.is_empty() {
            return Ok(None);
        }

        Ok(Some(Self {
            text: text.trim().to_owned(),
            tokens,
        }))
    }

    /// The parsed tokens in the order they were written.
    pub fn tokens(&self) -> &[RepeatToken] {
        &self.tokens
    }

    /// The spec as it was written, without surrounding whitespace.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The nearest occurrence on or after `reference`.
    ///
    /// Day-of-month tokens may resolve to `reference` itself, weekday tokens
    /// never do: the reference's own weekday resolves to one week later.
    /// Falls back to one year after `reference`.
    pub fn next_occurrence(&self, reference: Date) -> Date {
        earliest(
            self.tokens.iter().filter_map(|token| token.candidate(reference)),
            reference,
        )
    }
}

impl Display for RepeatSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

fn earliest(candidates: impl Iterator<Item = Date>, reference: Date) -> Date {
    candidates
        .chain(one_year_after(reference))
        .min()
        .unwrap_or(reference)
}

fn one_year_after(date: Date) -> Option<Date> {
    let year = date.year() + 1;

    date.replace_year(year)
        .ok()
        .or_else(|| clamped_date(year, date.month(), date.day()))
}

/// Check that `text` is a valid repeat spec. An empty spec is valid.
///
/// # Errors
///
/// Returns [Error::InvalidFormat] naming the offending token.
pub fn validate_repeat_spec(text: &str) -> Result<(), Error> {
    RepeatSpec::parse(text).map(|_| ())
}

/// Compute the nearest next occurrence of `text` on or after `reference`.
///
/// Unrecognised tokens are ignored. A spec without usable tokens resolves to
/// one year after `reference`.
pub fn compute_next_occurrence(reference: Date, text: &str) -> Date {
    earliest(
        text.split(',')
            .filter_map(|token| RepeatToken::parse(token.trim()).ok())
            .filter_map(|token| token.candidate(reference)),
        reference,
    )
}
