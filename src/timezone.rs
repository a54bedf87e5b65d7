//! Resolves "today" in the server's configured time zone.

use std::fmt;

use time::{Date, OffsetDateTime};
use time_tz::{Offset, TimeZone, Tz};

use crate::Error;

/// A clock that reports the current date in the server's local time zone.
///
/// The offset is looked up on every call so daylight saving transitions are respected.
#[derive(Clone, Copy)]
pub struct LocalClock {
    timezone: Option<&'static Tz>,
}

impl LocalClock {
    /// Create a clock for a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTimezone] if `canonical_timezone` is not a known time zone.
    pub fn new(canonical_timezone: &str) -> Result<Self, Error> {
        time_tz::timezones::get_by_name(canonical_timezone)
            .map(|tz| Self { timezone: Some(tz) })
            .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_owned()))
    }

    /// A clock that always reports UTC.
    pub fn utc() -> Self {
        Self { timezone: None }
    }

    /// The current date and time in the local time zone.
    pub fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();

        match self.timezone {
            Some(tz) => now.to_offset(tz.get_offset_utc(&now).to_utc()),
            None => now,
        }
    }

    /// The current calendar date in the local time zone.
    pub fn today(&self) -> Date {
        self.now().date()
    }
}

impl fmt::Debug for LocalClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.timezone.map_or("UTC", |tz| tz.name());

        f.debug_struct("LocalClock").field("timezone", &name).finish()
    }
}
