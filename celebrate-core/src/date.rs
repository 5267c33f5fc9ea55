//! Recurring-date arithmetic for yearly celebrations.
//!
//! Everything here is pure and works on local wall-clock values. There is no
//! time zone handling: "now" is whatever the caller's clock says it is.
//!
//! Only month/day drive recurrence. The year of the original date is kept for
//! display and for computing the age a birthday person is turning.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::celebration::{Celebration, CelebrationKind};
use crate::error::{CelebrateError, CelebrateResult};
use crate::language::Language;

/// Raw year/month/day components as written in an ISO date string.
///
/// Components are not range-checked on parse. Use [`CalendarDate::to_naive`]
/// to find out whether they form a real date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Where a Feb 29 celebration lands in years without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeapDayPolicy {
    #[default]
    Feb28,
    Mar1,
}

impl CalendarDate {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        CalendarDate { year, month, day }
    }

    /// The full date, or None when the components don't form one (e.g. 2023-02-29).
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Whether month/day exist in at least one year (Feb 29 counts).
    pub fn is_valid_month_day(&self) -> bool {
        // 2000 is a leap year
        NaiveDate::from_ymd_opt(2000, self.month, self.day).is_some()
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate::new(date.year(), date.month(), date.day())
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Split `YYYY-MM-DD` into integer components.
///
/// A trailing time part (`1990-07-26T00:00:00Z`) is ignored. Fails only when
/// the string doesn't consist of three integers; ranges are not checked.
pub fn parse_calendar_date(iso: &str) -> CelebrateResult<CalendarDate> {
    let date_part = iso.trim().split('T').next().unwrap_or_default();
    let parts: Vec<&str> = date_part.split('-').collect();

    let [year, month, day] = parts.as_slice() else {
        return Err(CelebrateError::InvalidDate(iso.to_string()));
    };

    let invalid = |_| CelebrateError::InvalidDate(iso.to_string());
    Ok(CalendarDate {
        year: year.parse().map_err(invalid)?,
        month: month.parse().map_err(invalid)?,
        day: day.parse().map_err(invalid)?,
    })
}

/// Zero-padded `YYYY-MM-DD`.
pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight of the same day.
pub fn start_of_day(datetime: NaiveDateTime) -> NaiveDateTime {
    datetime.date().and_time(NaiveTime::MIN)
}

/// Resolve a month/day in a given year, applying the leap day policy to Feb 29.
pub fn resolve_in_year(year: i32, month: u32, day: u32, leap: LeapDayPolicy) -> Option<NaiveDate> {
    if month == 2 && day == 29 && NaiveDate::from_ymd_opt(year, 2, 29).is_none() {
        return match leap {
            LeapDayPolicy::Feb28 => NaiveDate::from_ymd_opt(year, 2, 28),
            LeapDayPolicy::Mar1 => NaiveDate::from_ymd_opt(year, 3, 1),
        };
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// The same month/day one year later.
pub fn add_one_year(date: NaiveDate, leap: LeapDayPolicy) -> Option<NaiveDate> {
    resolve_in_year(date.year() + 1, date.month(), date.day(), leap)
}

/// Next yearly occurrence of `original` on or after the day of `reference`.
///
/// Returns None when the month/day never exists.
pub fn next_occurrence(
    original: &CalendarDate,
    reference: NaiveDateTime,
    leap: LeapDayPolicy,
) -> Option<NaiveDate> {
    if !original.is_valid_month_day() {
        return None;
    }

    let today = start_of_day(reference).date();
    let candidate = resolve_in_year(today.year(), original.month, original.day, leap)?;

    if candidate < today {
        resolve_in_year(today.year() + 1, original.month, original.day, leap)
    } else {
        Some(candidate)
    }
}

/// Whole days from the reference day to the target day. Time of day is ignored.
pub fn days_until(target: NaiveDate, reference: NaiveDateTime) -> i64 {
    (target - start_of_day(reference).date()).num_days()
}

/// Age reached at the next occurrence. Birthdays only.
pub fn age_turning(
    record: &Celebration,
    reference: NaiveDateTime,
    leap: LeapDayPolicy,
) -> Option<i32> {
    if record.kind != CelebrationKind::Birthday {
        return None;
    }

    let original = parse_calendar_date(&record.date).ok()?;
    let next = next_occurrence(&original, reference, leap)?;
    Some(next.year() - original.year)
}

/// Long-form date such as "July 26, 2024" or "26. července 2024".
pub fn format_long(date: NaiveDate, language: Language) -> String {
    let month = language.month_name(date.month());
    match language {
        Language::English => format!("{} {}, {}", month, date.day(), date.year()),
        Language::Czech | Language::German => {
            format!("{}. {} {}", date.day(), month, date.year())
        }
    }
}
