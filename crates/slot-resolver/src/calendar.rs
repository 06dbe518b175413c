//! Calendar primitives: fixed-width ISO parsing, weekday derivation, month grids.
//!
//! Dates are `YYYY-MM-DD` and times are 24-hour `HH:MM`, both zero-padded.
//! Anything else is rejected instead of being normalized, so that two strings
//! naming the same slot are always byte-identical.
//!
//! Weekdays are numbered Sunday-first (0 = Sunday … 6 = Saturday), matching
//! the column order of the month grid.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{ResolverError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Parse a zero-padded `YYYY-MM-DD` date.
///
/// # Errors
///
/// Returns [`ResolverError::InvalidDate`] if the string is not exactly ten
/// characters in that layout or does not name a real calendar day.
///
/// # Examples
///
/// ```
/// use slot_resolver::calendar::parse_date;
///
/// assert!(parse_date("2024-02-29").is_ok());
/// assert!(parse_date("2023-02-29").is_err());
/// assert!(parse_date("2024-3-4").is_err());
/// ```
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    if !shaped {
        return Err(ResolverError::InvalidDate(format!(
            "'{s}': expected YYYY-MM-DD"
        )));
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| ResolverError::InvalidDate(format!("'{s}': {e}")))
}

/// Parse a zero-padded 24-hour `HH:MM` time.
///
/// # Errors
///
/// Returns [`ResolverError::InvalidTime`] for any other shape or an
/// out-of-range hour/minute.
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    let bytes = s.as_bytes();
    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 2 || b.is_ascii_digit());
    if !shaped {
        return Err(ResolverError::InvalidTime(format!("'{s}': expected HH:MM")));
    }
    NaiveTime::parse_from_str(s, TIME_FORMAT)
        .map_err(|e| ResolverError::InvalidTime(format!("'{s}': {e}")))
}

/// Parse a `YYYY-MM` month into `(year, month)`.
pub fn parse_year_month(s: &str) -> Result<(i32, u32)> {
    let first = parse_date(&format!("{s}-01"))
        .map_err(|_| ResolverError::InvalidMonth(format!("'{s}': expected YYYY-MM")))?;
    Ok((first.year(), first.month()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Sunday-first weekday index of `date` (0 = Sunday … 6 = Saturday).
///
/// # Errors
///
/// [`ResolverError::InvalidWeekday`] if the derived index is outside 0–6.
/// chrono never produces one, so this only fires on a broken invariant.
pub fn weekday_index(date: NaiveDate) -> Result<u32> {
    let index = date.weekday().num_days_from_sunday();
    if index > 6 {
        return Err(ResolverError::InvalidWeekday(index));
    }
    Ok(index)
}

/// First and last day of a month, both inclusive.
///
/// # Errors
///
/// [`ResolverError::InvalidMonth`] if `month` is not 1–12 or the year is out
/// of chrono's range.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let invalid = || ResolverError::InvalidMonth(format!("{year}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (ny, nm) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// Number of days in a Gregorian month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let (_, last) = month_bounds(year, month)?;
    Ok(last.day())
}

/// Sunday-first weekday index of the first day of the month.
pub fn first_weekday(year: i32, month: u32) -> Result<u32> {
    let (first, _) = month_bounds(year, month)?;
    weekday_index(first)
}

/// One cell of a Sunday-aligned month grid.
///
/// Serializes as `null` for a blank and as the bare day number otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GridCell {
    Blank,
    Day(u32),
}

impl GridCell {
    pub fn day(self) -> Option<u32> {
        match self {
            GridCell::Blank => None,
            GridCell::Day(d) => Some(d),
        }
    }
}

/// Lay out a month as a Sunday-aligned grid.
///
/// Produces `first_weekday(year, month)` leading blanks followed by days
/// `1..=days_in_month(year, month)`. The last week is not padded, so the
/// length is exactly blanks + days.
///
/// # Examples
///
/// ```
/// use slot_resolver::calendar::{month_grid, GridCell};
///
/// // March 2024 starts on a Friday.
/// let grid = month_grid(2024, 3).unwrap();
/// assert_eq!(grid.len(), 5 + 31);
/// assert_eq!(grid[4], GridCell::Blank);
/// assert_eq!(grid[5], GridCell::Day(1));
/// ```
pub fn month_grid(year: i32, month: u32) -> Result<Vec<GridCell>> {
    let blanks = first_weekday(year, month)?;
    let days = days_in_month(year, month)?;

    let mut cells = Vec::with_capacity((blanks + days) as usize);
    cells.extend((0..blanks).map(|_| GridCell::Blank));
    cells.extend((1..=days).map(GridCell::Day));
    Ok(cells)
}
