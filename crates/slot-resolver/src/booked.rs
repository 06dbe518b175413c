//! Booked slots: (date, time) pairs already consumed by a scheduled appointment.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{format_date, format_time, parse_date, parse_time};
use crate::error::{ResolverError, Result};

/// A single occupied slot.
///
/// Serializes as `{"date": "YYYY-MM-DD", "time": "HH:MM"}` and validates both
/// fields on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawSlot", into = "RawSlot")]
pub struct BookedSlot {
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Serialize, Deserialize)]
struct RawSlot {
    date: String,
    time: String,
}

impl TryFrom<RawSlot> for BookedSlot {
    type Error = ResolverError;

    fn try_from(raw: RawSlot) -> Result<Self> {
        BookedSlot::parse(&raw.date, &raw.time)
    }
}

impl From<BookedSlot> for RawSlot {
    fn from(slot: BookedSlot) -> Self {
        RawSlot {
            date: format_date(slot.date),
            time: format_time(slot.time),
        }
    }
}

impl BookedSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Parse from the `YYYY-MM-DD` / `HH:MM` string pair used by storage.
    pub fn parse(date: &str, time: &str) -> Result<Self> {
        Ok(Self {
            date: parse_date(date)?,
            time: parse_time(time)?,
        })
    }
}

/// Read-only set of booked slots for the month being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookedSlots {
    slots: HashSet<BookedSlot>,
}

impl BookedSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact membership test. Booking 09:00 does not block 09:30.
    pub fn contains(&self, date: NaiveDate, time: NaiveTime) -> bool {
        self.slots.contains(&BookedSlot { date, time })
    }

    /// Booked times on one date, ascending.
    pub fn times_on(&self, date: NaiveDate) -> Vec<NaiveTime> {
        let mut times: Vec<NaiveTime> = self
            .slots
            .iter()
            .filter(|s| s.date == date)
            .map(|s| s.time)
            .collect();
        times.sort();
        times
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BookedSlot> {
        self.slots.iter()
    }
}

impl FromIterator<BookedSlot> for BookedSlots {
    fn from_iter<T: IntoIterator<Item = BookedSlot>>(iter: T) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

impl Extend<BookedSlot> for BookedSlots {
    fn extend<T: IntoIterator<Item = BookedSlot>>(&mut self, iter: T) {
        self.slots.extend(iter);
    }
}
