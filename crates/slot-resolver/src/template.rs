//! Weekly open-hours template.
//!
//! A [`WeeklyTemplate`] maps each weekday (Sunday = 0 … Saturday = 6) to the
//! ordered slot start times offered on that day. A weekday with no times is a
//! closed day. Templates are validated once at construction and immutable
//! afterwards.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::Deserialize;

use crate::calendar::parse_time;
use crate::error::{ResolverError, Result};

/// Advisory shown for a closed weekday when the configuration names none.
pub const DEFAULT_CLOSED_DAY_MESSAGE: &str =
    "We do not hold consultations on this day. Please choose another date.";

/// Slot start times offered Monday through Saturday by the reference configuration.
pub const REFERENCE_SLOT_TIMES: [&str; 9] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00", "17:00",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTemplate {
    days: [Vec<NaiveTime>; 7],
    closed_day_message: String,
}

/// On-disk shape of a template.
///
/// ```json
/// {
///   "closed_day_message": "Closed on Sundays",
///   "weekdays": { "0": [], "1": ["09:00", "10:00"] }
/// }
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TemplateConfig {
    #[serde(default)]
    closed_day_message: Option<String>,
    weekdays: BTreeMap<u32, Vec<String>>,
}

impl WeeklyTemplate {
    /// Build a template from `(weekday, times)` pairs. Weekdays that never
    /// appear are closed.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::InvalidWeekday`] for a weekday outside 0–6
    /// - [`ResolverError::InvalidTime`] for a time that is not `HH:MM`
    /// - [`ResolverError::DuplicateSlot`] if a time repeats within one weekday
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_resolver::WeeklyTemplate;
    ///
    /// let template = WeeklyTemplate::from_weekdays([
    ///     (0, vec![]),
    ///     (1, vec!["13:00", "14:00"]),
    /// ])
    /// .unwrap();
    /// assert!(template.is_closed(0).unwrap());
    /// assert_eq!(template.slots(1).unwrap().len(), 2);
    /// ```
    pub fn from_weekdays<I, S>(weekdays: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut days: [Vec<NaiveTime>; 7] = Default::default();

        for (weekday, times) in weekdays {
            let day = days
                .get_mut(weekday as usize)
                .ok_or(ResolverError::InvalidWeekday(weekday))?;
            for raw in times {
                let raw = raw.as_ref();
                let time = parse_time(raw)?;
                if day.contains(&time) {
                    return Err(ResolverError::DuplicateSlot {
                        weekday,
                        time: raw.to_string(),
                    });
                }
                day.push(time);
            }
        }

        Ok(Self {
            days,
            closed_day_message: DEFAULT_CLOSED_DAY_MESSAGE.to_string(),
        })
    }

    /// Replace the closed-day advisory.
    ///
    /// # Errors
    ///
    /// [`ResolverError::InvalidTemplate`] if the message is blank.
    pub fn with_closed_day_message(mut self, message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(ResolverError::InvalidTemplate(
                "closed_day_message must not be blank".to_string(),
            ));
        }
        self.closed_day_message = message;
        Ok(self)
    }

    /// Parse a template from its JSON configuration form.
    ///
    /// # Errors
    ///
    /// [`ResolverError::InvalidTemplate`] for malformed JSON, plus every
    /// error [`WeeklyTemplate::from_weekdays`] can return.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TemplateConfig = serde_json::from_str(json)
            .map_err(|e| ResolverError::InvalidTemplate(e.to_string()))?;

        let template = Self::from_weekdays(config.weekdays)?;
        match config.closed_day_message {
            Some(message) => template.with_closed_day_message(message),
            None => Ok(template),
        }
    }

    /// The configuration the booking site ships: Sunday closed, Monday to
    /// Saturday hourly from 09:00 to 17:00.
    pub fn reference() -> Self {
        let hours: Vec<NaiveTime> = (9..=17)
            .filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0))
            .collect();
        let mut days: [Vec<NaiveTime>; 7] = Default::default();
        for day in days.iter_mut().skip(1) {
            day.clone_from(&hours);
        }
        Self {
            days,
            closed_day_message: DEFAULT_CLOSED_DAY_MESSAGE.to_string(),
        }
    }

    /// Configured slot start times for a weekday, in configured order.
    pub fn slots(&self, weekday: u32) -> Result<&[NaiveTime]> {
        self.days
            .get(weekday as usize)
            .map(Vec::as_slice)
            .ok_or(ResolverError::InvalidWeekday(weekday))
    }

    pub fn is_closed(&self, weekday: u32) -> Result<bool> {
        Ok(self.slots(weekday)?.is_empty())
    }

    /// Whether `time` is one of the configured starts for `weekday`.
    pub fn offers(&self, weekday: u32, time: NaiveTime) -> Result<bool> {
        Ok(self.slots(weekday)?.contains(&time))
    }

    pub fn closed_day_message(&self) -> &str {
        &self.closed_day_message
    }
}

impl Default for WeeklyTemplate {
    fn default() -> Self {
        Self::reference()
    }
}
