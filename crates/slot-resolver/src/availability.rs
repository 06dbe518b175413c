//! The availability resolver.
//!
//! Decides which days of a month can be picked, which slot times are offered
//! on a picked day, and when to show the closed-day advisory. Every decision
//! is a pure function of the weekly template, the booked-slot set and an
//! explicit "today"; nothing here reads the system clock.
//!
//! # Rules
//!
//! - A date before today is never selectable. This dominates the weekday rule.
//! - A date whose weekday has no configured times is closed: not selectable,
//!   and [`AvailabilityResolver::closed_day_warning`] returns the advisory.
//! - Everything else is selectable, including today itself.
//! - A slot is booked when `(date, time)` is in the booked set. Matching is
//!   exact; slot durations are not modelled.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::debug;

use crate::booked::BookedSlots;
use crate::calendar::{
    format_date, format_time, month_grid, parse_date, parse_time, weekday_index, GridCell,
};
use crate::error::{ResolverError, Result};
use crate::template::WeeklyTemplate;

// ── Result types ────────────────────────────────────────────────────────────

/// One offered time on a day, with its booking state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    /// Slot start time (`HH:MM`).
    pub time: String,
    /// Whether a scheduled appointment already holds this (date, time).
    pub is_booked: bool,
}

/// Selectability of one day in the viewed month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAvailability {
    /// Day of the month (1-based).
    pub day: u32,
    /// The same day as `YYYY-MM-DD`.
    pub date: String,
    /// Not in the past and not a closed weekday.
    pub selectable: bool,
}

/// Slot listing for the selected date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedDay {
    /// The selected date (`YYYY-MM-DD`).
    pub date: String,
    /// Same rule as [`DayAvailability::selectable`].
    pub selectable: bool,
    /// Configured times for the weekday, in configured order.
    pub slots: Vec<SlotStatus>,
}

impl SelectedDay {
    /// Times a client may actually pick: the day is selectable and the slot is free.
    pub fn open_times(&self) -> Vec<&str> {
        if !self.selectable {
            return Vec::new();
        }
        self.slots
            .iter()
            .filter(|s| !s.is_booked)
            .map(|s| s.time.as_str())
            .collect()
    }
}

// ── Query ───────────────────────────────────────────────────────────────────

/// Input to [`AvailabilityResolver::resolve`].
#[derive(Debug, Clone)]
pub struct AvailabilityQuery {
    /// Year of the viewed month.
    pub year: i32,
    /// Viewed month (1-12).
    pub month: u32,
    /// Selected date (`YYYY-MM-DD`), which must fall inside the viewed month.
    pub selected: Option<String>,
    /// Slots already booked in the viewed month.
    pub booked: BookedSlots,
    /// Reference date (`YYYY-MM-DD`) for the past-date rule.
    pub today: String,
}

impl AvailabilityQuery {
    pub fn new(year: i32, month: u32, today: impl Into<String>) -> Self {
        Self {
            year,
            month,
            selected: None,
            booked: BookedSlots::new(),
            today: today.into(),
        }
    }

    pub fn with_selected(mut self, date: impl Into<String>) -> Self {
        self.selected = Some(date.into());
        self
    }

    pub fn with_booked(mut self, booked: BookedSlots) -> Self {
        self.booked = booked;
        self
    }
}

/// Output of [`AvailabilityResolver::resolve`]. Derived on every query, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityResult {
    /// Year of the viewed month.
    pub year: i32,
    /// Viewed month (1-12).
    pub month: u32,
    /// Sunday-aligned layout, leading blanks then day numbers.
    pub grid: Vec<GridCell>,
    /// One entry per day of the month, in order.
    pub days: Vec<DayAvailability>,
    /// Slot listing for the selected date, if one was given.
    pub selected: Option<SelectedDay>,
    /// Closed-day advisory for the selected date.
    pub warning: Option<String>,
}

// ── Manual time entry ───────────────────────────────────────────────────────

/// How a free-text time typed by the client is checked.
///
/// The booking form once let clients type a time instead of picking one.
/// Such a time skips the weekly template entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManualTimePolicy {
    /// Only the closed-day advisory is reported; booked slots are not
    /// consulted, so a typed time can land on an occupied slot.
    #[default]
    TemplateBypass,
    /// As `TemplateBypass`, but a typed time that collides with a booked
    /// slot fails with [`ResolverError::SlotTaken`].
    RejectBooked,
}

// ── Resolver ────────────────────────────────────────────────────────────────

/// Resolves availability against one weekly template.
///
/// Holds no state besides the template, so it can be shared freely between
/// threads and queried any number of times with identical results.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityResolver {
    template: WeeklyTemplate,
}

impl AvailabilityResolver {
    pub fn new(template: WeeklyTemplate) -> Self {
        Self { template }
    }

    pub fn template(&self) -> &WeeklyTemplate {
        &self.template
    }

    // ── Single-day rules ────────────────────────────────────────────────

    /// Whether `date` may be picked, given `today`.
    ///
    /// # Errors
    ///
    /// [`ResolverError::InvalidDate`] if either argument is not `YYYY-MM-DD`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slot_resolver::{AvailabilityResolver, WeeklyTemplate};
    ///
    /// let template =
    ///     WeeklyTemplate::from_weekdays([(0, vec![]), (1, vec!["13:00", "14:00"])]).unwrap();
    /// let resolver = AvailabilityResolver::new(template);
    ///
    /// assert!(resolver.is_date_selectable("2024-03-04", "2024-03-04").unwrap()); // Monday, today
    /// assert!(!resolver.is_date_selectable("2024-03-03", "2024-03-01").unwrap()); // Sunday
    /// assert!(!resolver.is_date_selectable("2024-03-01", "2024-03-04").unwrap()); // past
    /// ```
    pub fn is_date_selectable(&self, date: &str, today: &str) -> Result<bool> {
        self.day_selectable(parse_date(date)?, parse_date(today)?)
    }

    /// Configured times for the weekday of `date`, each flagged if booked.
    ///
    /// Output order is the configured order. A closed day yields an empty
    /// list; use [`AvailabilityResolver::closed_day_warning`] to tell a
    /// closed day apart from one with nothing configured.
    pub fn slots_for_date(&self, date: &str, booked: &BookedSlots) -> Result<Vec<SlotStatus>> {
        self.day_slots(parse_date(date)?, booked)
    }

    /// The closed-day advisory when the weekday of `date` has no slots.
    pub fn closed_day_warning(&self, date: &str) -> Result<Option<String>> {
        self.day_warning(parse_date(date)?)
    }

    // ── Month view ──────────────────────────────────────────────────────

    /// Sunday-aligned grid for a month; see [`crate::calendar::month_grid`].
    pub fn month_grid(&self, year: i32, month: u32) -> Result<Vec<GridCell>> {
        month_grid(year, month)
    }

    /// Resolve a full month view, plus the selected day if any.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::InvalidMonth`] for a month outside 1–12
    /// - [`ResolverError::InvalidDate`] for a malformed `today` or selected
    ///   date, or a selected date outside the viewed month
    pub fn resolve(&self, query: &AvailabilityQuery) -> Result<AvailabilityResult> {
        let grid = month_grid(query.year, query.month)?;
        let today = parse_date(&query.today)?;

        let mut days = Vec::new();
        for day in grid.iter().filter_map(|c| c.day()) {
            let date = NaiveDate::from_ymd_opt(query.year, query.month, day).ok_or_else(|| {
                ResolverError::InvalidDate(format!("{}-{:02}-{day:02}", query.year, query.month))
            })?;
            days.push(DayAvailability {
                day,
                date: format_date(date),
                selectable: self.day_selectable(date, today)?,
            });
        }

        let (selected, warning) = match query.selected.as_deref() {
            Some(raw) => {
                let date = parse_date(raw)?;
                if date.year() != query.year || date.month() != query.month {
                    return Err(ResolverError::InvalidDate(format!(
                        "'{raw}' is outside {}-{:02}",
                        query.year, query.month
                    )));
                }
                let selected = SelectedDay {
                    date: format_date(date),
                    selectable: self.day_selectable(date, today)?,
                    slots: self.day_slots(date, &query.booked)?,
                };
                (Some(selected), self.day_warning(date)?)
            }
            None => (None, None),
        };

        debug!(
            year = query.year,
            month = query.month,
            booked = query.booked.len(),
            selectable_days = days.iter().filter(|d| d.selectable).count(),
            "resolved month availability"
        );

        Ok(AvailabilityResult {
            year: query.year,
            month: query.month,
            grid,
            days,
            selected,
            warning,
        })
    }

    // ── Manual entry ────────────────────────────────────────────────────

    /// Check a time the client typed by hand.
    ///
    /// Returns the closed-day advisory, if any. The template is never
    /// consulted, and booked slots only under [`ManualTimePolicy::RejectBooked`].
    pub fn check_manual_time(
        &self,
        date: &str,
        time: &str,
        booked: &BookedSlots,
        policy: ManualTimePolicy,
    ) -> Result<Option<String>> {
        let date = parse_date(date)?;
        let time = parse_time(time)?;

        if policy == ManualTimePolicy::RejectBooked && booked.contains(date, time) {
            return Err(ResolverError::SlotTaken {
                date: format_date(date),
                time: format_time(time),
            });
        }
        self.day_warning(date)
    }

    // ── Typed helpers ───────────────────────────────────────────────────

    pub(crate) fn day_selectable(&self, date: NaiveDate, today: NaiveDate) -> Result<bool> {
        if date < today {
            return Ok(false);
        }
        Ok(!self.template.is_closed(weekday_index(date)?)?)
    }

    pub(crate) fn day_slots(&self, date: NaiveDate, booked: &BookedSlots) -> Result<Vec<SlotStatus>> {
        let slots = self.template.slots(weekday_index(date)?)?;
        Ok(slots
            .iter()
            .map(|&time| SlotStatus {
                time: format_time(time),
                is_booked: booked.contains(date, time),
            })
            .collect())
    }

    pub(crate) fn day_warning(&self, date: NaiveDate) -> Result<Option<String>> {
        if self.template.is_closed(weekday_index(date)?)? {
            Ok(Some(self.template.closed_day_message().to_string()))
        } else {
            Ok(None)
        }
    }

    /// Whether `time` is an offered start on the weekday of `date`.
    pub(crate) fn offers(&self, date: NaiveDate, time: NaiveTime) -> Result<bool> {
        self.template.offers(weekday_index(date)?, time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booked::BookedSlot;

    fn resolver() -> AvailabilityResolver {
        let template =
            WeeklyTemplate::from_weekdays([(0, vec![]), (1, vec!["13:00", "14:00"])]).unwrap();
        AvailabilityResolver::new(template)
    }

    fn slot(time: &str, is_booked: bool) -> SlotStatus {
        SlotStatus {
            time: time.to_string(),
            is_booked,
        }
    }

    // ── is_date_selectable ──────────────────────────────────────────────

    #[test]
    fn test_today_open_weekday_is_selectable() {
        assert!(resolver().is_date_selectable("2024-03-04", "2024-03-04").unwrap());
    }

    #[test]
    fn test_closed_sunday_not_selectable() {
        assert!(!resolver().is_date_selectable("2024-03-03", "2024-03-01").unwrap());
    }

    #[test]
    fn test_past_dominates_weekday() {
        // 2024-02-26 is a Monday, open in the template, but in the past
        assert!(!resolver().is_date_selectable("2024-02-26", "2024-03-04").unwrap());
        // 2024-03-01 is a Friday, not in the template and in the past
        assert!(!resolver().is_date_selectable("2024-03-01", "2024-03-04").unwrap());
    }

    #[test]
    fn test_future_open_weekday_is_selectable() {
        assert!(resolver().is_date_selectable("2024-03-11", "2024-03-04").unwrap());
    }

    #[test]
    fn test_unconfigured_weekday_is_closed() {
        // Tuesday never appears in the template
        assert!(!resolver().is_date_selectable("2024-03-05", "2024-03-04").unwrap());
    }

    #[test]
    fn test_malformed_dates_rejected() {
        let err = resolver().is_date_selectable("2024/03/04", "2024-03-04").unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDate(_)));
        let err = resolver().is_date_selectable("2024-03-04", "today").unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDate(_)));
    }

    // ── slots_for_date ──────────────────────────────────────────────────

    #[test]
    fn test_slots_nothing_booked() {
        let slots = resolver().slots_for_date("2024-03-04", &BookedSlots::new()).unwrap();
        assert_eq!(slots, vec![slot("13:00", false), slot("14:00", false)]);
    }

    #[test]
    fn test_slots_with_booking() {
        let booked: BookedSlots = [BookedSlot::parse("2024-03-04", "13:00").unwrap()]
            .into_iter()
            .collect();
        let slots = resolver().slots_for_date("2024-03-04", &booked).unwrap();
        assert_eq!(slots, vec![slot("13:00", true), slot("14:00", false)]);
    }

    #[test]
    fn test_booking_on_other_date_ignored() {
        let booked: BookedSlots = [BookedSlot::parse("2024-03-11", "13:00").unwrap()]
            .into_iter()
            .collect();
        let slots = resolver().slots_for_date("2024-03-04", &booked).unwrap();
        assert!(slots.iter().all(|s| !s.is_booked));
    }

    #[test]
    fn test_slots_closed_day_empty() {
        let slots = resolver().slots_for_date("2024-03-03", &BookedSlots::new()).unwrap();
        assert!(slots.is_empty());
    }

    // ── closed_day_warning ──────────────────────────────────────────────

    #[test]
    fn test_warning_on_closed_day_only() {
        let r = resolver();
        let warning = r.closed_day_warning("2024-03-03").unwrap();
        assert!(warning.is_some_and(|w| !w.is_empty()));
        assert_eq!(r.closed_day_warning("2024-03-04").unwrap(), None);
    }

    #[test]
    fn test_warning_uses_configured_message() {
        let template = WeeklyTemplate::reference()
            .with_closed_day_message("Domingo cerrado")
            .unwrap();
        let r = AvailabilityResolver::new(template);
        assert_eq!(
            r.closed_day_warning("2024-03-10").unwrap().as_deref(),
            Some("Domingo cerrado")
        );
    }

    // ── resolve ─────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_month_without_selection() {
        let result = resolver()
            .resolve(&AvailabilityQuery::new(2024, 3, "2024-03-04"))
            .unwrap();
        assert_eq!(result.grid.len(), 36);
        assert_eq!(result.days.len(), 31);
        let selectable: Vec<u32> = result
            .days
            .iter()
            .filter(|d| d.selectable)
            .map(|d| d.day)
            .collect();
        assert_eq!(selectable, vec![4, 11, 18, 25]);
        assert_eq!(result.selected, None);
        assert_eq!(result.warning, None);
    }

    #[test]
    fn test_resolve_selected_day_with_booking() {
        let booked: BookedSlots = [BookedSlot::parse("2024-03-04", "13:00").unwrap()]
            .into_iter()
            .collect();
        let query = AvailabilityQuery::new(2024, 3, "2024-03-04")
            .with_selected("2024-03-04")
            .with_booked(booked);
        let result = resolver().resolve(&query).unwrap();
        let selected = result.selected.unwrap();
        assert!(selected.selectable);
        assert_eq!(selected.slots, vec![slot("13:00", true), slot("14:00", false)]);
        assert_eq!(selected.open_times(), vec!["14:00"]);
        assert_eq!(result.warning, None);
    }

    #[test]
    fn test_resolve_selected_closed_day_warns() {
        let query = AvailabilityQuery::new(2024, 3, "2024-03-01").with_selected("2024-03-03");
        let result = resolver().resolve(&query).unwrap();
        let selected = result.selected.unwrap();
        assert!(!selected.selectable);
        assert!(selected.slots.is_empty());
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_resolve_past_selected_day_offers_nothing() {
        let query = AvailabilityQuery::new(2024, 3, "2024-03-12").with_selected("2024-03-04");
        let result = resolver().resolve(&query).unwrap();
        let selected = result.selected.unwrap();
        assert!(!selected.selectable);
        assert_eq!(selected.slots.len(), 2);
        assert!(selected.open_times().is_empty());
    }

    #[test]
    fn test_resolve_rejects_selection_outside_month() {
        let query = AvailabilityQuery::new(2024, 3, "2024-03-01").with_selected("2024-04-01");
        let err = resolver().resolve(&query).unwrap_err().to_string();
        assert!(err.contains("outside 2024-03"), "got: {err}");
    }

    #[test]
    fn test_resolve_rejects_bad_month() {
        let err = resolver()
            .resolve(&AvailabilityQuery::new(2024, 13, "2024-03-01"))
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidMonth(_)));
    }

    #[test]
    fn test_resolve_rejects_malformed_today_and_selected() {
        let err = resolver()
            .resolve(&AvailabilityQuery::new(2024, 3, "2024-3-4"))
            .unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDate(_)), "got: {err}");

        let query = AvailabilityQuery::new(2024, 3, "2024-03-04").with_selected("03/04/2024");
        let err = resolver().resolve(&query).unwrap_err();
        assert!(matches!(err, ResolverError::InvalidDate(_)), "got: {err}");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let query = AvailabilityQuery::new(2024, 3, "2024-03-04").with_selected("2024-03-18");
        let r = resolver();
        assert_eq!(r.resolve(&query).unwrap(), r.resolve(&query).unwrap());
    }

    // ── manual time entry ───────────────────────────────────────────────

    #[test]
    fn test_manual_time_bypasses_booked_slots() {
        let booked: BookedSlots = [BookedSlot::parse("2024-03-04", "13:00").unwrap()]
            .into_iter()
            .collect();
        let warning = resolver()
            .check_manual_time("2024-03-04", "13:00", &booked, ManualTimePolicy::TemplateBypass)
            .unwrap();
        assert_eq!(warning, None);
    }

    #[test]
    fn test_manual_time_ignores_template() {
        // 08:15 is not a configured slot but is accepted as typed
        let warning = resolver()
            .check_manual_time(
                "2024-03-04",
                "08:15",
                &BookedSlots::new(),
                ManualTimePolicy::default(),
            )
            .unwrap();
        assert_eq!(warning, None);
    }

    #[test]
    fn test_manual_time_warns_on_closed_day() {
        let warning = resolver()
            .check_manual_time(
                "2024-03-03",
                "10:00",
                &BookedSlots::new(),
                ManualTimePolicy::TemplateBypass,
            )
            .unwrap();
        assert!(warning.is_some());
    }

    #[test]
    fn test_manual_time_reject_booked_policy() {
        let booked: BookedSlots = [BookedSlot::parse("2024-03-04", "13:00").unwrap()]
            .into_iter()
            .collect();
        let err = resolver()
            .check_manual_time("2024-03-04", "13:00", &booked, ManualTimePolicy::RejectBooked)
            .unwrap_err();
        assert_eq!(
            err,
            ResolverError::SlotTaken {
                date: "2024-03-04".to_string(),
                time: "13:00".to_string()
            }
        );
    }
}
