//! Booking service: the resolver wired to an appointment store.
//!
//! Covers the client flow (view a month, pick a slot, book it) and the admin
//! operations on existing appointments (reschedule, cancel, complete,
//! delete). Authentication for the admin side is the caller's job.
//!
//! Booked slots are always read from the store right before a decision. If
//! that read fails the error is returned as-is: availability is unknown, and
//! treating it as "nothing booked" would allow double bookings.

use chrono::{Datelike, NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::appointment::{Appointment, NewAppointment};
use crate::availability::{AvailabilityQuery, AvailabilityResolver, AvailabilityResult};
use crate::booked::{BookedSlot, BookedSlots};
use crate::calendar::{format_date, format_time, month_bounds, parse_date, parse_time};
use crate::error::{ResolverError, Result};
use crate::store::AppointmentStore;

pub struct BookingService<S> {
    resolver: AvailabilityResolver,
    store: S,
}

impl<S: AppointmentStore> BookingService<S> {
    pub fn new(resolver: AvailabilityResolver, store: S) -> Self {
        Self { resolver, store }
    }

    pub fn resolver(&self) -> &AvailabilityResolver {
        &self.resolver
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Booked slots for a whole month, read from the store.
    pub fn booked_slots(&self, year: i32, month: u32) -> Result<BookedSlots> {
        let (first, last) = month_bounds(year, month)?;
        let slots = self
            .store
            .scheduled_between(first, last)
            .inspect_err(|e| warn!(year, month, error = %e, "booked-slot fetch failed"))?;
        Ok(slots.into_iter().collect())
    }

    /// Month view for the client calendar.
    pub fn month_availability(
        &self,
        year: i32,
        month: u32,
        selected: Option<&str>,
        today: &str,
    ) -> Result<AvailabilityResult> {
        let mut query =
            AvailabilityQuery::new(year, month, today).with_booked(self.booked_slots(year, month)?);
        if let Some(date) = selected {
            query = query.with_selected(date);
        }
        self.resolver.resolve(&query)
    }

    /// Scheduled times on one date, ascending.
    pub fn taken_times(&self, date: &str) -> Result<Vec<String>> {
        let date = parse_date(date)?;
        let booked: BookedSlots = self.store.scheduled_between(date, date)?.into_iter().collect();
        Ok(booked.times_on(date).into_iter().map(format_time).collect())
    }

    /// Book a slot picked from the calendar.
    ///
    /// # Errors
    ///
    /// - [`ResolverError::InvalidContact`] for missing name/phone or a bad email
    /// - [`ResolverError::SlotUnavailable`] if the date is past or closed, or
    ///   the time is not offered on that weekday
    /// - [`ResolverError::SlotTaken`] if the slot is already booked
    /// - whatever the store returns if reading or writing fails
    pub fn book(&mut self, request: NewAppointment, today: &str) -> Result<Appointment> {
        request.contact.validate()?;
        let date = parse_date(&request.date)?;
        let time = parse_time(&request.time)?;
        let today = parse_date(today)?;

        self.ensure_open(date, time, today, None)?;

        let appointment = self
            .store
            .insert(BookedSlot::new(date, time), request.contact)?;
        info!(
            id = appointment.id,
            date = %request.date,
            time = %request.time,
            "appointment booked"
        );
        Ok(appointment)
    }

    /// Move a scheduled appointment to another slot.
    ///
    /// Cancelled and completed appointments fail with
    /// [`ResolverError::InvalidTransition`] before the target slot is looked
    /// at. The appointment's current slot is always accepted, so
    /// rescheduling onto itself succeeds without changes even once its date
    /// has passed.
    pub fn reschedule(
        &mut self,
        id: u64,
        date: &str,
        time: &str,
        today: &str,
    ) -> Result<Appointment> {
        let mut appointment = self.fetch(id)?;
        appointment.ensure_scheduled("reschedule")?;
        let date = parse_date(date)?;
        let time = parse_time(time)?;
        let today = parse_date(today)?;

        self.ensure_open(date, time, today, Some(appointment.slot()))?;
        appointment.move_to(date, time)?;
        self.store.update(&appointment)?;

        info!(
            id,
            date = %format_date(date),
            time = %format_time(time),
            "appointment rescheduled"
        );
        Ok(appointment)
    }

    pub fn cancel(&mut self, id: u64) -> Result<Appointment> {
        let mut appointment = self.fetch(id)?;
        appointment.cancel()?;
        self.store.update(&appointment)?;
        info!(id, "appointment cancelled");
        Ok(appointment)
    }

    pub fn complete(&mut self, id: u64) -> Result<Appointment> {
        let mut appointment = self.fetch(id)?;
        appointment.complete()?;
        self.store.update(&appointment)?;
        info!(id, "appointment completed");
        Ok(appointment)
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.fetch(id)?;
        self.store.delete(id)?;
        info!(id, "appointment deleted");
        Ok(())
    }

    /// All appointments, ordered by date then time.
    pub fn list(&self) -> Result<Vec<Appointment>> {
        self.store.list()
    }

    fn fetch(&self, id: u64) -> Result<Appointment> {
        self.store
            .get(id)?
            .ok_or(ResolverError::AppointmentNotFound(id))
    }

    /// The date is selectable, the time is offered that weekday, and no
    /// other scheduled appointment holds the slot. `own` skips every check.
    fn ensure_open(
        &self,
        date: NaiveDate,
        time: NaiveTime,
        today: NaiveDate,
        own: Option<BookedSlot>,
    ) -> Result<()> {
        let slot = BookedSlot::new(date, time);
        if own == Some(slot) {
            return Ok(());
        }
        let label = format!("{} {}", format_date(date), format_time(time));

        if !self.resolver.day_selectable(date, today)? {
            return Err(ResolverError::SlotUnavailable(format!(
                "{label}: date is in the past or closed"
            )));
        }
        if !self.resolver.offers(date, time)? {
            return Err(ResolverError::SlotUnavailable(format!(
                "{label}: time is not offered on this weekday"
            )));
        }

        let booked = self.booked_slots(date.year(), date.month())?;
        if booked.contains(date, time) {
            return Err(ResolverError::SlotTaken {
                date: format_date(date),
                time: format_time(time),
            });
        }
        Ok(())
    }
}
