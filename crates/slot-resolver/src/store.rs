//! Appointment storage port.
//!
//! The resolver never talks to storage itself. A [`BookingService`] reads
//! booked slots through [`AppointmentStore`] and writes new or changed
//! appointments back through it. Implementations must refuse a second
//! scheduled appointment on the same (date, time).
//!
//! [`BookingService`]: crate::booking::BookingService

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::appointment::{Appointment, AppointmentStatus, Contact};
use crate::booked::BookedSlot;
use crate::calendar::{format_date, format_time};
use crate::error::{ResolverError, Result};

pub trait AppointmentStore {
    /// Slots of scheduled appointments with `start <= date <= end`.
    fn scheduled_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<BookedSlot>>;

    /// Store a new scheduled appointment and return it with its id.
    ///
    /// Fails with [`ResolverError::SlotTaken`] if another scheduled
    /// appointment holds `slot`.
    fn insert(&mut self, slot: BookedSlot, contact: Contact) -> Result<Appointment>;

    fn get(&self, id: u64) -> Result<Option<Appointment>>;

    /// Replace a stored appointment. Same uniqueness rule as `insert`.
    fn update(&mut self, appointment: &Appointment) -> Result<()>;

    fn delete(&mut self, id: u64) -> Result<()>;

    /// Every appointment, ordered by date then time.
    fn list(&self) -> Result<Vec<Appointment>>;
}

/// In-process store keyed by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    next_id: u64,
    rows: BTreeMap<u64, Appointment>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn holder_of(&self, slot: BookedSlot) -> Option<u64> {
        self.rows
            .values()
            .find(|a| a.status.occupies_slot() && a.slot() == slot)
            .map(|a| a.id)
    }
}

fn taken(slot: BookedSlot) -> ResolverError {
    ResolverError::SlotTaken {
        date: format_date(slot.date),
        time: format_time(slot.time),
    }
}

impl AppointmentStore for MemoryStore {
    fn scheduled_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<BookedSlot>> {
        Ok(self
            .rows
            .values()
            .filter(|a| a.status.occupies_slot() && a.date >= start && a.date <= end)
            .map(Appointment::slot)
            .collect())
    }

    fn insert(&mut self, slot: BookedSlot, contact: Contact) -> Result<Appointment> {
        if self.holder_of(slot).is_some() {
            return Err(taken(slot));
        }
        self.next_id += 1;
        let appointment = Appointment {
            id: self.next_id,
            date: slot.date,
            time: slot.time,
            contact,
            status: AppointmentStatus::Scheduled,
        };
        self.rows.insert(appointment.id, appointment.clone());
        debug!(id = appointment.id, "stored appointment");
        Ok(appointment)
    }

    fn get(&self, id: u64) -> Result<Option<Appointment>> {
        Ok(self.rows.get(&id).cloned())
    }

    fn update(&mut self, appointment: &Appointment) -> Result<()> {
        if !self.rows.contains_key(&appointment.id) {
            return Err(ResolverError::AppointmentNotFound(appointment.id));
        }
        if appointment.status.occupies_slot() {
            if let Some(holder) = self.holder_of(appointment.slot()) {
                if holder != appointment.id {
                    return Err(taken(appointment.slot()));
                }
            }
        }
        self.rows.insert(appointment.id, appointment.clone());
        Ok(())
    }

    fn delete(&mut self, id: u64) -> Result<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or(ResolverError::AppointmentNotFound(id))
    }

    fn list(&self) -> Result<Vec<Appointment>> {
        let mut all: Vec<Appointment> = self.rows.values().cloned().collect();
        all.sort_by_key(|a| (a.date, a.time, a.id));
        Ok(all)
    }
}
