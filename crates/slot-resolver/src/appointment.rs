//! Appointment records and their status lifecycle.
//!
//! ```text
//! scheduled ──cancel──▶ cancelled
//!     │
//!     └──complete──▶ completed
//! ```
//!
//! Only a scheduled appointment occupies its slot, and only a scheduled
//! appointment can be cancelled, completed or moved.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::booked::BookedSlot;
use crate::calendar::{format_date, format_time};
use crate::error::{ResolverError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Whether an appointment in this status blocks its slot for others.
    pub fn occupies_slot(self) -> bool {
        self == AppointmentStatus::Scheduled
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who the consultation is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Full name of the client.
    pub name: String,
    /// Phone number, free-form.
    pub phone: String,
    /// Email address; must contain `@` with text on both sides.
    pub email: String,
}

impl Contact {
    /// All three fields are required; the email needs at least an `@`
    /// with something on each side.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ResolverError::InvalidContact("name is required".to_string()));
        }
        if self.phone.trim().is_empty() {
            return Err(ResolverError::InvalidContact("phone is required".to_string()));
        }
        let email = self.email.trim();
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !well_formed {
            return Err(ResolverError::InvalidContact(format!(
                "'{email}' is not an email address"
            )));
        }
        Ok(())
    }
}

/// A booking request as submitted by the client form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    /// Requested date (`YYYY-MM-DD`).
    pub date: String,
    /// Requested slot start (`HH:MM`).
    pub time: String,
    /// Client details; flattened into the form payload.
    #[serde(flatten)]
    pub contact: Contact,
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    /// Store-assigned identifier.
    pub id: u64,
    /// Consultation date.
    pub date: NaiveDate,
    /// Slot start time.
    pub time: NaiveTime,
    /// Who booked it.
    pub contact: Contact,
    /// Lifecycle state; only `Scheduled` occupies the slot.
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn slot(&self) -> BookedSlot {
        BookedSlot::new(self.date, self.time)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.transition(AppointmentStatus::Cancelled, "cancel")
    }

    pub fn complete(&mut self) -> Result<()> {
        self.transition(AppointmentStatus::Completed, "complete")
    }

    /// Move to another slot. The caller checks that the slot is free.
    pub fn move_to(&mut self, date: NaiveDate, time: NaiveTime) -> Result<()> {
        self.ensure_scheduled("reschedule")?;
        self.date = date;
        self.time = time;
        Ok(())
    }

    fn transition(&mut self, to: AppointmentStatus, action: &str) -> Result<()> {
        self.ensure_scheduled(action)?;
        self.status = to;
        Ok(())
    }

    pub(crate) fn ensure_scheduled(&self, action: &str) -> Result<()> {
        if self.status != AppointmentStatus::Scheduled {
            return Err(ResolverError::InvalidTransition(format!(
                "appointment {} on {} {} is {}; cannot {action}",
                self.id,
                format_date(self.date),
                format_time(self.time),
                self.status
            )));
        }
        Ok(())
    }
}
