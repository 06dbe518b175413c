//! Error types for slot-resolver operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid weekday: {0} (expected 0-6, Sunday = 0)")]
    InvalidWeekday(u32),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Duplicate slot {time} on weekday {weekday}")]
    DuplicateSlot { weekday: u32, time: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Slot already booked: {date} {time}")]
    SlotTaken { date: String, time: String },

    #[error("Slot not available: {0}")]
    SlotUnavailable(String),

    #[error("Invalid contact details: {0}")]
    InvalidContact(String),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(u64),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, ResolverError>;
