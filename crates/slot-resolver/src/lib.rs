//! # slot-resolver
//!
//! Deterministic availability for a single-professional consultation
//! calendar.
//!
//! Given a weekly open-hours template, the slots already booked and an
//! explicit "today", the resolver decides which days of a month can be
//! picked, which times are offered on a picked day, and when a closed-day
//! advisory applies. Around it sit a storage port and a booking service for
//! creating and administering appointments.
//!
//! ## Modules
//!
//! - [`calendar`] - ISO date/time parsing, Sunday-first weekdays, month grids
//! - [`template`] - Weekly open-hours template and its JSON configuration
//! - [`booked`] - Booked (date, time) slots
//! - [`availability`] - The availability resolver
//! - [`appointment`] - Appointment records and status transitions
//! - [`store`] - Storage port and in-memory store
//! - [`booking`] - Booking and admin operations over a store
//! - [`error`] - Error types

pub mod appointment;
pub mod availability;
pub mod booked;
pub mod booking;
pub mod calendar;
pub mod error;
pub mod store;
pub mod template;

pub use appointment::{Appointment, AppointmentStatus, Contact, NewAppointment};
pub use availability::{
    AvailabilityQuery, AvailabilityResolver, AvailabilityResult, DayAvailability,
    ManualTimePolicy, SelectedDay, SlotStatus,
};
pub use booked::{BookedSlot, BookedSlots};
pub use booking::BookingService;
pub use calendar::{month_grid, GridCell};
pub use error::{ResolverError, Result};
pub use store::{AppointmentStore, MemoryStore};
pub use template::WeeklyTemplate;
