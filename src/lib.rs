//! Clinic booking service - slot capacity management and appointment
//! lifecycle for a medical-appointment platform.
//!
//! The service owns the one part of the platform with real invariants:
//! booking a seat in a finite-capacity availability slot, walking an
//! appointment through its one-way lifecycle, and emitting domain events
//! for the notification side. Identity/profile data, email delivery, and
//! document generation stay behind trait seams as external collaborators.
//!
//! # Architecture
//!
//! ```text
//! Write side:
//! ┌──────────────┐      ┌─────────────────────┐      ┌──────────────┐
//! │  Slot Store  │◄─────┤ Booking Coordinator ├─────►│ Appointment  │
//! │ (capacity /  │      │  reserve / cancel / │      │    Store     │
//! │   booked)    │      │      complete       │      │  (lifecycle) │
//! └──────────────┘      └─────────┬───────────┘      └──────────────┘
//!                                 │ committed events
//!                                 ▼
//!                       ┌─────────────────┐
//!                       │ Event Notifier  │──► handlers (log, email, …)
//!                       │ (bounded queue) │
//!                       └─────────────────┘
//!
//! Read side:
//! ┌─────────────────┐   slot/appointment joins   ┌───────────────────┐
//! │ Booking Queries ├───────────────────────────►│ Profile Directory │
//! │  (projections)  │      display names         │    (external)     │
//! └─────────────────┘                            └───────────────────┘
//! ```
//!
//! # Key properties
//!
//! - **No over-booking**: the seat check-and-increment is a single atomic
//!   store operation; for a slot of capacity N, exactly N concurrent
//!   reservations succeed and the rest observe `CapacityExceeded`.
//! - **One-way lifecycle**: `Reserved → Done` and `Reserved → Cancelled`
//!   only; repeat cancels are no-ops and never release a seat twice.
//! - **Decoupled notification**: events are published after commit into a
//!   bounded queue; delivery failures are logged, never propagated.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod booking;
pub mod config;
pub mod error;
pub mod events;
pub mod notifier;
pub mod projections;
pub mod server;
pub mod stores;
pub mod types;

pub use booking::BookingCoordinator;
pub use config::Config;
pub use error::BookingError;
pub use events::BookingEvent;
pub use notifier::{
    ChannelNotifier, EventNotifier, LogNotificationHandler, NotificationConsumer,
    NotificationHandler,
};
pub use projections::{BookingQueries, InMemoryProfileDirectory, ProfileDirectory};
pub use stores::{
    AppointmentStore, InMemoryAppointmentStore, InMemorySlotStore, SlotStore,
};
pub use types::*;
