//! Booking error taxonomy.
//!
//! Store-level errors bubble unchanged to the coordinator, which classifies
//! them into this taxonomy before they reach the service boundary.

use crate::stores::{AppointmentStoreError, SlotStoreError};
use crate::types::{AppointmentId, AppointmentStatus, SlotId};
use thiserror::Error;

/// Errors returned by the booking coordinator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Referenced slot does not exist
    #[error("slot {0} not found")]
    SlotNotFound(SlotId),

    /// Referenced appointment does not exist
    #[error("appointment {0} not found")]
    AppointmentNotFound(AppointmentId),

    /// The slot was fully booked at decision time; user-actionable (pick
    /// another slot), never retried automatically
    #[error("slot {slot_id} is fully booked (capacity {capacity})")]
    CapacityExceeded {
        /// The contested slot
        slot_id: SlotId,
        /// Its fixed capacity
        capacity: u32,
    },

    /// Illegal status transition, e.g. cancelling a completed appointment
    #[error("invalid status transition: {from} -> {to}")]
    InvalidState {
        /// Status before the attempt
        from: AppointmentStatus,
        /// Rejected target status
        to: AppointmentStatus,
    },

    /// Input rejected before any state change
    #[error("validation failed: {0}")]
    Validation(String),

    /// The atomic slot update lost a race and the retry budget is spent
    #[error("concurrent update conflict on slot {0}")]
    ConcurrencyConflict(SlotId),

    /// Unexpected store failure
    #[error("internal booking error: {0}")]
    Internal(String),
}

impl From<SlotStoreError> for BookingError {
    fn from(err: SlotStoreError) -> Self {
        match err {
            SlotStoreError::NotFound(id) => Self::SlotNotFound(id),
            SlotStoreError::CapacityExceeded { slot_id, capacity } => {
                Self::CapacityExceeded { slot_id, capacity }
            }
            SlotStoreError::Conflict(id) => Self::ConcurrencyConflict(id),
            SlotStoreError::Validation(msg) => Self::Validation(msg),
        }
    }
}

impl From<AppointmentStoreError> for BookingError {
    fn from(err: AppointmentStoreError) -> Self {
        match err {
            AppointmentStoreError::NotFound(id) => Self::AppointmentNotFound(id),
            AppointmentStoreError::InvalidTransition { from, to } => {
                Self::InvalidState { from, to }
            }
            AppointmentStoreError::Duplicate(id) => {
                Self::Internal(format!("duplicate appointment id {id}"))
            }
        }
    }
}
