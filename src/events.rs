//! Domain events emitted after committed booking state transitions.
//!
//! Events are immutable facts handed to the notification side after the
//! paired store mutation has committed. The doctor reference is always
//! resolved from the owning slot, never from the appointment's own fields.

use crate::types::{AppointmentId, AppointmentStatus, DoctorId, PatientId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A booking fact published for asynchronous notification delivery.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    /// A reservation was made against a slot
    AppointmentCreated {
        /// The new appointment
        appointment_id: AppointmentId,
        /// Patient holding the reservation
        patient_id: PatientId,
        /// Owner of the booked slot
        doctor_id: DoctorId,
        /// Date of the booked window
        date: NaiveDate,
    },

    /// A reservation was cancelled and its seat released
    AppointmentCancelled {
        /// The cancelled appointment
        appointment_id: AppointmentId,
        /// Patient who held the reservation
        patient_id: PatientId,
        /// Owner of the booked slot
        doctor_id: DoctorId,
    },

    /// An appointment changed status without a slot effect (completion)
    AppointmentUpdated {
        /// The updated appointment
        appointment_id: AppointmentId,
        /// Patient holding the reservation
        patient_id: PatientId,
        /// Owner of the booked slot
        doctor_id: DoctorId,
        /// The status after the update
        status: AppointmentStatus,
    },
}

impl BookingEvent {
    /// Short kind label for logging and dispatch
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AppointmentCreated { .. } => "appointment_created",
            Self::AppointmentCancelled { .. } => "appointment_cancelled",
            Self::AppointmentUpdated { .. } => "appointment_updated",
        }
    }

    /// The appointment this event is about
    #[must_use]
    pub const fn appointment_id(&self) -> AppointmentId {
        match self {
            Self::AppointmentCreated { appointment_id, .. }
            | Self::AppointmentCancelled { appointment_id, .. }
            | Self::AppointmentUpdated { appointment_id, .. } => *appointment_id,
        }
    }

    /// The doctor notified about this event
    #[must_use]
    pub const fn doctor_id(&self) -> DoctorId {
        match self {
            Self::AppointmentCreated { doctor_id, .. }
            | Self::AppointmentCancelled { doctor_id, .. }
            | Self::AppointmentUpdated { doctor_id, .. } => *doctor_id,
        }
    }
}
