//! Appointment store: reservation records and their status lifecycle.
//!
//! `set_status` is the single gate through which status changes pass. It
//! enforces the one-way transition table as a check-and-set under one lock
//! acquisition and reports the prior status, so the booking coordinator can
//! decide whether a seat must be given back: a repeated cancel, for
//! instance, reports `previous = Cancelled` and triggers no second
//! decrement.

use crate::types::{Appointment, AppointmentId, AppointmentStatus, PatientId, SlotId};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors surfaced by appointment store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppointmentStoreError {
    /// Referenced appointment does not exist
    #[error("appointment {0} not found")]
    NotFound(AppointmentId),

    /// An appointment with this id already exists
    #[error("appointment {0} already exists")]
    Duplicate(AppointmentId),

    /// The requested status change is not in the one-way transition table
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        /// Status before the attempt
        from: AppointmentStatus,
        /// Rejected target status
        to: AppointmentStatus,
    },
}

/// Outcome of a successful `set_status` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    /// The appointment after the change
    pub appointment: Appointment,
    /// Status it held before the change (equal to the new status when the
    /// call was an idempotent no-op)
    pub previous: AppointmentStatus,
}

/// Persistence contract for appointments.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Insert a new appointment.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentStoreError::Duplicate`] if the id is taken.
    async fn insert(&self, appointment: Appointment) -> Result<(), AppointmentStoreError>;

    /// Fetch an appointment by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentStoreError::NotFound`] if absent.
    async fn get(&self, id: AppointmentId) -> Result<Appointment, AppointmentStoreError>;

    /// Atomically move an appointment to `new_status`.
    ///
    /// Setting the status it already holds is an idempotent no-op; any other
    /// change outside the one-way table is rejected.
    ///
    /// # Errors
    ///
    /// [`AppointmentStoreError::NotFound`] if absent,
    /// [`AppointmentStoreError::InvalidTransition`] for an illegal change.
    async fn set_status(
        &self,
        id: AppointmentId,
        new_status: AppointmentStatus,
    ) -> Result<StatusChange, AppointmentStoreError>;

    /// Record consultation output (note and/or document reference) on an
    /// appointment.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentStoreError::NotFound`] if absent.
    async fn attach_consultation(
        &self,
        id: AppointmentId,
        note: Option<String>,
        document_ref: Option<String>,
    ) -> Result<Appointment, AppointmentStoreError>;

    /// All appointments for a patient, ordered by snapshot date then start
    /// time ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, AppointmentStoreError>;

    /// All appointments booked against any of the given slots (the doctor
    /// view, via slot ownership), ordered by snapshot date then start time
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn find_by_slots(
        &self,
        slot_ids: &[SlotId],
    ) -> Result<Vec<Appointment>, AppointmentStoreError>;
}

/// In-memory appointment store backed by a `tokio` `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryAppointmentStore {
    appointments: RwLock<HashMap<AppointmentId, Appointment>>,
}

impl InMemoryAppointmentStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_by_window(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| (a.slot.date, a.slot.start));
}

#[async_trait]
impl AppointmentStore for InMemoryAppointmentStore {
    async fn insert(&self, appointment: Appointment) -> Result<(), AppointmentStoreError> {
        let mut appointments = self.appointments.write().await;
        if appointments.contains_key(&appointment.id) {
            return Err(AppointmentStoreError::Duplicate(appointment.id));
        }
        appointments.insert(appointment.id, appointment);
        Ok(())
    }

    async fn get(&self, id: AppointmentId) -> Result<Appointment, AppointmentStoreError> {
        self.appointments
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(AppointmentStoreError::NotFound(id))
    }

    async fn set_status(
        &self,
        id: AppointmentId,
        new_status: AppointmentStatus,
    ) -> Result<StatusChange, AppointmentStoreError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .get_mut(&id)
            .ok_or(AppointmentStoreError::NotFound(id))?;

        let previous = appointment.status;
        if previous != new_status {
            if !previous.can_transition_to(new_status) {
                return Err(AppointmentStoreError::InvalidTransition {
                    from: previous,
                    to: new_status,
                });
            }
            appointment.status = new_status;
            tracing::debug!(
                appointment_id = %id,
                from = %previous,
                to = %new_status,
                "Appointment status changed"
            );
        }

        Ok(StatusChange {
            appointment: appointment.clone(),
            previous,
        })
    }

    async fn attach_consultation(
        &self,
        id: AppointmentId,
        note: Option<String>,
        document_ref: Option<String>,
    ) -> Result<Appointment, AppointmentStoreError> {
        let mut appointments = self.appointments.write().await;
        let appointment = appointments
            .get_mut(&id)
            .ok_or(AppointmentStoreError::NotFound(id))?;

        if note.is_some() {
            appointment.note = note;
        }
        if document_ref.is_some() {
            appointment.document_ref = document_ref;
        }
        Ok(appointment.clone())
    }

    async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<Appointment>, AppointmentStoreError> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        sort_by_window(&mut found);
        Ok(found)
    }

    async fn find_by_slots(
        &self,
        slot_ids: &[SlotId],
    ) -> Result<Vec<Appointment>, AppointmentStoreError> {
        let mut found: Vec<Appointment> = self
            .appointments
            .read()
            .await
            .values()
            .filter(|a| slot_ids.contains(&a.slot.slot_id))
            .cloned()
            .collect();
        sort_by_window(&mut found);
        Ok(found)
    }
}
