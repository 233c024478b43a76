//! Read-side queries over committed booking state.
//!
//! Joins appointments and slots with display names from the external
//! identity store (behind [`ProfileDirectory`]). Read paths bypass the
//! coordinator entirely; the stores expose only committed state, so these
//! queries never observe an in-flight booking.

use crate::stores::{AppointmentStore, AppointmentStoreError, SlotStore, SlotStoreError};
use crate::types::{
    Appointment, AppointmentId, AppointmentStatus, DoctorId, PatientId, Slot, SlotId,
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Read-side failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Slot store read failed
    #[error("slot query failed: {0}")]
    Slot(#[from] SlotStoreError),

    /// Appointment store read failed
    #[error("appointment query failed: {0}")]
    Appointment(#[from] AppointmentStoreError),
}

/// Display-name lookups against the external identity/profile store.
///
/// The booking core only needs names for enrichment; everything else about
/// users stays outside this service.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    /// Display name for a doctor, if known
    async fn doctor_name(&self, id: DoctorId) -> Option<String>;

    /// Display name for a patient, if known
    async fn patient_name(&self, id: PatientId) -> Option<String>;
}

/// In-memory profile directory, for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryProfileDirectory {
    doctors: RwLock<HashMap<DoctorId, String>>,
    patients: RwLock<HashMap<PatientId, String>>,
}

impl InMemoryProfileDirectory {
    /// Creates an empty directory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a doctor's display name
    pub async fn register_doctor(&self, id: DoctorId, name: impl Into<String>) {
        self.doctors.write().await.insert(id, name.into());
    }

    /// Register a patient's display name
    pub async fn register_patient(&self, id: PatientId, name: impl Into<String>) {
        self.patients.write().await.insert(id, name.into());
    }
}

#[async_trait]
impl ProfileDirectory for InMemoryProfileDirectory {
    async fn doctor_name(&self, id: DoctorId) -> Option<String> {
        self.doctors.read().await.get(&id).cloned()
    }

    async fn patient_name(&self, id: PatientId) -> Option<String> {
        self.patients.read().await.get(&id).cloned()
    }
}

/// An appointment enriched for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppointmentView {
    /// Appointment identifier
    pub id: AppointmentId,
    /// Slot the appointment was booked against (may since be deleted)
    pub slot_id: SlotId,
    /// Snapshot date
    pub date: NaiveDate,
    /// Snapshot start time
    pub start: NaiveTime,
    /// Snapshot end time
    pub end: NaiveTime,
    /// Lifecycle status
    pub status: AppointmentStatus,
    /// Patient reference
    pub patient_id: PatientId,
    /// Patient display name, when the directory knows it
    pub patient_name: Option<String>,
    /// Doctor reference, resolved via the slot's owner; `None` once the
    /// slot has been deleted
    pub doctor_id: Option<DoctorId>,
    /// Doctor display name, when resolvable
    pub doctor_name: Option<String>,
    /// Consultation note
    pub note: Option<String>,
    /// Attached document reference
    pub document_ref: Option<String>,
    /// Reservation timestamp
    pub created_at: DateTime<Utc>,
}

/// A slot enriched for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotView {
    /// Slot identifier
    pub id: SlotId,
    /// Owning doctor
    pub doctor_id: DoctorId,
    /// Doctor display name, when the directory knows it
    pub doctor_name: Option<String>,
    /// Calendar date
    pub date: NaiveDate,
    /// Window start
    pub start: NaiveTime,
    /// Window end
    pub end: NaiveTime,
    /// Fixed capacity
    pub capacity: u32,
    /// Currently booked
    pub booked: u32,
    /// Remaining seats
    pub available: u32,
}

/// Read-side query service.
pub struct BookingQueries {
    slots: Arc<dyn SlotStore>,
    appointments: Arc<dyn AppointmentStore>,
    directory: Arc<dyn ProfileDirectory>,
}

impl BookingQueries {
    /// Creates a query service over the given stores and directory
    #[must_use]
    pub fn new(
        slots: Arc<dyn SlotStore>,
        appointments: Arc<dyn AppointmentStore>,
        directory: Arc<dyn ProfileDirectory>,
    ) -> Self {
        Self {
            slots,
            appointments,
            directory,
        }
    }

    /// A patient's appointments, ordered by date then start time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when a store read fails.
    pub async fn appointments_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AppointmentView>, QueryError> {
        let appointments = self.appointments.find_by_patient(patient_id).await?;
        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            views.push(self.enrich(appointment).await);
        }
        Ok(views)
    }

    /// A doctor's appointments, found via slot ownership, ordered by date
    /// then start time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when a store read fails.
    pub async fn appointments_for_doctor(
        &self,
        doctor_id: DoctorId,
    ) -> Result<Vec<AppointmentView>, QueryError> {
        let slot_ids: Vec<SlotId> = self
            .slots
            .list_for_doctor(doctor_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        let appointments = self.appointments.find_by_slots(&slot_ids).await?;

        let doctor_name = self.directory.doctor_name(doctor_id).await;
        let mut views = Vec::with_capacity(appointments.len());
        for appointment in appointments {
            let patient_name = self.directory.patient_name(appointment.patient_id).await;
            views.push(view_from(
                appointment,
                Some(doctor_id),
                doctor_name.clone(),
                patient_name,
            ));
        }
        Ok(views)
    }

    /// Bookable slots for a doctor on a date, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when a store read fails.
    pub async fn available_slots(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<SlotView>, QueryError> {
        let slots = self.slots.find_available(doctor_id, date).await?;
        Ok(self.slot_views(slots).await)
    }

    /// All of a doctor's slots, full ones included, ordered by date then
    /// start time.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] when a store read fails.
    pub async fn doctor_schedule(&self, doctor_id: DoctorId) -> Result<Vec<SlotView>, QueryError> {
        let slots = self.slots.list_for_doctor(doctor_id).await?;
        Ok(self.slot_views(slots).await)
    }

    async fn slot_views(&self, slots: Vec<Slot>) -> Vec<SlotView> {
        let mut views = Vec::with_capacity(slots.len());
        for slot in slots {
            let doctor_name = self.directory.doctor_name(slot.doctor_id).await;
            views.push(SlotView {
                id: slot.id,
                doctor_id: slot.doctor_id,
                doctor_name,
                date: slot.date,
                start: slot.start,
                end: slot.end,
                capacity: slot.capacity,
                booked: slot.booked,
                available: slot.remaining(),
            });
        }
        views
    }

    async fn enrich(&self, appointment: Appointment) -> AppointmentView {
        let patient_name = self.directory.patient_name(appointment.patient_id).await;
        let doctor_id = match self.slots.get(appointment.slot.slot_id).await {
            Ok(slot) => Some(slot.doctor_id),
            Err(_) => None,
        };
        let doctor_name = match doctor_id {
            Some(id) => self.directory.doctor_name(id).await,
            None => None,
        };
        view_from(appointment, doctor_id, doctor_name, patient_name)
    }
}

fn view_from(
    appointment: Appointment,
    doctor_id: Option<DoctorId>,
    doctor_name: Option<String>,
    patient_name: Option<String>,
) -> AppointmentView {
    AppointmentView {
        id: appointment.id,
        slot_id: appointment.slot.slot_id,
        date: appointment.slot.date,
        start: appointment.slot.start,
        end: appointment.slot.end,
        status: appointment.status,
        patient_id: appointment.patient_id,
        patient_name,
        doctor_id,
        doctor_name,
        note: appointment.note,
        document_ref: appointment.document_ref,
        created_at: appointment.created_at,
    }
}
