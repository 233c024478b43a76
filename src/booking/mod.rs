//! Booking coordinator: the write-side core.
//!
//! Enforces the cross-entity invariants between slots and appointments:
//! a reservation takes a seat and creates an appointment as one unit, a
//! cancellation gives the seat back exactly once, and a completion flips the
//! status with no slot effect. Events are handed to the notifier only after
//! the paired store mutations committed; notification delivery never rolls a
//! booking back.
//!
//! **Concurrency**: the seat check-and-increment lives inside
//! [`SlotStore::reserve_seat`], so concurrent reservations against the last
//! seat are serialized by the store: exactly `capacity` of them succeed and
//! the rest observe `CapacityExceeded`. First committer wins; there is no
//! queueing. A store that signals an optimistic [`Conflict`] gets exactly one
//! retry before the caller sees `CapacityExceeded`.
//!
//! [`Conflict`]: crate::stores::SlotStoreError::Conflict

use crate::error::BookingError;
use crate::events::BookingEvent;
use crate::notifier::EventNotifier;
use crate::stores::{AppointmentStore, SlotStore, SlotStoreError};
use crate::types::{
    Appointment, AppointmentId, AppointmentStatus, ConsultationOutcome, DoctorId, PatientId, Slot,
    SlotId, SlotSnapshot,
};
use chrono::{NaiveDate, NaiveTime, Utc};
use std::sync::Arc;

/// Coordinates slot and appointment mutations for the booking write side.
pub struct BookingCoordinator {
    slots: Arc<dyn SlotStore>,
    appointments: Arc<dyn AppointmentStore>,
    notifier: Arc<dyn EventNotifier>,
}

impl BookingCoordinator {
    /// Creates a coordinator over the given stores and notifier
    #[must_use]
    pub fn new(
        slots: Arc<dyn SlotStore>,
        appointments: Arc<dyn AppointmentStore>,
        notifier: Arc<dyn EventNotifier>,
    ) -> Self {
        Self {
            slots,
            appointments,
            notifier,
        }
    }

    /// Open a new availability slot for a doctor.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::Validation`] if `capacity < 1` or
    /// `end <= start`.
    pub async fn open_slot(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        capacity: u32,
    ) -> Result<Slot, BookingError> {
        let slot = self.slots.create(doctor_id, date, start, end, capacity).await?;
        tracing::info!(slot_id = %slot.id, doctor_id = %doctor_id, %date, capacity, "Slot opened");
        Ok(slot)
    }

    /// Delete an availability slot. Appointments already booked against it
    /// keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::SlotNotFound`] if absent.
    pub async fn close_slot(&self, slot_id: SlotId) -> Result<(), BookingError> {
        self.slots.remove(slot_id).await?;
        tracing::info!(slot_id = %slot_id, "Slot removed");
        Ok(())
    }

    /// Reserve a seat in `slot_id` for `patient_id`.
    ///
    /// Takes the seat and creates the appointment as one unit: when the
    /// appointment cannot be stored after the seat was taken, the seat is
    /// released again before the error surfaces. On success an
    /// `AppointmentCreated` event is emitted with the doctor resolved from
    /// the slot's owner.
    ///
    /// # Errors
    ///
    /// [`BookingError::SlotNotFound`] for an unknown slot,
    /// [`BookingError::CapacityExceeded`] when the slot is full or a
    /// conflict retry was exhausted.
    pub async fn reserve(
        &self,
        slot_id: SlotId,
        patient_id: PatientId,
    ) -> Result<Appointment, BookingError> {
        let slot = self.reserve_seat_with_retry(slot_id).await?;

        let appointment = Appointment::new(
            AppointmentId::new(),
            SlotSnapshot::from(&slot),
            patient_id,
            Utc::now(),
        );

        if let Err(err) = self.appointments.insert(appointment.clone()).await {
            // The seat was already taken; give it back before failing.
            if let Err(release_err) = self.slots.release_seat(slot_id).await {
                tracing::error!(
                    slot_id = %slot_id,
                    error = %release_err,
                    "Failed to release seat while compensating a failed insert"
                );
            }
            return Err(err.into());
        }

        tracing::info!(
            appointment_id = %appointment.id,
            slot_id = %slot_id,
            patient_id = %patient_id,
            booked = slot.booked,
            capacity = slot.capacity,
            "Appointment reserved"
        );

        self.notifier.publish(BookingEvent::AppointmentCreated {
            appointment_id: appointment.id,
            patient_id,
            doctor_id: slot.doctor_id,
            date: slot.date,
        });

        Ok(appointment)
    }

    /// Cancel an appointment and release its seat.
    ///
    /// Cancelling an already-cancelled appointment is a true no-op: the
    /// appointment is returned unchanged, the slot counter is not
    /// decremented a second time, and no event is emitted. Cancelling a
    /// completed appointment is rejected.
    ///
    /// # Errors
    ///
    /// [`BookingError::AppointmentNotFound`] for an unknown appointment,
    /// [`BookingError::InvalidState`] when the appointment is `Done`.
    pub async fn cancel(&self, appointment_id: AppointmentId) -> Result<Appointment, BookingError> {
        let change = self
            .appointments
            .set_status(appointment_id, AppointmentStatus::Cancelled)
            .await?;

        if change.previous != AppointmentStatus::Reserved {
            tracing::debug!(appointment_id = %appointment_id, "Repeat cancel ignored");
            return Ok(change.appointment);
        }

        let slot_id = change.appointment.slot.slot_id;
        match self.slots.release_seat(slot_id).await {
            Ok(slot) => {
                tracing::info!(
                    appointment_id = %appointment_id,
                    slot_id = %slot_id,
                    booked = slot.booked,
                    "Appointment cancelled"
                );
                self.notifier.publish(BookingEvent::AppointmentCancelled {
                    appointment_id,
                    patient_id: change.appointment.patient_id,
                    doctor_id: slot.doctor_id,
                });
            }
            // The slot may have been deleted since booking; the cancellation
            // stands, the counter has nothing to give back, and the doctor
            // reference for the event is unresolvable.
            Err(SlotStoreError::NotFound(_)) => {
                tracing::warn!(
                    appointment_id = %appointment_id,
                    slot_id = %slot_id,
                    "Cancelled appointment whose slot no longer exists; skipping seat release"
                );
            }
            Err(err) => {
                tracing::error!(
                    appointment_id = %appointment_id,
                    slot_id = %slot_id,
                    error = %err,
                    "Seat release failed after cancellation; counter may drift"
                );
            }
        }

        Ok(change.appointment)
    }

    /// Mark an appointment `Done` on consultation completion, recording the
    /// optional consultation output. No slot effect.
    ///
    /// Completing an already-completed appointment is an idempotent no-op
    /// (the outcome is still recorded).
    ///
    /// # Errors
    ///
    /// [`BookingError::AppointmentNotFound`] for an unknown appointment,
    /// [`BookingError::InvalidState`] when the appointment is `Cancelled`.
    pub async fn complete(
        &self,
        appointment_id: AppointmentId,
        outcome: ConsultationOutcome,
    ) -> Result<Appointment, BookingError> {
        let change = self
            .appointments
            .set_status(appointment_id, AppointmentStatus::Done)
            .await?;

        let appointment = if outcome.is_empty() {
            change.appointment
        } else {
            self.appointments
                .attach_consultation(appointment_id, outcome.note, outcome.document_ref)
                .await?
        };

        if change.previous == AppointmentStatus::Reserved {
            tracing::info!(appointment_id = %appointment_id, "Appointment completed");
            // Doctor reference comes from the slot's owner; with the slot
            // gone there is nobody to notify.
            match self.slots.get(appointment.slot.slot_id).await {
                Ok(slot) => self.notifier.publish(BookingEvent::AppointmentUpdated {
                    appointment_id,
                    patient_id: appointment.patient_id,
                    doctor_id: slot.doctor_id,
                    status: AppointmentStatus::Done,
                }),
                Err(err) => tracing::warn!(
                    appointment_id = %appointment_id,
                    error = %err,
                    "Completed appointment whose slot is unresolvable; skipping event"
                ),
            }
        }

        Ok(appointment)
    }

    /// One atomic seat grab with a single retry on an optimistic conflict.
    async fn reserve_seat_with_retry(&self, slot_id: SlotId) -> Result<Slot, BookingError> {
        match self.slots.reserve_seat(slot_id).await {
            Ok(slot) => Ok(slot),
            Err(SlotStoreError::Conflict(_)) => {
                tracing::debug!(slot_id = %slot_id, "Seat reservation conflict, retrying once");
                match self.slots.reserve_seat(slot_id).await {
                    Ok(slot) => Ok(slot),
                    // A second loss means the slot is contested to the point
                    // of exhaustion; surface it as a capacity decision, never
                    // silently over capacity.
                    Err(SlotStoreError::Conflict(_)) => {
                        let capacity = self
                            .slots
                            .get(slot_id)
                            .await
                            .map(|s| s.capacity)
                            .unwrap_or_default();
                        Err(BookingError::CapacityExceeded { slot_id, capacity })
                    }
                    Err(err) => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}
