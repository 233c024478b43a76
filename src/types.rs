//! Domain types for the clinic booking service.
//!
//! Value objects and entities shared by the stores, the booking coordinator,
//! and the read side: identifiers, availability slots, appointments, and the
//! one-way appointment status machine.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for an availability slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(Uuid);

impl SlotId {
    /// Creates a new random `SlotId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `SlotId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an appointment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(Uuid);

impl AppointmentId {
    /// Creates a new random `AppointmentId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an `AppointmentId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a doctor (owned by the external identity store)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoctorId(Uuid);

impl DoctorId {
    /// Creates a new random `DoctorId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `DoctorId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DoctorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DoctorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a patient (owned by the external identity store)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PatientId(Uuid);

impl PatientId {
    /// Creates a new random `PatientId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `PatientId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Slot
// ============================================================================

/// A bookable time window for a doctor with finite capacity.
///
/// `booked` counts the live (non-cancelled) appointments against this slot
/// and must never exceed `capacity`, including under concurrent updates.
/// Times are wall-clock in the doctor's locale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Unique slot identifier
    pub id: SlotId,
    /// Doctor owning this slot
    pub doctor_id: DoctorId,
    /// Calendar date of the window
    pub date: NaiveDate,
    /// Window start time
    pub start: NaiveTime,
    /// Window end time
    pub end: NaiveTime,
    /// Maximum number of appointments (≥ 1)
    pub capacity: u32,
    /// Currently booked appointments
    pub booked: u32,
}

impl Slot {
    /// Creates a new `Slot` with no bookings
    #[must_use]
    pub const fn new(
        id: SlotId,
        doctor_id: DoctorId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            doctor_id,
            date,
            start,
            end,
            capacity,
            booked: 0,
        }
    }

    /// Remaining seats in this slot
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.capacity.saturating_sub(self.booked)
    }

    /// Whether at least one more appointment fits
    #[must_use]
    pub const fn has_availability(&self) -> bool {
        self.booked < self.capacity
    }
}

/// Immutable copy of a slot's display data, stamped onto an appointment at
/// booking time.
///
/// Slots can be deleted while their appointments live on, so appointments
/// carry their own date and times instead of joining back to the slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSnapshot {
    /// The slot this appointment was booked against
    pub slot_id: SlotId,
    /// Date copied from the slot at booking time
    pub date: NaiveDate,
    /// Start time copied from the slot at booking time
    pub start: NaiveTime,
    /// End time copied from the slot at booking time
    pub end: NaiveTime,
}

impl From<&Slot> for SlotSnapshot {
    fn from(slot: &Slot) -> Self {
        Self {
            slot_id: slot.id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
        }
    }
}

// ============================================================================
// Appointment
// ============================================================================

/// Appointment status, a one-way state machine.
///
/// `Reserved` may move to `Done` (consultation completed) or `Cancelled`;
/// both are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    /// Seat taken, consultation pending
    Reserved,
    /// Consultation completed (terminal)
    Done,
    /// Reservation cancelled (terminal)
    Cancelled,
}

impl AppointmentStatus {
    /// Whether the transition `self` → `to` is legal.
    ///
    /// Only `Reserved → Done` and `Reserved → Cancelled` are; nothing leaves
    /// a terminal status.
    #[must_use]
    pub const fn can_transition_to(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Reserved, Self::Done) | (Self::Reserved, Self::Cancelled)
        )
    }

    /// Whether this status still holds a seat on its slot
    #[must_use]
    pub const fn holds_seat(self) -> bool {
        matches!(self, Self::Reserved | Self::Done)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "reserved"),
            Self::Done => write!(f, "done"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A patient's reservation against one slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique appointment identifier
    pub id: AppointmentId,
    /// Immutable snapshot of the booked slot
    pub slot: SlotSnapshot,
    /// Patient holding the reservation
    pub patient_id: PatientId,
    /// Current lifecycle status
    pub status: AppointmentStatus,
    /// Free-text consultation note, written on completion
    pub note: Option<String>,
    /// Reference to an attached document (prescription, certificate)
    pub document_ref: Option<String>,
    /// When the reservation was made
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// Creates a new `Appointment` in `Reserved` status
    #[must_use]
    pub const fn new(
        id: AppointmentId,
        slot: SlotSnapshot,
        patient_id: PatientId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slot,
            patient_id,
            status: AppointmentStatus::Reserved,
            note: None,
            document_ref: None,
            created_at,
        }
    }
}

/// Consultation record attached when an appointment is completed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultationOutcome {
    /// Free-text note from the doctor
    pub note: Option<String>,
    /// Reference to a generated document
    pub document_ref: Option<String>,
}

impl ConsultationOutcome {
    /// True when there is nothing to record
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.note.is_none() && self.document_ref.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn status_machine_is_one_way() {
        use AppointmentStatus::{Cancelled, Done, Reserved};

        assert!(Reserved.can_transition_to(Done));
        assert!(Reserved.can_transition_to(Cancelled));
        assert!(!Done.can_transition_to(Cancelled));
        assert!(!Done.can_transition_to(Reserved));
        assert!(!Cancelled.can_transition_to(Done));
        assert!(!Cancelled.can_transition_to(Reserved));
    }

    #[test]
    fn remaining_saturates_on_drift() {
        let mut slot = Slot::new(
            SlotId::new(),
            DoctorId::new(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            2,
        );
        slot.booked = 3;
        assert_eq!(slot.remaining(), 0);
        assert!(!slot.has_availability());
    }

    #[test]
    fn snapshot_copies_slot_window() {
        let slot = Slot::new(
            SlotId::new(),
            DoctorId::new(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            1,
        );
        let snapshot = SlotSnapshot::from(&slot);
        assert_eq!(snapshot.slot_id, slot.id);
        assert_eq!(snapshot.date, slot.date);
        assert_eq!(snapshot.start, slot.start);
        assert_eq!(snapshot.end, slot.end);
    }
}
