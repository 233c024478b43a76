//! Write-side stores for slots and appointments.
//!
//! Each store is a trait seam with an in-memory implementation. The slot
//! store owns the race-sensitive `booked` counter; the appointment store
//! owns the status lifecycle. Both apply their mutations atomically under a
//! single lock acquisition, so readers only ever observe committed state.

pub mod appointment;
pub mod slot;

pub use appointment::{
    AppointmentStore, AppointmentStoreError, InMemoryAppointmentStore, StatusChange,
};
pub use slot::{InMemorySlotStore, SlotStore, SlotStoreError};
