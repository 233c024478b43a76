//! Slot store: availability windows and their booked counters.
//!
//! The `booked` counter is the only shared resource in the system that is
//! mutated from many concurrent callers. `reserve_seat` is therefore the
//! explicit conditional-update primitive (`booked ← booked + 1` only while
//! `booked < capacity`, applied atomically). The in-memory implementation
//! runs check and increment inside one write-lock acquisition, the same
//! shape as `UPDATE slot SET booked = booked + 1 WHERE id = ? AND booked <
//! capacity` against a relational store.

use crate::types::{DoctorId, Slot, SlotId};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// Errors surfaced by slot store implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotStoreError {
    /// Referenced slot does not exist
    #[error("slot {0} not found")]
    NotFound(SlotId),

    /// The slot was fully booked at decision time
    #[error("slot {slot_id} is fully booked (capacity {capacity})")]
    CapacityExceeded {
        /// The contested slot
        slot_id: SlotId,
        /// Its fixed capacity
        capacity: u32,
    },

    /// Optimistic implementations lost a concurrent update race; the caller
    /// may retry
    #[error("concurrent update conflict on slot {0}")]
    Conflict(SlotId),

    /// Slot definition rejected (capacity < 1 or end ≤ start)
    #[error("invalid slot definition: {0}")]
    Validation(String),
}

/// Persistence contract for availability slots.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Create a slot with `booked = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`SlotStoreError::Validation`] if `capacity < 1` or
    /// `end <= start`.
    async fn create(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        capacity: u32,
    ) -> Result<Slot, SlotStoreError>;

    /// Fetch a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`SlotStoreError::NotFound`] if absent.
    async fn get(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError>;

    /// Delete a slot. Appointments booked against it are untouched; they
    /// keep their snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SlotStoreError::NotFound`] if absent.
    async fn remove(&self, slot_id: SlotId) -> Result<(), SlotStoreError>;

    /// Slots for a doctor on a date with at least one free seat, ordered by
    /// start time ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn find_available(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotStoreError>;

    /// All slots for a doctor, ordered by date then start time ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    async fn list_for_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Slot>, SlotStoreError>;

    /// Atomically take one seat: succeeds only while `booked < capacity`.
    ///
    /// Two concurrent calls against the last seat must not both succeed.
    /// Returns the slot after the increment.
    ///
    /// # Errors
    ///
    /// [`SlotStoreError::NotFound`] if absent,
    /// [`SlotStoreError::CapacityExceeded`] when full, or
    /// [`SlotStoreError::Conflict`] from optimistic implementations that
    /// lost an update race and want the caller to retry.
    async fn reserve_seat(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError>;

    /// Atomically give one seat back, floored at 0.
    ///
    /// The floor defends against counter drift; it does not occur while the
    /// booked-count invariant holds. Returns the slot after the decrement.
    ///
    /// # Errors
    ///
    /// Returns [`SlotStoreError::NotFound`] if absent.
    async fn release_seat(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError>;
}

/// In-memory slot store backed by a `tokio` `RwLock`.
///
/// Every mutation runs under the write lock, so check-and-increment is a
/// single atomic step and readers never see an in-flight update.
#[derive(Debug, Default)]
pub struct InMemorySlotStore {
    slots: RwLock<HashMap<SlotId, Slot>>,
}

impl InMemorySlotStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotStore for InMemorySlotStore {
    async fn create(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        capacity: u32,
    ) -> Result<Slot, SlotStoreError> {
        if capacity < 1 {
            return Err(SlotStoreError::Validation(format!(
                "capacity must be at least 1, got {capacity}"
            )));
        }
        if end <= start {
            return Err(SlotStoreError::Validation(format!(
                "end time {end} must be after start time {start}"
            )));
        }

        let slot = Slot::new(SlotId::new(), doctor_id, date, start, end, capacity);
        self.slots.write().await.insert(slot.id, slot.clone());

        tracing::debug!(
            slot_id = %slot.id,
            doctor_id = %doctor_id,
            %date,
            capacity,
            "Slot created"
        );
        Ok(slot)
    }

    async fn get(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError> {
        self.slots
            .read()
            .await
            .get(&slot_id)
            .cloned()
            .ok_or(SlotStoreError::NotFound(slot_id))
    }

    async fn remove(&self, slot_id: SlotId) -> Result<(), SlotStoreError> {
        self.slots
            .write()
            .await
            .remove(&slot_id)
            .map(|_| ())
            .ok_or(SlotStoreError::NotFound(slot_id))
    }

    async fn find_available(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
    ) -> Result<Vec<Slot>, SlotStoreError> {
        let mut slots: Vec<Slot> = self
            .slots
            .read()
            .await
            .values()
            .filter(|s| s.doctor_id == doctor_id && s.date == date && s.has_availability())
            .cloned()
            .collect();
        slots.sort_by_key(|s| s.start);
        Ok(slots)
    }

    async fn list_for_doctor(&self, doctor_id: DoctorId) -> Result<Vec<Slot>, SlotStoreError> {
        let mut slots: Vec<Slot> = self
            .slots
            .read()
            .await
            .values()
            .filter(|s| s.doctor_id == doctor_id)
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.date, s.start));
        Ok(slots)
    }

    async fn reserve_seat(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&slot_id)
            .ok_or(SlotStoreError::NotFound(slot_id))?;

        if !slot.has_availability() {
            return Err(SlotStoreError::CapacityExceeded {
                slot_id,
                capacity: slot.capacity,
            });
        }

        slot.booked += 1;
        tracing::debug!(
            slot_id = %slot_id,
            booked = slot.booked,
            capacity = slot.capacity,
            "Seat reserved"
        );
        Ok(slot.clone())
    }

    async fn release_seat(&self, slot_id: SlotId) -> Result<Slot, SlotStoreError> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&slot_id)
            .ok_or(SlotStoreError::NotFound(slot_id))?;

        if slot.booked == 0 {
            tracing::warn!(slot_id = %slot_id, "release_seat on empty slot; counter drift");
        }
        slot.booked = slot.booked.saturating_sub(1);

        tracing::debug!(
            slot_id = %slot_id,
            booked = slot.booked,
            capacity = slot.capacity,
            "Seat released"
        );
        Ok(slot.clone())
    }
}
