//! Slot management endpoints (the doctor-facing surface).
//!
//! - `POST /api/slots` - open an availability slot
//! - `DELETE /api/slots/:id` - remove a slot
//! - `GET /api/doctors/:id/slots` - full schedule for a doctor
//! - `GET /api/doctors/:id/slots/available?date=` - bookable slots on a date

use super::error::ApiError;
use crate::projections::SlotView;
use crate::server::AppState;
use crate::types::{DoctorId, Slot, SlotId};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for opening a slot.
#[derive(Debug, Deserialize)]
pub struct CreateSlotRequest {
    /// Owning doctor
    pub doctor_id: Uuid,
    /// Calendar date
    pub date: NaiveDate,
    /// Window start time
    pub start: NaiveTime,
    /// Window end time
    pub end: NaiveTime,
    /// Seats in the window (≥ 1)
    pub capacity: u32,
}

/// Slot as returned by the write-side endpoints.
#[derive(Debug, Serialize)]
pub struct SlotResponse {
    /// Slot identifier
    pub id: SlotId,
    /// Owning doctor
    pub doctor_id: DoctorId,
    /// Calendar date
    pub date: NaiveDate,
    /// Window start time
    pub start: NaiveTime,
    /// Window end time
    pub end: NaiveTime,
    /// Fixed capacity
    pub capacity: u32,
    /// Currently booked
    pub booked: u32,
}

impl From<Slot> for SlotResponse {
    fn from(slot: Slot) -> Self {
        Self {
            id: slot.id,
            doctor_id: slot.doctor_id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            capacity: slot.capacity,
            booked: slot.booked,
        }
    }
}

/// Open a new availability slot.
pub async fn create_slot(
    State(state): State<AppState>,
    Json(request): Json<CreateSlotRequest>,
) -> Result<(StatusCode, Json<SlotResponse>), ApiError> {
    let slot = state
        .coordinator
        .open_slot(
            DoctorId::from_uuid(request.doctor_id),
            request.date,
            request.start,
            request.end,
            request.capacity,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(slot.into())))
}

/// Remove an availability slot.
pub async fn delete_slot(
    Path(slot_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    state
        .coordinator
        .close_slot(SlotId::from_uuid(slot_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Full schedule for a doctor, full slots included.
pub async fn doctor_schedule(
    Path(doctor_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SlotView>>, ApiError> {
    let slots = state
        .queries
        .doctor_schedule(DoctorId::from_uuid(doctor_id))
        .await?;
    Ok(Json(slots))
}

/// Query parameters for the availability lookup.
#[derive(Debug, Deserialize)]
pub struct AvailableSlotsQuery {
    /// Date to look up, `YYYY-MM-DD`
    pub date: NaiveDate,
}

/// Bookable slots for a doctor on a date.
pub async fn available_slots(
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailableSlotsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<SlotView>>, ApiError> {
    let slots = state
        .queries
        .available_slots(DoctorId::from_uuid(doctor_id), query.date)
        .await?;
    Ok(Json(slots))
}
