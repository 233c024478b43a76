//! Appointment lifecycle endpoints.
//!
//! - `POST /api/appointments` - reserve a seat in a slot
//! - `DELETE /api/appointments/:id` - cancel a reservation
//! - `PATCH /api/appointments/:id/complete` - mark a consultation done
//! - `GET /api/patients/:id/appointments` - patient view
//! - `GET /api/doctors/:id/appointments` - doctor view (via slot ownership)

use super::error::ApiError;
use crate::projections::AppointmentView;
use crate::server::AppState;
use crate::types::{
    Appointment, AppointmentId, AppointmentStatus, ConsultationOutcome, DoctorId, PatientId,
    SlotId,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request body for reserving a slot.
#[derive(Debug, Deserialize)]
pub struct ReserveRequest {
    /// Slot to book
    pub slot_id: Uuid,
    /// Patient making the reservation
    pub patient_id: Uuid,
}

/// Request body for completing a consultation.
#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    /// Free-text consultation note
    #[serde(default)]
    pub note: Option<String>,
    /// Reference to a generated document
    #[serde(default)]
    pub document_ref: Option<String>,
}

/// Appointment as returned by the write-side endpoints.
#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    /// Appointment identifier
    pub id: AppointmentId,
    /// Slot the appointment was booked against
    pub slot_id: SlotId,
    /// Snapshot date
    pub date: NaiveDate,
    /// Snapshot start time
    pub start: NaiveTime,
    /// Snapshot end time
    pub end: NaiveTime,
    /// Patient holding the reservation
    pub patient_id: PatientId,
    /// Lifecycle status
    pub status: AppointmentStatus,
    /// Consultation note
    pub note: Option<String>,
    /// Attached document reference
    pub document_ref: Option<String>,
    /// Reservation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            slot_id: appointment.slot.slot_id,
            date: appointment.slot.date,
            start: appointment.slot.start,
            end: appointment.slot.end,
            patient_id: appointment.patient_id,
            status: appointment.status,
            note: appointment.note,
            document_ref: appointment.document_ref,
            created_at: appointment.created_at,
        }
    }
}

/// Reserve a seat in a slot.
pub async fn reserve(
    State(state): State<AppState>,
    Json(request): Json<ReserveRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    let appointment = state
        .coordinator
        .reserve(
            SlotId::from_uuid(request.slot_id),
            PatientId::from_uuid(request.patient_id),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// Cancel a reservation. Repeat cancels are accepted as no-ops; cancelling a
/// completed appointment is a conflict.
pub async fn cancel(
    Path(appointment_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let appointment = state
        .coordinator
        .cancel(AppointmentId::from_uuid(appointment_id))
        .await?;
    Ok(Json(appointment.into()))
}

/// Mark a consultation as completed, optionally recording its output.
pub async fn complete(
    Path(appointment_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CompleteRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let outcome = ConsultationOutcome {
        note: request.note,
        document_ref: request.document_ref,
    };
    let appointment = state
        .coordinator
        .complete(AppointmentId::from_uuid(appointment_id), outcome)
        .await?;
    Ok(Json(appointment.into()))
}

/// A patient's appointments, enriched with display names.
pub async fn by_patient(
    Path(patient_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let views = state
        .queries
        .appointments_for_patient(PatientId::from_uuid(patient_id))
        .await?;
    Ok(Json(views))
}

/// A doctor's appointments, found via slot ownership.
pub async fn by_doctor(
    Path(doctor_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentView>>, ApiError> {
    let views = state
        .queries
        .appointments_for_doctor(DoctorId::from_uuid(doctor_id))
        .await?;
    Ok(Json(views))
}
