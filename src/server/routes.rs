//! Router configuration for the booking service.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{appointments, slots};
use axum::{
    routing::{delete, get, patch, post},
    Router,
};

/// Build the complete Axum router.
///
/// Configures health checks plus the slot-management and appointment
/// endpoints under `/api`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Slot management (doctor surface)
        .route("/slots", post(slots::create_slot))
        .route("/slots/:id", delete(slots::delete_slot))
        .route("/doctors/:id/slots", get(slots::doctor_schedule))
        .route("/doctors/:id/slots/available", get(slots::available_slots))
        // Appointment lifecycle
        .route("/appointments", post(appointments::reserve))
        .route("/appointments/:id", delete(appointments::cancel))
        .route("/appointments/:id/complete", patch(appointments::complete))
        // Read projections
        .route("/patients/:id/appointments", get(appointments::by_patient))
        .route("/doctors/:id/appointments", get(appointments::by_doctor));

    Router::new()
        // Health checks (no authentication)
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .with_state(state)
}
