//! HTTP API round-trip test against a spawned server.
//!
//! Run with: `cargo test --test http_api_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use clinic_booking::booking::BookingCoordinator;
use clinic_booking::notifier::{ChannelNotifier, LogNotificationHandler, NotificationConsumer};
use clinic_booking::projections::{BookingQueries, InMemoryProfileDirectory};
use clinic_booking::server::{build_router, AppState};
use clinic_booking::stores::{InMemoryAppointmentStore, InMemorySlotStore};
use clinic_booking::types::{DoctorId, PatientId};
use serde_json::{json, Value};
use std::sync::Arc;

/// Spawn the full router on an ephemeral port; returns the base URL and the
/// seeded doctor/patient ids.
async fn spawn_server() -> (String, DoctorId, PatientId) {
    let slots = Arc::new(InMemorySlotStore::new());
    let appointments = Arc::new(InMemoryAppointmentStore::new());
    let (notifier, events_rx) = ChannelNotifier::new(64);
    tokio::spawn(
        NotificationConsumer::new(events_rx, vec![Arc::new(LogNotificationHandler)]).run(),
    );

    let coordinator = Arc::new(BookingCoordinator::new(
        slots.clone(),
        appointments.clone(),
        Arc::new(notifier),
    ));

    let directory = Arc::new(InMemoryProfileDirectory::new());
    let doctor = DoctorId::new();
    let patient = PatientId::new();
    directory.register_doctor(doctor, "Dr. Leila Haddad").await;
    directory.register_patient(patient, "Jonas Richter").await;

    let queries = Arc::new(BookingQueries::new(slots, appointments, directory));
    let router = build_router(AppState::new(coordinator, queries));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{addr}"), doctor, patient)
}

#[tokio::test]
async fn full_booking_round_trip_over_http() {
    let (base, doctor, patient) = spawn_server().await;
    let client = reqwest::Client::new();

    // Liveness
    let health: Value = client
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    // Doctor opens a slot
    let response = client
        .post(format!("{base}/api/slots"))
        .json(&json!({
            "doctor_id": doctor.as_uuid(),
            "date": "2026-10-05",
            "start": "09:00:00",
            "end": "09:30:00",
            "capacity": 2
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let slot: Value = response.json().await.unwrap();
    let slot_id = slot["id"].as_str().unwrap().to_string();
    assert_eq!(slot["booked"], 0);

    // The slot shows up as available
    let available: Value = client
        .get(format!(
            "{base}/api/doctors/{doctor}/slots/available?date=2026-10-05"
        ))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(available.as_array().unwrap().len(), 1);
    assert_eq!(available[0]["available"], 2);
    assert_eq!(available[0]["doctor_name"], "Dr. Leila Haddad");

    // Patient reserves
    let response = client
        .post(format!("{base}/api/appointments"))
        .json(&json!({ "slot_id": slot_id, "patient_id": patient.as_uuid() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let appointment: Value = response.json().await.unwrap();
    let appointment_id = appointment["id"].as_str().unwrap().to_string();
    assert_eq!(appointment["status"], "Reserved");

    // Patient view is enriched with both display names
    let mine: Value = client
        .get(format!("{base}/api/patients/{patient}/appointments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["patient_name"], "Jonas Richter");
    assert_eq!(mine[0]["doctor_name"], "Dr. Leila Haddad");

    // Doctor completes the consultation
    let response = client
        .patch(format!("{base}/api/appointments/{appointment_id}/complete"))
        .json(&json!({ "note": "all clear" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let done: Value = response.json().await.unwrap();
    assert_eq!(done["status"], "Done");
    assert_eq!(done["note"], "all clear");

    // Cancelling a completed appointment is a conflict
    let response = client
        .delete(format!("{base}/api/appointments/{appointment_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn doctor_routes_serve_schedule_and_appointments() {
    let (base, doctor, patient) = spawn_server().await;
    let client = reqwest::Client::new();

    // Two slots, created out of calendar order.
    for (date, start, end) in [
        ("2026-10-07", "10:00:00", "10:30:00"),
        ("2026-10-06", "09:00:00", "09:30:00"),
    ] {
        let response = client
            .post(format!("{base}/api/slots"))
            .json(&json!({
                "doctor_id": doctor.as_uuid(),
                "date": date,
                "start": start,
                "end": end,
                "capacity": 1
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
    }

    let schedule: Value = client
        .get(format!("{base}/api/doctors/{doctor}/slots"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let schedule = schedule.as_array().unwrap();
    assert_eq!(schedule.len(), 2);
    assert_eq!(schedule[0]["date"], "2026-10-06");
    assert_eq!(schedule[1]["date"], "2026-10-07");

    // Book the earlier slot; it shows up on the doctor's appointment list.
    let slot_id = schedule[0]["id"].as_str().unwrap();
    let response = client
        .post(format!("{base}/api/appointments"))
        .json(&json!({ "slot_id": slot_id, "patient_id": patient.as_uuid() }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let mine: Value = client
        .get(format!("{base}/api/doctors/{doctor}/appointments"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mine = mine.as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["date"], "2026-10-06");
    assert_eq!(mine[0]["doctor_name"], "Dr. Leila Haddad");
    assert_eq!(mine[0]["patient_name"], "Jonas Richter");
}

#[tokio::test]
async fn http_error_mapping() {
    let (base, doctor, patient) = spawn_server().await;
    let client = reqwest::Client::new();

    // Unknown slot → 404
    let response = client
        .post(format!("{base}/api/appointments"))
        .json(&json!({
            "slot_id": uuid::Uuid::new_v4(),
            "patient_id": patient.as_uuid()
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // Zero capacity → 422
    let response = client
        .post(format!("{base}/api/slots"))
        .json(&json!({
            "doctor_id": doctor.as_uuid(),
            "date": "2026-10-05",
            "start": "09:00:00",
            "end": "09:30:00",
            "capacity": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    // Full slot → 409 with the capacity code
    let slot: Value = client
        .post(format!("{base}/api/slots"))
        .json(&json!({
            "doctor_id": doctor.as_uuid(),
            "date": "2026-10-06",
            "start": "10:00:00",
            "end": "10:30:00",
            "capacity": 1
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let slot_id = slot["id"].as_str().unwrap().to_string();

    let first = client
        .post(format!("{base}/api/appointments"))
        .json(&json!({ "slot_id": slot_id, "patient_id": patient.as_uuid() }))
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = client
        .post(format!("{base}/api/appointments"))
        .json(&json!({ "slot_id": slot_id, "patient_id": PatientId::new().as_uuid() }))
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["code"], "CAPACITY_EXCEEDED");
}
