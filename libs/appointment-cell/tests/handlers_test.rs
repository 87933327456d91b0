use axum::extract::{Extension, Json, Path, State};
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::handlers::{
    agenda, create_appointment, delete_appointment, list_appointments, patient_roster,
    update_appointment, update_status,
};
use appointment_cell::models::{
    CreateAppointmentRequest, UpdateAppointmentRequest, UpdateStatusRequest,
};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreRows, TestConfig, TestUser};

fn booking_request(doctor_id: Uuid) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        doctor_id,
        scheduled_at: Utc::now() + Duration::days(3),
        reason: "Persistent headache".to_string(),
    }
}

#[tokio::test]
async fn booking_succeeds_for_patient_with_complete_profile() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("user_id", format!("eq.{}", patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::patient_row(patient.id)
        ])))
        .mount(&store)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("user_id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "user_id": doctor_id }
        ])))
        .mount(&store)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::appointment_row(
                patient.id,
                doctor_id,
                "2025-06-01T10:00:00Z",
                "pending",
            )
        ])))
        .mount(&store)
        .await;

    let result = create_appointment(
        State(config),
        Extension(patient.to_user()),
        Json(booking_request(doctor_id)),
    )
    .await;

    let (status, body) = result.expect("booking should succeed");
    assert_eq!(status, axum::http::StatusCode::CREATED);
    assert_eq!(body.0["appointment"]["status"], json!("pending"));
    assert_eq!(body.0["appointment"]["version"], json!(1));
}

#[tokio::test]
async fn booking_rejects_past_date_without_touching_store() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    let mut request = booking_request(Uuid::new_v4());
    request.scheduled_at = Utc::now() - Duration::hours(1);

    let result = create_appointment(
        State(config),
        Extension(patient.to_user()),
        Json(request),
    )
    .await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.0.iter().any(|e| e.field == "scheduled_at"));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
    assert!(store.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn booking_requires_completed_profile() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let result = create_appointment(
        State(config),
        Extension(patient.to_user()),
        Json(booking_request(Uuid::new_v4())),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::BadRequest(_)));
}

#[tokio::test]
async fn booking_rejects_unknown_doctor() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::patient_row(patient.id)
        ])))
        .mount(&store)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let result = create_appointment(
        State(config),
        Extension(patient.to_user()),
        Json(booking_request(Uuid::new_v4())),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}

#[tokio::test]
async fn listing_is_scoped_to_the_calling_patient() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", format!("eq.{}", patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::appointment_row(
                patient.id,
                Uuid::new_v4(),
                "2025-06-01T10:00:00Z",
                "pending",
            )
        ])))
        .mount(&store)
        .await;

    let body = list_appointments(State(config), Extension(patient.to_user()))
        .await
        .expect("listing should succeed")
        .0;

    assert_eq!(body["total"], json!(1));
}

#[tokio::test]
async fn patient_reschedules_own_appointment() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    let mut row = MockStoreRows::appointment_row(
        patient.id,
        Uuid::new_v4(),
        "2025-06-01T10:00:00Z",
        "pending",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();
    row["reason"] = json!("Follow-up after treatment");

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .and(query_param("patient_id", format!("eq.{}", patient.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;

    let body = update_appointment(
        State(config),
        Extension(patient.to_user()),
        Path(appointment_id),
        Json(UpdateAppointmentRequest {
            scheduled_at: Utc::now() + Duration::days(5),
            reason: "Follow-up after treatment".to_string(),
        }),
    )
    .await
    .expect("reschedule should succeed")
    .0;

    assert_eq!(body["appointment"]["reason"], json!("Follow-up after treatment"));
}

#[tokio::test]
async fn rescheduling_someone_elses_appointment_is_not_found() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    // The owner filter matches no row for this caller.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let result = update_appointment(
        State(config),
        Extension(patient.to_user()),
        Path(Uuid::new_v4()),
        Json(UpdateAppointmentRequest {
            scheduled_at: Utc::now() + Duration::days(5),
            reason: "Follow-up after treatment".to_string(),
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}

#[tokio::test]
async fn rescheduling_into_the_past_is_rejected() {
    let config = TestConfig::default().to_arc();
    let patient = TestUser::patient("pat@example.com");

    let result = update_appointment(
        State(config),
        Extension(patient.to_user()),
        Path(Uuid::new_v4()),
        Json(UpdateAppointmentRequest {
            scheduled_at: Utc::now() - Duration::days(1),
            reason: "Follow-up after treatment".to_string(),
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.0.iter().any(|e| e.field == "scheduled_at"));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn roster_lists_distinct_patients_of_the_doctor() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    // Two appointments with the same patient collapse to one roster entry.
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "patient_id": first },
            { "patient_id": first },
            { "patient_id": second },
        ])))
        .mount(&store)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("user_id", format!("in.({},{})", first, second)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::patient_row(first),
            MockStoreRows::patient_row(second),
        ])))
        .mount(&store)
        .await;

    let body = patient_roster(State(config), Extension(doctor.to_user()))
        .await
        .expect("roster should succeed")
        .0;

    assert_eq!(body["total"], json!(2));
}

#[tokio::test]
async fn roster_is_denied_for_patients() {
    let config = TestConfig::default().to_arc();
    let patient = TestUser::patient("pat@example.com");

    let result = patient_roster(State(config), Extension(patient.to_user())).await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
}

#[tokio::test]
async fn agenda_groups_appointments_by_day() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockStoreRows::appointment_row(
                Uuid::new_v4(), doctor.id, "2025-06-01T10:00:00Z", "pending"),
            MockStoreRows::appointment_row(
                Uuid::new_v4(), doctor.id, "2025-06-01T14:00:00Z", "confirmed"),
            MockStoreRows::appointment_row(
                Uuid::new_v4(), doctor.id, "2025-06-02T09:00:00Z", "pending"),
        ])))
        .mount(&store)
        .await;

    let body = agenda(State(config), Extension(doctor.to_user()))
        .await
        .expect("agenda should succeed")
        .0;

    let days = body["agenda"].as_array().unwrap();
    assert_eq!(days.len(), 2);
    assert_eq!(days[0]["day"], json!("2025-06-01"));
    assert_eq!(days[0]["appointments"].as_array().unwrap().len(), 2);
    assert_eq!(days[1]["day"], json!("2025-06-02"));
    assert_eq!(days[1]["appointments"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn status_update_by_owning_doctor_bumps_version() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    let mut row = MockStoreRows::appointment_row(
        Uuid::new_v4(),
        doctor.id,
        "2025-06-01T10:00:00Z",
        "pending",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row.clone()])))
        .mount(&store)
        .await;

    row["status"] = json!("confirmed");
    row["version"] = json!(2);
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .and(query_param("version", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;

    let body = update_status(
        State(config),
        Extension(doctor.to_user()),
        Path(appointment_id),
        Json(UpdateStatusRequest {
            status: "confirmed".to_string(),
            expected_version: 1,
        }),
    )
    .await
    .expect("status update should succeed")
    .0;

    assert_eq!(body["new_status"], json!("confirmed"));
    assert_eq!(body["appointment_id"], json!(appointment_id));
}

#[tokio::test]
async fn stale_version_yields_conflict() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    let row = MockStoreRows::appointment_row(
        Uuid::new_v4(),
        doctor.id,
        "2025-06-01T10:00:00Z",
        "pending",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;
    // No row carries the stale version anymore.
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let result = update_status(
        State(config),
        Extension(doctor.to_user()),
        Path(appointment_id),
        Json(UpdateStatusRequest {
            status: "confirmed".to_string(),
            expected_version: 7,
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Conflict(_)));
}

#[tokio::test]
async fn unrelated_doctor_cannot_update_status() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    let row = MockStoreRows::appointment_row(
        Uuid::new_v4(),
        Uuid::new_v4(),
        "2025-06-01T10:00:00Z",
        "pending",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;

    let result = update_status(
        State(config),
        Extension(doctor.to_user()),
        Path(appointment_id),
        Json(UpdateStatusRequest {
            status: "cancelled".to_string(),
            expected_version: 1,
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
}

#[tokio::test]
async fn unknown_status_label_is_a_validation_error() {
    let config = TestConfig::default().to_arc();
    let admin = TestUser::admin("admin@example.com");

    let result = update_status(
        State(config),
        Extension(admin.to_user()),
        Path(Uuid::new_v4()),
        Json(UpdateStatusRequest {
            status: "rescheduled".to_string(),
            expected_version: 1,
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.0.iter().any(|e| e.field == "status"));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn patient_cannot_delete_completed_appointment() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    let row = MockStoreRows::appointment_row(
        patient.id,
        Uuid::new_v4(),
        "2025-06-01T10:00:00Z",
        "completed",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;

    let result = delete_appointment(
        State(config),
        Extension(patient.to_user()),
        Path(appointment_id),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
}

#[tokio::test]
async fn patient_deletes_own_pending_appointment() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    let row = MockStoreRows::appointment_row(
        patient.id,
        Uuid::new_v4(),
        "2025-06-01T10:00:00Z",
        "pending",
    );
    let appointment_id: Uuid = serde_json::from_value(row["id"].clone()).unwrap();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([row])))
        .mount(&store)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&store)
        .await;

    let body = delete_appointment(
        State(config),
        Extension(patient.to_user()),
        Path(appointment_id),
    )
    .await
    .expect("deletion should succeed")
    .0;

    assert_eq!(body["success"], json!(true));
}
