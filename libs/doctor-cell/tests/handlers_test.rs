use axum::extract::{Extension, Json, Path, State};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use doctor_cell::handlers::{
    complete_profile, create_specialty, delete_specialty, list_doctors, list_specialties,
};
use doctor_cell::models::{CompleteDoctorProfileRequest, SpecialtyRequest};
use shared_models::error::AppError;
use shared_utils::test_utils::{MockStoreRows, TestConfig, TestUser};

#[tokio::test]
async fn complete_profile_requires_a_specialty() {
    let config = TestConfig::default().to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    let result = complete_profile(
        State(config),
        Extension(doctor.to_user()),
        Json(CompleteDoctorProfileRequest {
            license_number: "MED-2024".to_string(),
            phone: "2299-0011".to_string(),
            specialty_ids: vec![],
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.0.iter().any(|e| e.field == "specialty_ids"));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn complete_profile_inserts_and_links_specialties() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor = TestUser::doctor("doc@example.com");
    let specialty_id = Uuid::new_v4();

    // No other doctor holds the license.
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("license_number", "eq.MED-2024"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("id", format!("eq.{}", specialty_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": specialty_id }
        ])))
        .mount(&store)
        .await;
    // No existing profile row.
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("user_id", format!("eq.{}", doctor.id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockStoreRows::doctor_row(doctor.id)
        ])))
        .mount(&store)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/doctor_specialties"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&store)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/doctor_specialties"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            { "doctor_id": doctor.id, "specialty_id": specialty_id }
        ])))
        .mount(&store)
        .await;

    let result = complete_profile(
        State(config),
        Extension(doctor.to_user()),
        Json(CompleteDoctorProfileRequest {
            license_number: "MED-2024".to_string(),
            phone: "2299-0011".to_string(),
            specialty_ids: vec![specialty_id],
        }),
    )
    .await;

    let body = result.expect("profile completion should succeed").0;
    assert_eq!(body["profile"]["license_number"], json!("MED-2024"));
}

#[tokio::test]
async fn list_doctors_embeds_names_and_specialties() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let doctor_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "user_id": doctor_id,
            "license_number": "MED-2024",
            "phone": "2299-0011",
            "users": { "first_name": "Luisa", "last_name": "Campos" },
            "specialties": [ { "id": Uuid::new_v4(), "name": "Cardiology" } ]
        }])))
        .mount(&store)
        .await;

    let patient = TestUser::patient("pat@example.com");
    let body = list_doctors(State(config), Extension(patient.to_user()))
        .await
        .expect("listing should succeed")
        .0;

    assert_eq!(body["total"], json!(1));
    assert_eq!(body["doctors"][0]["users"]["first_name"], json!("Luisa"));
    assert_eq!(body["doctors"][0]["specialties"][0]["name"], json!("Cardiology"));
}

#[tokio::test]
async fn create_specialty_rejects_case_insensitive_duplicate() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let admin = TestUser::admin("admin@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .and(query_param("name", "ilike.cardiology"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "Cardiology" }
        ])))
        .mount(&store)
        .await;

    let result = create_specialty(
        State(config),
        Extension(admin.to_user()),
        Json(SpecialtyRequest {
            name: "cardiology".to_string(),
        }),
    )
    .await;

    match result.unwrap_err() {
        AppError::Validation(errors) => {
            assert!(errors.0.iter().any(|e| e.field == "name"));
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn create_specialty_is_admin_only() {
    let config = TestConfig::default().to_arc();
    let doctor = TestUser::doctor("doc@example.com");

    let result = create_specialty(
        State(config),
        Extension(doctor.to_user()),
        Json(SpecialtyRequest {
            name: "Dermatology".to_string(),
        }),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::Forbidden { .. }));
}

#[tokio::test]
async fn any_role_may_list_specialties() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "Cardiology" },
            { "id": Uuid::new_v4(), "name": "Dermatology" }
        ])))
        .mount(&store)
        .await;

    let patient = TestUser::patient("pat@example.com");
    let body = list_specialties(State(config), Extension(patient.to_user()))
        .await
        .expect("listing should succeed")
        .0;

    assert_eq!(body["specialties"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_missing_specialty_is_not_found() {
    let store = MockServer::start().await;
    let config = TestConfig::with_store_url(&store.uri()).to_arc();
    let admin = TestUser::admin("admin@example.com");

    Mock::given(method("GET"))
        .and(path("/rest/v1/specialties"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&store)
        .await;

    let result = delete_specialty(
        State(config),
        Extension(admin.to_user()),
        Path(Uuid::new_v4()),
    )
    .await;

    assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
}
