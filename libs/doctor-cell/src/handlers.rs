use std::sync::Arc;

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::authz::RolePolicy;

use crate::models::{CompleteDoctorProfileRequest, DoctorError, SpecialtyRequest};
use crate::services::{DoctorService, SpecialtyService};

fn map_doctor_error(error: DoctorError) -> AppError {
    match error {
        DoctorError::NotFound => AppError::NotFound("Doctor profile not found".to_string()),
        DoctorError::SpecialtyNotFound => AppError::NotFound("Specialty not found".to_string()),
        DoctorError::Validation(errors) => AppError::Validation(errors),
        DoctorError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Profile completion for the logged-in doctor, including the specialty
/// set they practice.
#[axum::debug_handler]
pub async fn complete_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteDoctorProfileRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::DOCTOR_ONLY.authorize(Some(&user))?;

    let service = DoctorService::new(&config);
    let profile = service
        .complete_profile(user.id, request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({
        "success": true,
        "profile": profile,
        "message": "Profile saved."
    })))
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::DOCTOR_ONLY.authorize(Some(&user))?;

    let service = DoctorService::new(&config);
    let doctor = service.get_doctor(user.id).await.map_err(map_doctor_error)?;

    Ok(Json(json!(doctor)))
}

/// Directory of doctors with names and specialties, used when booking.
#[axum::debug_handler]
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::PATIENT_OR_ADMIN.authorize(Some(&user))?;

    let service = DoctorService::new(&config);
    let doctors = service.list_doctors().await.map_err(map_doctor_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn create_specialty(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    RolePolicy::ADMIN_ONLY.authorize(Some(&user))?;

    let service = SpecialtyService::new(&config);
    let specialty = service.create(request).await.map_err(map_doctor_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "specialty": specialty })),
    ))
}

#[axum::debug_handler]
pub async fn list_specialties(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::ANY_ROLE.authorize(Some(&user))?;

    let service = SpecialtyService::new(&config);
    let specialties = service.list().await.map_err(map_doctor_error)?;

    Ok(Json(json!({ "specialties": specialties })))
}

#[axum::debug_handler]
pub async fn rename_specialty(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(specialty_id): Path<Uuid>,
    Json(request): Json<SpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::ADMIN_ONLY.authorize(Some(&user))?;

    let service = SpecialtyService::new(&config);
    let specialty = service
        .rename(specialty_id, request)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({ "success": true, "specialty": specialty })))
}

#[axum::debug_handler]
pub async fn delete_specialty(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(specialty_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::ADMIN_ONLY.authorize(Some(&user))?;

    let service = SpecialtyService::new(&config);
    service
        .delete(specialty_id)
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!({ "success": true, "message": "Specialty deleted." })))
}
