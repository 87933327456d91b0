use std::sync::Arc;

use axum::{
    extract::{Extension, Json, State},
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::authz::RolePolicy;

use crate::models::{CompleteProfileRequest, ProfileError};
use crate::services::PatientProfileService;

fn map_profile_error(error: ProfileError) -> AppError {
    match error {
        ProfileError::NotFound => AppError::NotFound("Patient profile not found".to_string()),
        ProfileError::Validation(errors) => AppError::Validation(errors),
        ProfileError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Profile completion for the logged-in patient.
#[axum::debug_handler]
pub async fn complete_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CompleteProfileRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::PATIENT_ONLY.authorize(Some(&user))?;

    let service = PatientProfileService::new(&config);
    let profile = service
        .complete_profile(user.id, request)
        .await
        .map_err(map_profile_error)?;

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
    RolePolicy::PATIENT_ONLY.authorize(Some(&user))?;

    let service = PatientProfileService::new(&config);
    let profile = service
        .get_profile(user.id)
        .await
        .map_err(map_profile_error)?
        .ok_or_else(|| AppError::NotFound("Patient profile not found".to_string()))?;

    Ok(Json(json!(profile)))
}

#[axum::debug_handler]
pub async fn list_patients(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::ADMIN_ONLY.authorize(Some(&user))?;

    let service = PatientProfileService::new(&config);
    let patients = service.list_patients().await.map_err(map_profile_error)?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}
