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

use crate::models::{
    AppointmentError, CreateAppointmentRequest, UpdateAppointmentRequest, UpdateStatusRequest,
};
use crate::services::{AgendaService, BookingService, LifecycleService};

fn map_appointment_error(user: &User, error: AppointmentError) -> AppError {
    match error {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        AppointmentError::ProfileIncomplete => AppError::BadRequest(
            "Complete your patient profile before booking an appointment.".to_string(),
        ),
        AppointmentError::Validation(errors) => AppError::Validation(errors),
        AppointmentError::NotAllowed(msg) => AppError::Forbidden {
            notice: msg,
            redirect_to: user.role.landing_route().to_string(),
        },
        AppointmentError::VersionConflict => AppError::Conflict(
            "The appointment was modified by someone else. Reload and retry.".to_string(),
        ),
        AppointmentError::DatabaseError(msg) => AppError::Database(msg),
    }
}

/// Book an appointment for the logged-in patient.
#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    RolePolicy::PATIENT_ONLY.authorize(Some(&user))?;

    let service = BookingService::new(&config);
    let appointment = service
        .create(user.id, request)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment booked."
        })),
    ))
}

/// The logged-in patient's own appointments, newest first.
#[axum::debug_handler]
pub async fn list_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::PATIENT_ONLY.authorize(Some(&user))?;

    let service = BookingService::new(&config);
    let appointments = service
        .list_for_patient(user.id)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

/// Reschedule or reword one of the logged-in patient's own appointments.
/// Someone else's appointment id resolves to a 404, never a different
/// patient's data.
#[axum::debug_handler]
pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::PATIENT_ONLY.authorize(Some(&user))?;

    let service = BookingService::new(&config);
    let appointment = service
        .update_for_patient(user.id, appointment_id, request)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment updated."
    })))
}

/// The distinct patients the logged-in doctor has appointments with.
#[axum::debug_handler]
pub async fn patient_roster(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::DOCTOR_ONLY.authorize(Some(&user))?;

    let service = AgendaService::new(&config);
    let patients = service
        .patients_for_doctor(user.id)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

/// Day-grouped agenda for the logged-in doctor.
#[axum::debug_handler]
pub async fn agenda(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::DOCTOR_ONLY.authorize(Some(&user))?;

    let service = AgendaService::new(&config);
    let days = service
        .agenda_for_doctor(user.id)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({ "agenda": days })))
}

/// Version-checked status transition by the owning doctor or an admin.
#[axum::debug_handler]
pub async fn update_status(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::DOCTOR_OR_ADMIN.authorize(Some(&user))?;

    let service = LifecycleService::new(&config);
    let new_status = service
        .update_status(&user, appointment_id, request)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({
        "appointment_id": appointment_id,
        "new_status": new_status
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    RolePolicy::PATIENT_OR_ADMIN.authorize(Some(&user))?;

    let service = LifecycleService::new(&config);
    service
        .delete(&user, appointment_id)
        .await
        .map_err(|e| map_appointment_error(&user, e))?;

    Ok(Json(json!({ "success": true, "message": "Appointment deleted." })))
}
