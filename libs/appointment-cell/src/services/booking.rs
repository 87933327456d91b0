use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use patient_cell::services::PatientProfileService;
use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::error::FieldErrors;
use shared_utils::validation::validate_appointment_reason;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest,
    UpdateAppointmentRequest,
};

/// A booking exactly at the current instant is still acceptable; only
/// strictly past datetimes are rejected.
fn validate_schedule(
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
    errors: &mut FieldErrors,
) {
    if scheduled_at < now {
        errors.push("scheduled_at", "Appointment date cannot be in the past.");
    }
}

/// Books and lists appointments on behalf of patients.
pub struct BookingService {
    store: StoreClient,
    doctors: DoctorService,
    patients: PatientProfileService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
            doctors: DoctorService::new(config),
            patients: PatientProfileService::new(config),
        }
    }

    /// Book an appointment for the calling patient. Requires a completed
    /// patient profile, an existing doctor, a future date, and a reason.
    pub async fn create(
        &self,
        patient_id: Uuid,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut errors = FieldErrors::new();
        validate_appointment_reason(&request.reason, &mut errors);
        validate_schedule(request.scheduled_at, Utc::now(), &mut errors);
        errors.into_result().map_err(AppointmentError::Validation)?;

        let profile = self
            .patients
            .get_profile(patient_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        if profile.is_none() {
            return Err(AppointmentError::ProfileIncomplete);
        }

        let doctor_exists = self
            .doctors
            .profile_exists(request.doctor_id)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;
        if !doctor_exists {
            return Err(AppointmentError::DoctorNotFound);
        }

        let now = Utc::now();
        let appointment: Appointment = self
            .store
            .insert(
                "appointments",
                json!({
                    "id": Uuid::new_v4(),
                    "patient_id": patient_id,
                    "doctor_id": request.doctor_id,
                    "scheduled_at": request.scheduled_at,
                    "reason": request.reason.trim(),
                    "status": AppointmentStatus::Pending,
                    "version": 1,
                    "created_at": now,
                    "updated_at": now,
                }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!(
            "Appointment {} booked by patient {} with doctor {}",
            appointment.id, patient_id, request.doctor_id
        );
        Ok(appointment)
    }

    /// Reschedule or reword one of the calling patient's own appointments.
    /// The store filter carries the owner, so someone else's appointment id
    /// behaves exactly like a missing one.
    pub async fn update_for_patient(
        &self,
        patient_id: Uuid,
        appointment_id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut errors = FieldErrors::new();
        validate_appointment_reason(&request.reason, &mut errors);
        validate_schedule(request.scheduled_at, Utc::now(), &mut errors);
        errors.into_result().map_err(AppointmentError::Validation)?;

        let query = format!(
            "appointments?id=eq.{}&patient_id=eq.{}",
            appointment_id, patient_id
        );
        let updated: Vec<Appointment> = self
            .store
            .update(
                &query,
                json!({
                    "scheduled_at": request.scheduled_at,
                    "reason": request.reason.trim(),
                    "updated_at": Utc::now(),
                }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = updated
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)?;

        info!(
            "Appointment {} rescheduled by patient {}",
            appointment_id, patient_id
        );
        Ok(appointment)
    }

    /// The calling patient's appointments, newest first. Scoping is always
    /// by the authenticated user, never by request parameters.
    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let query = format!(
            "appointments?patient_id=eq.{}&order=scheduled_at.desc.nullslast",
            patient_id
        );
        self.store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn get(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let query = format!("appointments?id=eq.{}", appointment_id);
        let mut rows: Vec<Appointment> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        rows.pop().ok_or(AppointmentError::NotFound)
    }
}
