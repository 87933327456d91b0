use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::auth::{Role, User};
use shared_models::error::FieldErrors;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, UpdateStatusRequest};

const NOT_AUTHORIZED: &str = "You are not authorized to modify this appointment.";

/// Status transitions and deletion. Status writes are conditional on the
/// version the caller read, so two concurrent writers cannot silently
/// overwrite each other.
pub struct LifecycleService {
    store: StoreClient,
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Parse a requested status label. Any recognized label is acceptable
    /// as a target; anything else is a field-level validation error.
    pub fn parse_status(label: &str) -> Result<AppointmentStatus, AppointmentError> {
        label.parse().map_err(|_| {
            let mut errors = FieldErrors::new();
            errors.push("status", "Unknown appointment status.");
            AppointmentError::Validation(errors)
        })
    }

    /// True when the actor may change this appointment's status: the
    /// owning doctor, or any admin.
    pub fn can_update_status(actor: &User, appointment: &Appointment) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Doctor => appointment.doctor_id == actor.id,
            Role::Patient => false,
        }
    }

    /// True when the actor may delete this appointment: the owning patient
    /// while it is not completed, or any admin. Doctors never delete.
    pub fn can_delete(actor: &User, appointment: &Appointment) -> bool {
        match actor.role {
            Role::Admin => true,
            Role::Doctor => false,
            Role::Patient => {
                appointment.patient_id == actor.id
                    && appointment.status != AppointmentStatus::Completed
            }
        }
    }

    pub async fn update_status(
        &self,
        actor: &User,
        appointment_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<AppointmentStatus, AppointmentError> {
        let new_status = Self::parse_status(&request.status)?;

        let appointment = self.fetch(appointment_id).await?;
        if !Self::can_update_status(actor, &appointment) {
            warn!(
                "User {} denied status change on appointment {}",
                actor.id, appointment_id
            );
            return Err(AppointmentError::NotAllowed(NOT_AUTHORIZED.to_string()));
        }

        // Conditional write. An empty result means another writer bumped
        // the version after the caller read it.
        let query = format!(
            "appointments?id=eq.{}&version=eq.{}",
            appointment_id, request.expected_version
        );
        let updated: Vec<Appointment> = self
            .store
            .update(
                &query,
                json!({
                    "status": new_status,
                    "version": request.expected_version + 1,
                    "updated_at": Utc::now(),
                }),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if updated.is_empty() {
            return Err(AppointmentError::VersionConflict);
        }

        info!(
            "Appointment {} moved to {} by user {}",
            appointment_id, new_status, actor.id
        );
        Ok(new_status)
    }

    pub async fn delete(
        &self,
        actor: &User,
        appointment_id: Uuid,
    ) -> Result<(), AppointmentError> {
        let appointment = self.fetch(appointment_id).await?;
        if !Self::can_delete(actor, &appointment) {
            warn!(
                "User {} denied deletion of appointment {}",
                actor.id, appointment_id
            );
            return Err(AppointmentError::NotAllowed(NOT_AUTHORIZED.to_string()));
        }

        self.store
            .delete(&format!("appointments?id=eq.{}", appointment_id))
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!("Appointment {} deleted by user {}", appointment_id, actor.id);
        Ok(())
    }

    async fn fetch(&self, appointment_id: Uuid) -> Result<Appointment, AppointmentError> {
        let query = format!("appointments?id=eq.{}", appointment_id);
        let mut rows: Vec<Appointment> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        rows.pop().ok_or(AppointmentError::NotFound)
    }
}
