use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::error::FieldErrors;
use shared_utils::validation::{validate_license_number, validate_phone};

use crate::models::{CompleteDoctorProfileRequest, DoctorError, DoctorListing, DoctorProfile};

const LISTING_SELECT: &str =
    "select=user_id,license_number,phone,users(first_name,last_name),specialties(id,name)";

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Create or update the doctor profile for a user. The specialty set
    /// must be non-empty and reference existing specialties; the license
    /// number must be unique across doctors.
    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        request: CompleteDoctorProfileRequest,
    ) -> Result<DoctorProfile, DoctorError> {
        let mut errors = FieldErrors::new();
        validate_license_number(&request.license_number, &mut errors);
        validate_phone(&request.phone, &mut errors);
        if request.specialty_ids.is_empty() {
            errors.push("specialty_ids", "Select at least one specialty.");
        }

        let license = request.license_number.trim().to_string();

        if errors.is_empty() {
            if self.license_taken_by_other(&license, user_id).await? {
                errors.push("license_number", "This license number is already registered.");
            }
            for specialty_id in &request.specialty_ids {
                if !self.specialty_exists(*specialty_id).await? {
                    errors.push("specialty_ids", "One or more specialties do not exist.");
                    break;
                }
            }
        }

        errors.into_result().map_err(DoctorError::Validation)?;

        let profile = DoctorProfile {
            user_id,
            license_number: license,
            phone: request.phone.trim().to_string(),
        };

        let saved = if self.profile_exists(user_id).await? {
            debug!("Updating doctor profile for {}", user_id);
            let updated: Vec<DoctorProfile> = self
                .store
                .update(
                    &format!("doctors?user_id=eq.{}", user_id),
                    json!({
                        "license_number": profile.license_number,
                        "phone": profile.phone,
                    }),
                )
                .await
                .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

            updated.into_iter().next().ok_or(DoctorError::NotFound)?
        } else {
            self.store
                .insert("doctors", json!(profile))
                .await
                .map_err(|e| DoctorError::DatabaseError(e.to_string()))?
        };

        self.replace_specialties(user_id, &request.specialty_ids)
            .await?;

        info!("Doctor profile completed for user {}", user_id);
        Ok(saved)
    }

    /// All doctors with name and specialties embedded, for patient
    /// browsing. Read-only.
    pub async fn list_doctors(&self) -> Result<Vec<DoctorListing>, DoctorError> {
        self.store
            .select(&format!("doctors?{}&order=user_id.asc", LISTING_SELECT))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn get_doctor(&self, user_id: Uuid) -> Result<DoctorListing, DoctorError> {
        let query = format!("doctors?user_id=eq.{}&{}", user_id, LISTING_SELECT);
        let mut rows: Vec<DoctorListing> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        rows.pop().ok_or(DoctorError::NotFound)
    }

    pub async fn profile_exists(&self, user_id: Uuid) -> Result<bool, DoctorError> {
        let query = format!("doctors?user_id=eq.{}&select=user_id", user_id);
        let rows: Vec<serde_json::Value> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn license_taken_by_other(
        &self,
        license: &str,
        user_id: Uuid,
    ) -> Result<bool, DoctorError> {
        let query = format!(
            "doctors?license_number=eq.{}&user_id=neq.{}&select=user_id",
            urlencoding::encode(license),
            user_id
        );
        let rows: Vec<serde_json::Value> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    async fn specialty_exists(&self, specialty_id: Uuid) -> Result<bool, DoctorError> {
        let query = format!("specialties?id=eq.{}&select=id", specialty_id);
        let rows: Vec<serde_json::Value> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    /// Replace the doctor's specialty links with the requested set.
    async fn replace_specialties(
        &self,
        user_id: Uuid,
        specialty_ids: &[Uuid],
    ) -> Result<(), DoctorError> {
        self.store
            .delete(&format!("doctor_specialties?doctor_id=eq.{}", user_id))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        for specialty_id in specialty_ids {
            let _: serde_json::Value = self
                .store
                .insert(
                    "doctor_specialties",
                    json!({ "doctor_id": user_id, "specialty_id": specialty_id }),
                )
                .await
                .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;
        }

        Ok(())
    }
}
