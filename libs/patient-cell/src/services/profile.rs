use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::error::FieldErrors;
use shared_utils::validation::{validate_address, validate_birth_date, validate_phone};

use crate::models::{CompleteProfileRequest, PatientProfile, ProfileError};

pub struct PatientProfileService {
    store: StoreClient,
}

impl PatientProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// Create or update the caller's profile. Upsert semantics: completing
    /// a profile twice is an update, not an error.
    pub async fn complete_profile(
        &self,
        user_id: Uuid,
        request: CompleteProfileRequest,
    ) -> Result<PatientProfile, ProfileError> {
        let mut errors = FieldErrors::new();
        validate_birth_date(request.date_of_birth, &mut errors);
        validate_phone(&request.phone, &mut errors);
        validate_address(&request.address, &mut errors);
        errors.into_result().map_err(ProfileError::Validation)?;

        let profile = PatientProfile {
            user_id,
            date_of_birth: request.date_of_birth,
            phone: request.phone.trim().to_string(),
            address: request.address.trim().to_string(),
        };

        let saved = if self.get_profile(user_id).await?.is_some() {
            debug!("Updating existing patient profile for {}", user_id);
            let updated: Vec<PatientProfile> = self
                .store
                .update(
                    &format!("patients?user_id=eq.{}", user_id),
                    json!({
                        "date_of_birth": profile.date_of_birth,
                        "phone": profile.phone,
                        "address": profile.address,
                    }),
                )
                .await
                .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

            updated.into_iter().next().ok_or(ProfileError::NotFound)?
        } else {
            self.store
                .insert("patients", json!(profile))
                .await
                .map_err(|e| ProfileError::DatabaseError(e.to_string()))?
        };

        info!("Patient profile completed for user {}", user_id);
        Ok(saved)
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<PatientProfile>, ProfileError> {
        let query = format!("patients?user_id=eq.{}", user_id);
        let mut rows: Vec<PatientProfile> = self
            .store
            .select(&query)
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        Ok(rows.pop())
    }

    pub async fn list_patients(&self) -> Result<Vec<PatientProfile>, ProfileError> {
        self.store
            .select("patients?order=user_id.asc")
            .await
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))
    }
}
