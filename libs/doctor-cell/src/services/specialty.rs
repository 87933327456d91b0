use serde_json::json;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;
use shared_models::error::FieldErrors;
use shared_utils::validation::validate_specialty_name;

use crate::models::{DoctorError, Specialty, SpecialtyRequest};

/// Specialty catalog management. Names are unique case-insensitively.
pub struct SpecialtyService {
    store: StoreClient,
}

impl SpecialtyService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub async fn create(&self, request: SpecialtyRequest) -> Result<Specialty, DoctorError> {
        let name = self.validated_name(&request, None).await?;

        let specialty: Specialty = self
            .store
            .insert("specialties", json!({ "id": Uuid::new_v4(), "name": name }))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Created specialty {} ({})", specialty.name, specialty.id);
        Ok(specialty)
    }

    pub async fn list(&self) -> Result<Vec<Specialty>, DoctorError> {
        self.store
            .select("specialties?order=name.asc")
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))
    }

    pub async fn rename(
        &self,
        specialty_id: Uuid,
        request: SpecialtyRequest,
    ) -> Result<Specialty, DoctorError> {
        let name = self.validated_name(&request, Some(specialty_id)).await?;

        let updated: Vec<Specialty> = self
            .store
            .update(
                &format!("specialties?id=eq.{}", specialty_id),
                json!({ "name": name }),
            )
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        updated
            .into_iter()
            .next()
            .ok_or(DoctorError::SpecialtyNotFound)
    }

    pub async fn delete(&self, specialty_id: Uuid) -> Result<(), DoctorError> {
        let query = format!("specialties?id=eq.{}&select=id,name", specialty_id);
        let rows: Vec<Specialty> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        if rows.is_empty() {
            return Err(DoctorError::SpecialtyNotFound);
        }

        self.store
            .delete(&format!("doctor_specialties?specialty_id=eq.{}", specialty_id))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        self.store
            .delete(&format!("specialties?id=eq.{}", specialty_id))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        info!("Deleted specialty {}", specialty_id);
        Ok(())
    }

    async fn validated_name(
        &self,
        request: &SpecialtyRequest,
        exclude_id: Option<Uuid>,
    ) -> Result<String, DoctorError> {
        let mut errors = FieldErrors::new();
        validate_specialty_name(&request.name, &mut errors);

        let name = request.name.trim().to_string();

        if errors.is_empty() && self.name_taken(&name, exclude_id).await? {
            errors.push("name", "A specialty with this name already exists.");
        }

        errors.into_result().map_err(DoctorError::Validation)?;
        Ok(name)
    }

    /// Case-insensitive uniqueness via an exact-pattern ilike filter.
    async fn name_taken(&self, name: &str, exclude_id: Option<Uuid>) -> Result<bool, DoctorError> {
        let mut query = format!(
            "specialties?name=ilike.{}&select=id,name",
            urlencoding::encode(name)
        );
        if let Some(id) = exclude_id {
            query.push_str(&format!("&id=neq.{}", id));
        }

        let rows: Vec<Specialty> = self
            .store
            .select(&query)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }
}
