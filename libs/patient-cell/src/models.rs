use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::FieldErrors;

/// Role-specific profile a patient fills in after registering. One-to-one
/// with the user account; booking stays unavailable until it exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientProfile {
    pub user_id: Uuid,
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteProfileRequest {
    pub date_of_birth: NaiveDate,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Patient profile not found")]
    NotFound,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
