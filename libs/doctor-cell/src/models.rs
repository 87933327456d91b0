use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::FieldErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
}

/// Role-specific doctor record, one-to-one with the user account. The
/// account itself is created by an admin; this profile is completed
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub user_id: Uuid,
    pub license_number: String,
    pub phone: String,
}

/// Doctor's display name as embedded from the users table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorName {
    pub first_name: String,
    pub last_name: String,
}

impl DoctorName {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A doctor as shown to browsing patients: profile plus embedded name
/// and specialties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorListing {
    pub user_id: Uuid,
    pub license_number: String,
    pub phone: String,
    #[serde(rename = "users")]
    pub name: Option<DoctorName>,
    #[serde(default)]
    pub specialties: Vec<Specialty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompleteDoctorProfileRequest {
    pub license_number: String,
    pub phone: String,
    pub specialty_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpecialtyRequest {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Specialty not found")]
    SpecialtyNotFound,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
