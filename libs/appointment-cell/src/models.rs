use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::error::FieldErrors;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    /// Null for legacy rows imported without a scheduled time. New
    /// bookings always set it.
    pub scheduled_at: Option<DateTime<Utc>>,
    pub reason: String,
    pub status: AppointmentStatus,
    /// Optimistic concurrency counter, bumped on every status write.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("Unknown appointment status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
}

/// Owner-scoped reschedule/edit of an existing appointment.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub expected_version: i32,
}

/// One calendar day of a doctor's agenda. Appointments without a
/// scheduled time group under `day: None` and sort last.
#[derive(Debug, Clone, Serialize)]
pub struct AgendaDay {
    pub day: Option<NaiveDate>,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Patient profile is incomplete")]
    ProfileIncomplete,

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Not allowed: {0}")]
    NotAllowed(String),

    #[error("Appointment was modified concurrently")]
    VersionConflict,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
