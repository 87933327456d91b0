use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use patient_cell::models::PatientProfile;
use shared_config::AppConfig;
use shared_database::postgrest::StoreClient;

use crate::models::{AgendaDay, Appointment, AppointmentError};

#[derive(Deserialize)]
struct PatientRef {
    patient_id: Uuid,
}

/// Doctor-facing queries: the day-grouped agenda and the patient roster.
pub struct AgendaService {
    store: StoreClient,
}

impl AgendaService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    /// The doctor's appointments ascending, grouped by calendar day.
    /// Rows without a scheduled time land in a trailing null-day group.
    pub async fn agenda_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<AgendaDay>, AppointmentError> {
        let query = format!(
            "appointments?doctor_id=eq.{}&order=scheduled_at.asc.nullslast",
            doctor_id
        );
        let appointments: Vec<Appointment> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(group_by_day(appointments))
    }

    /// The distinct patients this doctor has appointments with, with their
    /// profiles. Derived from the appointments table, so a doctor only ever
    /// sees patients who booked with them.
    pub async fn patients_for_doctor(
        &self,
        doctor_id: Uuid,
    ) -> Result<Vec<PatientProfile>, AppointmentError> {
        let query = format!("appointments?doctor_id=eq.{}&select=patient_id", doctor_id);
        let refs: Vec<PatientRef> = self
            .store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let mut ids: Vec<Uuid> = Vec::new();
        for r in refs {
            if !ids.contains(&r.patient_id) {
                ids.push(r.patient_id);
            }
        }
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let id_list = ids
            .iter()
            .map(Uuid::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let query = format!("patients?user_id=in.({})&order=user_id.asc", id_list);
        self.store
            .select(&query)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}

/// Group appointments into consecutive day buckets. The input is sorted
/// here rather than trusting store order, with null times last.
pub fn group_by_day(mut appointments: Vec<Appointment>) -> Vec<AgendaDay> {
    appointments.sort_by_key(|a| (a.scheduled_at.is_none(), a.scheduled_at));

    let mut days: Vec<AgendaDay> = Vec::new();
    for appointment in appointments {
        let day: Option<NaiveDate> = appointment.scheduled_at.map(|t| t.date_naive());
        match days.last_mut() {
            Some(last) if last.day == day => last.appointments.push(appointment),
            _ => days.push(AgendaDay {
                day,
                appointments: vec![appointment],
            }),
        }
    }
    days
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use crate::models::AppointmentStatus;

    use super::*;

    fn at(time: Option<chrono::DateTime<Utc>>) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            doctor_id: Uuid::new_v4(),
            scheduled_at: time,
            reason: "Follow-up visit".to_string(),
            status: AppointmentStatus::Pending,
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn groups_consecutive_days_in_order() {
        let morning = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        let afternoon = Utc.with_ymd_and_hms(2025, 6, 1, 14, 0, 0).unwrap();
        let next_day = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();

        // Deliberately unsorted input.
        let days = group_by_day(vec![at(Some(next_day)), at(Some(morning)), at(Some(afternoon))]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, Some(morning.date_naive()));
        assert_eq!(days[0].appointments.len(), 2);
        assert_eq!(days[0].appointments[0].scheduled_at, Some(morning));
        assert_eq!(days[0].appointments[1].scheduled_at, Some(afternoon));
        assert_eq!(days[1].day, Some(next_day.date_naive()));
        assert_eq!(days[1].appointments.len(), 1);
    }

    #[test]
    fn null_scheduled_time_groups_last() {
        let scheduled = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();

        let days = group_by_day(vec![at(None), at(Some(scheduled))]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, Some(scheduled.date_naive()));
        assert_eq!(days[1].day, None);
        assert_eq!(days[1].appointments.len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_agenda() {
        assert!(group_by_day(Vec::new()).is_empty());
    }
}
