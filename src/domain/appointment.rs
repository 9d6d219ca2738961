use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::Entity;

/// A consultation booked for a patient.
///
/// `patient_id` is not checked against the patient collection when the
/// appointment is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(deserialize_with = "super::lenient_id")]
    pub id: String,
    #[serde(deserialize_with = "super::lenient_id")]
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
}

impl Appointment {
    /// Calendar day (UTC) the appointment falls on.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

impl Entity for Appointment {
    fn id(&self) -> &str {
        &self.id
    }
}
