use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::domain::{Appointment, Doctor, Patient};
use crate::mvi::StoreState;

use super::collection;

/// The three collections mirrored from the backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CacheState {
    pub doctors: Vec<Doctor>,
    pub patients: Vec<Patient>,
    pub appointments: Vec<Appointment>,
}

impl StoreState for CacheState {}

impl CacheState {
    pub fn doctor(&self, id: &str) -> Option<&Doctor> {
        collection::find(&self.doctors, id)
    }

    pub fn patient(&self, id: &str) -> Option<&Patient> {
        collection::find(&self.patients, id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        collection::find(&self.appointments, id)
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.appointments
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect()
    }

    /// Appointments on `day`, earliest first.
    pub fn appointments_on(&self, day: NaiveDate) -> Vec<Appointment> {
        let mut found: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| a.day() == day)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.date);
        found
    }

    /// Days with at least one appointment, for calendar markers.
    pub fn marked_days(&self) -> BTreeSet<NaiveDate> {
        self.appointments.iter().map(Appointment::day).collect()
    }
}
