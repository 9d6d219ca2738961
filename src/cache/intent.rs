use crate::domain::{Appointment, Doctor, Patient};
use crate::mvi::Intent;

#[derive(Debug, Clone)]
pub enum CacheIntent {
    AddDoctor(Doctor),
    UpdateDoctor(Doctor),
    DeleteDoctor(String),
    SetDoctors(Vec<Doctor>),

    AddPatient(Patient),
    UpdatePatient(Patient),
    /// Also removes the patient's appointments.
    DeletePatient(String),
    SetPatients(Vec<Patient>),

    AddAppointment(Appointment),
    UpdateAppointment(Appointment),
    DeleteAppointment(String),
    SetAppointments(Vec<Appointment>),
}

impl Intent for CacheIntent {}
