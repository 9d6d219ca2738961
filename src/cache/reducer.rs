use crate::mvi::Reducer;

use super::collection::{remove, replace};
use super::intent::CacheIntent;
use super::state::CacheState;

pub struct CacheReducer;

impl Reducer for CacheReducer {
    type State = CacheState;
    type Intent = CacheIntent;

    fn reduce(mut state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            CacheIntent::AddDoctor(doctor) => state.doctors.push(doctor),
            CacheIntent::UpdateDoctor(doctor) => {
                state.doctors = replace(state.doctors, doctor);
            }
            CacheIntent::DeleteDoctor(id) => {
                state.doctors = remove(state.doctors, &id);
            }
            CacheIntent::SetDoctors(doctors) => state.doctors = doctors,

            CacheIntent::AddPatient(patient) => state.patients.push(patient),
            CacheIntent::UpdatePatient(patient) => {
                state.patients = replace(state.patients, patient);
            }
            CacheIntent::DeletePatient(id) => {
                state.patients = remove(state.patients, &id);
                state.appointments.retain(|a| a.patient_id != id);
            }
            CacheIntent::SetPatients(patients) => state.patients = patients,

            CacheIntent::AddAppointment(appointment) => state.appointments.push(appointment),
            CacheIntent::UpdateAppointment(appointment) => {
                state.appointments = replace(state.appointments, appointment);
            }
            CacheIntent::DeleteAppointment(id) => {
                state.appointments = remove(state.appointments, &id);
            }
            CacheIntent::SetAppointments(appointments) => state.appointments = appointments,
        }
        state
    }
}
