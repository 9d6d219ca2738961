//! Thread-safe owner of the doctor, patient and appointment collections.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::domain::{Appointment, Doctor, Patient};
use crate::mvi::Reducer;

use super::collection;
use super::intent::CacheIntent;
use super::reducer::CacheReducer;
use super::sequence::{EntityKind, FetchSequences, FetchTicket};
use super::state::CacheState;

/// In-memory domain cache.
///
/// All collections sit behind one lock, so a cascading delete is observed
/// as a single transition. Readers always get clones. Mutations of unknown
/// ids are no-ops and report `false`.
#[derive(Clone, Default)]
pub struct DomainCache {
    inner: Arc<RwLock<CacheInner>>,
}

#[derive(Default)]
struct CacheInner {
    state: CacheState,
    fetches: FetchSequences,
}

impl DomainCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all three collections.
    pub fn snapshot(&self) -> CacheState {
        self.inner.read().state.clone()
    }

    pub fn doctors(&self) -> Vec<Doctor> {
        self.inner.read().state.doctors.clone()
    }

    pub fn patients(&self) -> Vec<Patient> {
        self.inner.read().state.patients.clone()
    }

    pub fn appointments(&self) -> Vec<Appointment> {
        self.inner.read().state.appointments.clone()
    }

    pub fn doctor(&self, id: &str) -> Option<Doctor> {
        self.inner.read().state.doctor(id).cloned()
    }

    pub fn patient(&self, id: &str) -> Option<Patient> {
        self.inner.read().state.patient(id).cloned()
    }

    pub fn appointment(&self, id: &str) -> Option<Appointment> {
        self.inner.read().state.appointment(id).cloned()
    }

    pub fn appointments_for_patient(&self, patient_id: &str) -> Vec<Appointment> {
        self.inner.read().state.appointments_for_patient(patient_id)
    }

    pub fn appointments_on(&self, day: NaiveDate) -> Vec<Appointment> {
        self.inner.read().state.appointments_on(day)
    }

    pub fn marked_days(&self) -> BTreeSet<NaiveDate> {
        self.inner.read().state.marked_days()
    }

    // -- Doctors ---------------------------------------------------------------

    pub fn add_doctor(&self, doctor: Doctor) {
        self.dispatch(CacheIntent::AddDoctor(doctor));
    }

    pub fn update_doctor(&self, doctor: Doctor) -> bool {
        let id = doctor.id.clone();
        self.dispatch_if_known(&id, |s| &s.doctors, CacheIntent::UpdateDoctor(doctor))
    }

    pub fn delete_doctor(&self, id: &str) -> bool {
        self.dispatch_if_known(id, |s| &s.doctors, CacheIntent::DeleteDoctor(id.to_string()))
    }

    pub fn set_doctors(&self, doctors: Vec<Doctor>) {
        self.dispatch(CacheIntent::SetDoctors(doctors));
    }

    // -- Patients --------------------------------------------------------------

    pub fn add_patient(&self, patient: Patient) {
        self.dispatch(CacheIntent::AddPatient(patient));
    }

    pub fn update_patient(&self, patient: Patient) -> bool {
        let id = patient.id.clone();
        self.dispatch_if_known(&id, |s| &s.patients, CacheIntent::UpdatePatient(patient))
    }

    /// Remove a patient together with every appointment that references it.
    ///
    /// Orphaned appointments are removed even when the patient itself is
    /// no longer cached. Returns whether anything was removed.
    pub fn delete_patient(&self, id: &str) -> bool {
        let mut inner = self.inner.write();
        let patient_known = collection::contains(&inner.state.patients, id);
        let cascaded = inner
            .state
            .appointments
            .iter()
            .filter(|a| a.patient_id == id)
            .count();
        if !patient_known && cascaded == 0 {
            tracing::debug!(patient_id = id, "Delete of unknown patient ignored");
            return false;
        }

        let current = std::mem::take(&mut inner.state);
        inner.state = CacheReducer::reduce(current, CacheIntent::DeletePatient(id.to_string()));
        tracing::debug!(patient_id = id, appointments = cascaded, "Patient deleted");
        true
    }

    pub fn set_patients(&self, patients: Vec<Patient>) {
        self.dispatch(CacheIntent::SetPatients(patients));
    }

    // -- Appointments ----------------------------------------------------------

    pub fn add_appointment(&self, appointment: Appointment) {
        self.dispatch(CacheIntent::AddAppointment(appointment));
    }

    pub fn update_appointment(&self, appointment: Appointment) -> bool {
        let id = appointment.id.clone();
        self.dispatch_if_known(
            &id,
            |s| &s.appointments,
            CacheIntent::UpdateAppointment(appointment),
        )
    }

    pub fn delete_appointment(&self, id: &str) -> bool {
        self.dispatch_if_known(
            id,
            |s| &s.appointments,
            CacheIntent::DeleteAppointment(id.to_string()),
        )
    }

    pub fn set_appointments(&self, appointments: Vec<Appointment>) {
        self.dispatch(CacheIntent::SetAppointments(appointments));
    }

    // -- Hydration -------------------------------------------------------------

    /// Take a ticket before requesting `kind` from the backend.
    pub fn begin_fetch(&self, kind: EntityKind) -> FetchTicket {
        self.inner.write().fetches.issue(kind)
    }

    /// Sequence number of the newest fetch applied for `kind` (0 if none).
    pub fn last_applied(&self, kind: EntityKind) -> u64 {
        self.inner.read().fetches.last_applied(kind)
    }

    pub fn apply_doctors(&self, ticket: FetchTicket, doctors: Vec<Doctor>) -> bool {
        self.apply_fetch(ticket, EntityKind::Doctors, CacheIntent::SetDoctors(doctors))
    }

    pub fn apply_patients(&self, ticket: FetchTicket, patients: Vec<Patient>) -> bool {
        self.apply_fetch(ticket, EntityKind::Patients, CacheIntent::SetPatients(patients))
    }

    pub fn apply_appointments(&self, ticket: FetchTicket, appointments: Vec<Appointment>) -> bool {
        self.apply_fetch(
            ticket,
            EntityKind::Appointments,
            CacheIntent::SetAppointments(appointments),
        )
    }

    fn apply_fetch(&self, ticket: FetchTicket, expected: EntityKind, intent: CacheIntent) -> bool {
        if ticket.kind() != expected {
            tracing::warn!(
                ticket = ticket.kind().as_str(),
                expected = expected.as_str(),
                "Fetch ticket applied to the wrong collection"
            );
            return false;
        }

        let mut inner = self.inner.write();
        if !inner.fetches.accept(ticket) {
            tracing::debug!(
                kind = expected.as_str(),
                seq = ticket.seq(),
                "Discarding stale fetch response"
            );
            return false;
        }

        let current = std::mem::take(&mut inner.state);
        inner.state = CacheReducer::reduce(current, intent);
        true
    }

    fn dispatch(&self, intent: CacheIntent) {
        let mut inner = self.inner.write();
        let current = std::mem::take(&mut inner.state);
        inner.state = CacheReducer::reduce(current, intent);
    }

    fn dispatch_if_known<T, F>(&self, id: &str, items: F, intent: CacheIntent) -> bool
    where
        T: crate::domain::Entity,
        F: Fn(&CacheState) -> &Vec<T>,
    {
        let mut inner = self.inner.write();
        if !collection::contains(items(&inner.state), id) {
            tracing::debug!(id, ?intent, "Mutation of unknown id ignored");
            return false;
        }
        let current = std::mem::take(&mut inner.state);
        inner.state = CacheReducer::reduce(current, intent);
        true
    }
}
