//! Shared test utilities and fixtures.

#![allow(dead_code, unused_imports)]

pub mod mock_backend;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use clinicdesk::api::ApiClient;
use clinicdesk::config::ApiConfig;
use clinicdesk::domain::{Appointment, Doctor, DoctorStatus, Patient, UserRecord};
use clinicdesk::session::AuthToken;
use clinicdesk::storage::MemoryStore;
use clinicdesk::ClinicStore;

pub use mock_backend::{MockBackend, MockResponse};

/// Client pointed at `base_url` with short timeouts.
pub fn api_client(base_url: &str) -> ApiClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        connect_timeout_seconds: 2,
    };
    ApiClient::new(&config).expect("Failed to build API client")
}

/// Store backed by memory storage, session already restored (empty).
pub fn make_store(base_url: &str) -> (Arc<MemoryStore>, ClinicStore) {
    let storage = Arc::new(MemoryStore::new());
    let store = ClinicStore::with_parts(storage.clone(), api_client(base_url));
    store.session().restore_session();
    (storage, store)
}

/// Store with an authenticated session for `role`.
pub fn logged_in_store(base_url: &str, role: &str) -> (Arc<MemoryStore>, ClinicStore) {
    let (storage, store) = make_store(base_url);
    assert!(store
        .session()
        .login(UserRecord::new("u1", "Test User", role), AuthToken::new("tok-test")));
    (storage, store)
}

// -- Fixtures -----------------------------------------------------------------

pub fn doctor(id: &str) -> Doctor {
    Doctor {
        id: id.to_string(),
        name: format!("Doctor {}", id),
        email: format!("{}@clinic.test", id),
        phone: "555-0100".to_string(),
        specialty: "General".to_string(),
        status: DoctorStatus::Active,
    }
}

pub fn patient(id: &str) -> Patient {
    Patient::new(id, format!("Patient {}", id), 40, "555-0200")
}

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, day, hour, 0, 0).unwrap()
}

pub fn appointment(id: &str, patient_id: &str, date: DateTime<Utc>) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        patient_name: format!("Patient {}", patient_id),
        date,
        description: "Revisión".to_string(),
    }
}
