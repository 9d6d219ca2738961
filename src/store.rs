//! Application facade: one injectable object that owns the session, the
//! domain cache and the backend client.
//!
//! Consumers read snapshots and call the methods below; they never touch
//! the collections or the session directly. Every backend call goes
//! through [`ClinicStore::guard`], which turns a 401 into a forced logout.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::cache::{DomainCache, EntityKind};
use crate::config::{Config, ConfigError};
use crate::domain::{generate_id, Appointment, Doctor, DoctorCredentials, Patient, UserRecord};
use crate::session::{AuthToken, SessionState, SessionStore};
use crate::storage::{FileStore, KeyValueStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Only administrators can {action}")]
    Forbidden { action: &'static str },

    #[error("Login succeeded but the session could not be saved")]
    SessionNotPersisted,
}

/// Result of creating a doctor.
#[derive(Debug, Clone)]
pub struct CreatedDoctor {
    pub doctor: Doctor,
    /// Set when the doctor was created but their login credentials were not.
    pub credentials_warning: Option<String>,
}

#[derive(Clone)]
pub struct ClinicStore {
    session: SessionStore,
    cache: DomainCache,
    api: ApiClient,
}

impl ClinicStore {
    /// Build the store from configuration and restore the persisted session.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        config.validate()?;
        let storage = Arc::new(FileStore::new(config.storage.resolved_path()));
        let api = ApiClient::new(&config.api)?;

        let store = Self::with_parts(storage, api);
        store.session.restore_session();
        Ok(store)
    }

    /// Assemble a store from explicit parts. The session starts in
    /// `Loading`; call `session().restore_session()` before use.
    pub fn with_parts(storage: Arc<dyn KeyValueStore>, api: ApiClient) -> Self {
        Self {
            session: SessionStore::new(storage),
            cache: DomainCache::new(),
            api,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn cache(&self) -> &DomainCache {
        &self.cache
    }

    pub fn session_state(&self) -> SessionState {
        self.session.state()
    }

    // -- Session -----------------------------------------------------------------

    pub async fn login_doctor(&self, doctor_id: &str, password: &str) -> Result<UserRecord, StoreError> {
        let grant = self.api.login_doctor(doctor_id, password).await?;
        self.finish_login(grant.user, grant.token)
    }

    pub async fn login_admin(&self, username: &str, password: &str) -> Result<UserRecord, StoreError> {
        let grant = self.api.login_admin(username, password).await?;
        self.finish_login(grant.user, grant.token)
    }

    fn finish_login(&self, user: UserRecord, token: AuthToken) -> Result<UserRecord, StoreError> {
        if !self.session.login(user.clone(), token) {
            return Err(StoreError::SessionNotPersisted);
        }
        Ok(user)
    }

    /// Revoke the token server-side, then clear the local session.
    ///
    /// A failed backend logout is logged and does not block the local one.
    /// Returns whether local storage was fully cleared.
    pub async fn logout(&self) -> bool {
        if let Some(token) = self.session.token() {
            if let Err(e) = self.api.logout(&token).await {
                tracing::warn!(error = %e, kind = e.error_type(), "Backend logout failed");
            }
        }
        self.session.logout()
    }

    /// Ask the backend who the current token belongs to.
    pub async fn verify_session(&self) -> Result<UserRecord, StoreError> {
        let token = self.require_token()?;
        self.guard(Some(&token), self.api.current_user(&token).await)
    }

    // -- Doctors -----------------------------------------------------------------

    /// Hydrate the doctor collection. Returns `false` when a newer fetch
    /// already landed and this response was discarded.
    pub async fn refresh_doctors(&self) -> Result<bool, StoreError> {
        let ticket = self.cache.begin_fetch(EntityKind::Doctors);
        let token = self.session.token();
        let result = self.api.list_doctors(token.as_ref()).await;
        let doctors = self.guard(token.as_ref(), result)?;
        tracing::debug!(count = doctors.len(), "Doctors fetched");
        Ok(self.cache.apply_doctors(ticket, doctors))
    }

    /// Create a doctor, and their login when `credentials` are given.
    pub async fn create_doctor(
        &self,
        doctor: Doctor,
        credentials: Option<DoctorCredentials>,
    ) -> Result<CreatedDoctor, StoreError> {
        let token = self.require_admin("create doctors")?;
        let mut created = self.guard(
            Some(&token),
            self.api.create_doctor(&token, &doctor).await,
        )?;
        if created.id.is_empty() {
            created.id = generate_id();
        }

        let mut credentials_warning = None;
        if let Some(mut credentials) = credentials {
            credentials.doctor_id = created.id.clone();
            let result = self.api.create_credentials(&token, &credentials).await;
            if let Err(e) = self.guard(Some(&token), result) {
                tracing::warn!(doctor_id = %created.id, error = %e, "Doctor created without credentials");
                credentials_warning = Some(e.to_string());
            }
        }

        self.cache.add_doctor(created.clone());
        Ok(CreatedDoctor {
            doctor: created,
            credentials_warning,
        })
    }

    pub async fn update_doctor(&self, doctor: Doctor) -> Result<bool, StoreError> {
        let token = self.require_token()?;
        self.guard(Some(&token), self.api.update_doctor(&token, &doctor).await)?;
        Ok(self.cache.update_doctor(doctor))
    }

    pub async fn delete_doctor(&self, id: &str) -> Result<bool, StoreError> {
        let token = self.require_admin("delete doctors")?;
        self.guard(Some(&token), self.api.delete_doctor(&token, id).await)?;
        Ok(self.cache.delete_doctor(id))
    }

    // -- Patients ----------------------------------------------------------------

    pub async fn refresh_patients(&self) -> Result<bool, StoreError> {
        let token = self.require_token()?;
        let ticket = self.cache.begin_fetch(EntityKind::Patients);
        let patients = self.guard(Some(&token), self.api.list_patients(&token).await)?;
        tracing::debug!(count = patients.len(), "Patients fetched");
        Ok(self.cache.apply_patients(ticket, patients))
    }

    /// Create a patient on the backend; the backend's copy is cached.
    pub async fn create_patient(&self, patient: Patient) -> Result<Patient, StoreError> {
        let token = self.require_token()?;
        let mut created = self.guard(
            Some(&token),
            self.api.create_patient(&token, &patient).await,
        )?;
        if created.id.is_empty() {
            created.id = generate_id();
        }
        self.cache.add_patient(created.clone());
        Ok(created)
    }

    pub async fn update_patient(&self, patient: Patient) -> Result<bool, StoreError> {
        let token = self.require_token()?;
        self.guard(Some(&token), self.api.update_patient(&token, &patient).await)?;
        Ok(self.cache.update_patient(patient))
    }

    /// Delete a patient on the backend, then locally along with their
    /// appointments.
    pub async fn delete_patient(&self, id: &str) -> Result<bool, StoreError> {
        let token = self.require_token()?;
        self.guard(Some(&token), self.api.delete_patient(&token, id).await)?;
        Ok(self.cache.delete_patient(id))
    }

    // -- Appointments ------------------------------------------------------------

    /// Book an appointment locally. The patient name is copied from the
    /// cached patient when known.
    pub fn schedule_appointment(
        &self,
        patient_id: &str,
        date: DateTime<Utc>,
        description: &str,
    ) -> Appointment {
        let patient_name = self
            .cache
            .patient(patient_id)
            .map(|p| p.name)
            .unwrap_or_default();
        let appointment = Appointment {
            id: generate_id(),
            patient_id: patient_id.to_string(),
            patient_name,
            date,
            description: description.to_string(),
        };
        self.cache.add_appointment(appointment.clone());
        appointment
    }

    // -- Helpers -----------------------------------------------------------------

    /// Pass a backend result through, forcing a logout when a 401 answers
    /// a request sent with the current session token.
    fn guard<T>(
        &self,
        sent: Option<&AuthToken>,
        result: Result<T, ApiError>,
    ) -> Result<T, StoreError> {
        result.map_err(|e| {
            if let (true, Some(token)) = (e.is_unauthorized(), sent) {
                self.session.handle_unauthorized(token);
            }
            StoreError::Api(e)
        })
    }

    fn require_token(&self) -> Result<AuthToken, StoreError> {
        self.session.token().ok_or(StoreError::NotAuthenticated)
    }

    fn require_admin(&self, action: &'static str) -> Result<AuthToken, StoreError> {
        let token = self.require_token()?;
        if !self.session.is_admin() {
            return Err(StoreError::Forbidden { action });
        }
        Ok(token)
    }
}
