//! Session lifecycle backed by durable storage.
//!
//! Storage is written before memory on login and cleared before memory on
//! logout, so a crash between the two never leaves an in-memory session
//! that would not survive a restart. Login, logout and the forced logout
//! after a 401 are serialized so their storage writes never interleave.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;

use crate::domain::UserRecord;
use crate::mvi::Reducer;
use crate::storage::{keys, KeyValueStore, StorageError};

use super::intent::SessionIntent;
use super::reducer::SessionReducer;
use super::state::{Session, SessionState};
use super::token::AuthToken;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Persisted user record is invalid: {0}")]
    InvalidUserData(#[source] serde_json::Error),
}

/// Thread-safe session container.
///
/// Cloning is cheap and every clone observes the same session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: Arc<RwLock<SessionState>>,
    writes: Arc<Mutex<()>>,
}

type Entries = [(&'static str, String); 3];

impl SessionStore {
    /// Create a store in the `Loading` state. Call
    /// [`restore_session`](Self::restore_session) once before use.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            state: Arc::new(RwLock::new(SessionState::Loading)),
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Read the persisted session and leave `Loading`.
    ///
    /// Missing, unreadable or malformed data all resolve to
    /// `Unauthenticated`. Has no effect once the session is resolved.
    pub fn restore_session(&self) -> SessionState {
        let restored = match self.read_persisted() {
            Ok(Some(session)) => {
                tracing::info!(
                    user_id = %session.user_id(),
                    role = session.role().as_str(),
                    "Session restored"
                );
                Some(session)
            }
            Ok(None) => {
                tracing::debug!("No persisted session");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to restore session");
                None
            }
        };

        self.dispatch(SessionIntent::Restored(restored))
    }

    /// Persist `user` and `token`, then authenticate.
    ///
    /// Returns `false` when storage rejects the write. Keys already written
    /// are rolled back to the previous session's values (or removed when
    /// there was none), and the in-memory session is left as it was.
    pub fn login(&self, user: UserRecord, token: AuthToken) -> bool {
        let _writes = self.writes.lock();
        let mut written = Vec::new();
        if let Err(e) = self.persist(&user, &token, &mut written) {
            tracing::warn!(user_id = %user.id, error = %e, "Failed to persist session");
            self.roll_back(&written);
            return false;
        }

        tracing::info!(
            user_id = %user.id,
            role = user.role().as_str(),
            "Logged in"
        );
        self.dispatch(SessionIntent::LoggedIn(Session::new(user, token)));
        true
    }

    /// Remove the persisted session and clear it from memory.
    ///
    /// Every key is attempted even when an earlier removal fails. Returns
    /// `true` only if all removals succeeded; the in-memory session is
    /// cleared either way.
    pub fn logout(&self) -> bool {
        let _writes = self.writes.lock();
        let removed = self.clear_persisted();
        self.dispatch(SessionIntent::LoggedOut);
        tracing::info!(storage_cleared = removed, "Logged out");
        removed
    }

    /// React to a 401 for a request sent with `rejected`.
    ///
    /// Only clears the session when `rejected` is still the current token;
    /// a late 401 for a token that has since been replaced is ignored.
    /// Returns whether the session was cleared.
    pub fn handle_unauthorized(&self, rejected: &AuthToken) -> bool {
        let _writes = self.writes.lock();
        match self.token() {
            Some(current) if current == *rejected => {}
            Some(_) => {
                tracing::debug!("Ignoring 401 for a superseded token");
                return false;
            }
            None => return false,
        }

        tracing::warn!("Backend rejected the session token, clearing session");
        self.clear_persisted();
        self.dispatch(SessionIntent::Unauthorized);
        true
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.read().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated()
    }

    pub fn is_admin(&self) -> bool {
        self.state.read().is_admin()
    }

    pub fn session(&self) -> Option<Session> {
        self.state.read().session().cloned()
    }

    pub fn token(&self) -> Option<AuthToken> {
        self.state.read().session().map(|s| s.token.clone())
    }

    pub fn user(&self) -> Option<UserRecord> {
        self.state.read().session().map(|s| s.user.clone())
    }

    fn dispatch(&self, intent: SessionIntent) -> SessionState {
        let mut state = self.state.write();
        let current = std::mem::take(&mut *state);
        let from = current.label();
        let next = SessionReducer::reduce(current, intent);
        tracing::debug!(from, to = next.label(), "Session transition");
        *state = next.clone();
        next
    }

    fn read_persisted(&self) -> Result<Option<Session>, SessionError> {
        let token = match self.storage.get(keys::USER_TOKEN)? {
            Some(token) if !token.is_empty() => Some(token),
            _ => self
                .storage
                .get(keys::AUTH_TOKEN)?
                .filter(|token| !token.is_empty()),
        };
        let user_data = self.storage.get(keys::USER_DATA)?;

        let (Some(token), Some(user_data)) = (token, user_data) else {
            return Ok(None);
        };

        let user: UserRecord =
            serde_json::from_str(&user_data).map_err(SessionError::InvalidUserData)?;
        Ok(Some(Session::new(user, AuthToken::new(token))))
    }

    fn entries(user: &UserRecord, token: &AuthToken) -> Result<Entries, SessionError> {
        let user_data = serde_json::to_string(user).map_err(SessionError::InvalidUserData)?;
        Ok([
            (keys::USER_TOKEN, token.expose().to_string()),
            (keys::AUTH_TOKEN, token.expose().to_string()),
            (keys::USER_DATA, user_data),
        ])
    }

    /// Write every session key, recording in `written` the keys that
    /// were actually changed.
    fn persist(
        &self,
        user: &UserRecord,
        token: &AuthToken,
        written: &mut Vec<&'static str>,
    ) -> Result<(), SessionError> {
        for (key, value) in Self::entries(user, token)? {
            self.storage.set(key, &value)?;
            written.push(key);
        }
        Ok(())
    }

    /// Undo a partial `persist`: restore the current session's values for
    /// the `written` keys, or remove them when nobody is logged in.
    fn roll_back(&self, written: &[&'static str]) {
        let previous = match self.session() {
            Some(session) => match Self::entries(&session.user, &session.token) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    tracing::warn!(error = %e, "Cannot re-encode previous session");
                    None
                }
            },
            None => None,
        };

        for &key in written {
            let restored = previous
                .as_ref()
                .and_then(|entries| entries.iter().find(|(k, _)| *k == key))
                .map(|(_, value)| value.as_str());
            let result = match restored {
                Some(value) => self.storage.set(key, value),
                None => self.storage.remove(key),
            };
            if let Err(e) = result {
                tracing::warn!(key, error = %e, "Failed to roll back session key");
            }
        }
    }

    fn clear_persisted(&self) -> bool {
        let mut removed = true;
        for key in keys::SESSION_KEYS {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove persisted session key");
                removed = false;
            }
        }
        removed
    }
}
