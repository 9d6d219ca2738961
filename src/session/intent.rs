use crate::mvi::Intent;

use super::state::Session;

#[derive(Debug, Clone)]
pub enum SessionIntent {
    /// Startup restore finished; `None` when nothing usable was persisted.
    Restored(Option<Session>),
    /// Credentials were persisted after a successful login.
    LoggedIn(Session),
    /// User asked to end the session.
    LoggedOut,
    /// The backend rejected the token (HTTP 401).
    Unauthorized,
}

impl Intent for SessionIntent {}
