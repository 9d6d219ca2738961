use crate::domain::{Role, UserRecord};
use crate::mvi::StoreState;

use super::token::AuthToken;

/// The authenticated identity and credential for the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserRecord,
    pub token: AuthToken,
}

impl Session {
    pub fn new(user: UserRecord, token: AuthToken) -> Self {
        Self { user, token }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn display_name(&self) -> &str {
        self.user.display_name()
    }

    pub fn role(&self) -> Role {
        self.user.role()
    }
}

/// Session lifecycle.
///
/// `Loading` only exists until the persisted session has been read;
/// role-gated views must wait for it to resolve.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    #[default]
    Loading,
    Authenticated(Session),
    Unauthenticated,
}

impl StoreState for SessionState {}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_admin(&self) -> bool {
        self.session()
            .is_some_and(|session| session.role() == Role::Admin)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Authenticated(_) => "authenticated",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}
