use serde::{Deserialize, Serialize};

use super::lenient_opt_id;

/// Role granted to an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Doctor,
    Admin,
}

impl Role {
    /// Parse the backend's role label.
    ///
    /// Only `admin` (in any letter case) grants admin rights; every other
    /// label, including an empty one, is a doctor.
    pub fn from_label(label: &str) -> Self {
        if label.eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::Doctor
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Admin => "admin",
        }
    }
}

/// User record returned by the login endpoints and persisted as `userData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "super::lenient_id")]
    pub id: String,
    #[serde(rename = "nombre", alias = "name", default)]
    pub name: String,
    /// Login name; admin accounts often carry only this.
    #[serde(rename = "usuario", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Raw role label as sent by the backend.
    #[serde(rename = "rol", alias = "role", default)]
    pub role: String,
    #[serde(
        rename = "id_doctor",
        default,
        deserialize_with = "lenient_opt_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub doctor_id: Option<String>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            username: None,
            role: role.into(),
            doctor_id: None,
        }
    }

    pub fn role(&self) -> Role {
        Role::from_label(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    /// Name to show in greetings: the full name, else the login name, else the id.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => username,
            _ => &self.id,
        }
    }
}
