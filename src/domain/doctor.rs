use serde::{Deserialize, Serialize};

use super::Entity;

/// Whether a doctor currently takes appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoctorStatus {
    #[default]
    #[serde(rename = "activo", alias = "active")]
    Active,
    #[serde(rename = "inactivo", alias = "inactive")]
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    /// Empty until the backend assigns one; omitted from create payloads.
    #[serde(
        deserialize_with = "super::lenient_id",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub id: String,
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "correo", alias = "email", default)]
    pub email: String,
    #[serde(rename = "telefono", alias = "phone", default)]
    pub phone: String,
    #[serde(rename = "especialidad", alias = "specialty", default)]
    pub specialty: String,
    #[serde(default)]
    pub status: DoctorStatus,
}

impl Entity for Doctor {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Login credentials created alongside a new doctor (`POST /usuarios`).
#[derive(Debug, Clone, Serialize)]
pub struct DoctorCredentials {
    #[serde(rename = "id_doctor")]
    pub doctor_id: String,
    #[serde(rename = "usuario")]
    pub username: String,
    #[serde(rename = "contraseña")]
    pub password: String,
    #[serde(rename = "rol")]
    pub role: String,
}

impl DoctorCredentials {
    /// Credentials with the default `doctor` role; the doctor id is filled
    /// in once the backend has created the doctor.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            doctor_id: String::new(),
            username: username.into(),
            password: password.into(),
            role: "doctor".to_string(),
        }
    }
}
