//! Clinic records mirrored from the backend.
//!
//! Field names follow the backend's wire format through serde renames and
//! aliases; the Rust side always uses English names.

mod appointment;
mod doctor;
mod patient;
mod user;

pub use appointment::Appointment;
pub use doctor::{Doctor, DoctorCredentials, DoctorStatus};
pub use patient::Patient;
pub use user::{Role, UserRecord};

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer};

/// A record with a string identity.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

static LAST_ID: AtomicU64 = AtomicU64::new(0);

/// Time-based id for records created locally.
///
/// Milliseconds since the epoch, bumped by one when two ids are requested
/// within the same millisecond so the result is strictly increasing.
pub fn generate_id() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut last = LAST_ID.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_ID.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next.to_string(),
            Err(actual) => last = actual,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        }
    }
}

/// Accept ids sent either as JSON strings or JSON integers.
pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub(crate) fn lenient_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
