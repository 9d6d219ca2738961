//! Base trait for intents (user/system actions).

/// Marker trait for intent objects.
///
/// Intents represent:
/// - User actions (login, create a patient, delete a doctor)
/// - System events (restored session, backend responses, a 401)
///
/// Intents are processed by reducers to produce new states.
pub trait Intent: Send + 'static {}
