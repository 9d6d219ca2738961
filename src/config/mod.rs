//! TOML configuration: backend location, timeouts, session storage and
//! the diagnostic log.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{ApiConfig, Config, LoggingConfig, StorageConfig};
