//! Payment service configuration.

use astradock_platform::env::{required, required_parse, ConfigError};
use std::time::Duration;

/// Full configuration of the payment service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind, e.g. `0.0.0.0:8082`.
    pub bind_addr: String,
    /// Budget for graceful shutdown.
    pub shutdown_timeout: Duration,
    /// Default level when `RUST_LOG` is unset.
    pub log_level: String,
    /// Emit JSON records instead of the human format.
    pub log_as_json: bool,
}

impl Config {
    /// Load from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on the first missing or unparsable
    /// variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: required("HTTP_ADDR")?,
            shutdown_timeout: Duration::from_secs(required_parse("SHUTDOWN_TIMEOUT_SECS")?),
            log_level: required("LOG_LEVEL")?,
            log_as_json: required_parse("LOG_AS_JSON")?,
        })
    }
}
