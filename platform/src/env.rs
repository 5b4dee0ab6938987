//! Strict environment-variable configuration helpers.
//!
//! Every service loads its configuration exclusively from the
//! environment, and every variable is required: a missing one is a
//! startup error, not a silent default. When `APP_ENV=local` a dotenv
//! file supplies the variables for local runs; its absence is not an
//! error.

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set or empty.
    #[error("required environment variable {0} is not set")]
    Missing(String),

    /// A variable is set but cannot be parsed into its target type.
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    Invalid {
        /// Variable name.
        name: String,
        /// Raw value found in the environment.
        value: String,
        /// Parse failure description.
        reason: String,
    },

    /// The dotenv file exists but could not be read.
    #[error("failed to load dotenv file: {0}")]
    Dotenv(String),
}

/// Load `.env` when running with `APP_ENV=local`.
///
/// A missing file is fine; a present but unreadable one is an error.
///
/// # Errors
///
/// Returns [`ConfigError::Dotenv`] if the file exists but fails to load.
pub fn load_dotenv_if_local() -> Result<(), ConfigError> {
    if env::var("APP_ENV").as_deref() != Ok("local") {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::Dotenv(e.to_string())),
    }
}

/// Read a required variable.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if the variable is unset or blank.
pub fn required(name: &str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name.to_string())),
    }
}

/// Read and parse a required variable.
///
/// # Errors
///
/// Returns [`ConfigError::Missing`] if unset, [`ConfigError::Invalid`]
/// if it does not parse as `T`.
pub fn required_parse<T>(name: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = required(name)?;
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name: name.to_string(),
        value: raw,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_is_an_error() {
        let err = required("ASTRADOCK_TEST_SURELY_UNSET").unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn parse_failure_reports_name_and_value() {
        env::set_var("ASTRADOCK_TEST_BAD_PORT", "not-a-port");
        let err = required_parse::<u16>("ASTRADOCK_TEST_BAD_PORT").unwrap_err();
        match err {
            ConfigError::Invalid { name, value, .. } => {
                assert_eq!(name, "ASTRADOCK_TEST_BAD_PORT");
                assert_eq!(value, "not-a-port");
            }
            other => panic!("unexpected error: {other}"),
        }
        env::remove_var("ASTRADOCK_TEST_BAD_PORT");
    }

    #[test]
    fn present_variable_is_returned() {
        env::set_var("ASTRADOCK_TEST_PRESENT", "value");
        assert_eq!(required("ASTRADOCK_TEST_PRESENT").unwrap(), "value");
        env::remove_var("ASTRADOCK_TEST_PRESENT");
    }
}
