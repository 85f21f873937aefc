//! Validation helpers and parsing utilities for configuration values.

use crate::error::{ConfigError, ConfigResult};
use crate::model::ConsoleConfig;

/// Parse a TCP port, rejecting zero and out-of-range values.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when the value is not an integer in
/// `1..=65535`.
pub fn parse_port(field: &str, raw: &str) -> ConfigResult<u16> {
    let port = raw
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::invalid(field, Some(raw), "must be an integer"))?;

    if !(1..=65_535).contains(&port) {
        return Err(ConfigError::invalid(
            field,
            Some(raw),
            "must be between 1 and 65535",
        ));
    }

    u16::try_from(port)
        .map_err(|_| ConfigError::invalid(field, Some(raw), "must be between 1 and 65535"))
}

/// Parse a strictly positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for non-integers and zero.
pub fn parse_timeout_secs(field: &str, raw: &str) -> ConfigResult<u64> {
    let secs = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::invalid(field, Some(raw), "must be an integer"))?;
    if secs == 0 {
        return Err(ConfigError::invalid(field, Some(raw), "must be greater than zero"));
    }
    Ok(secs)
}

/// Parse a boolean flag accepting the usual spellings.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for anything other than
/// `true/false/1/0/yes/no`.
pub fn parse_flag(field: &str, raw: &str) -> ConfigResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::invalid(field, Some(raw), "must be a boolean")),
    }
}

/// Check invariants that serde defaults cannot express.
///
/// # Errors
///
/// Returns the first violated constraint.
pub fn validate(config: &ConsoleConfig) -> ConfigResult<()> {
    if config.api_port == 0 {
        return Err(ConfigError::invalid(
            "api_port",
            Some("0"),
            "must be between 1 and 65535",
        ));
    }
    if config.http_timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "http_timeout_secs",
            Some("0"),
            "must be greater than zero",
        ));
    }
    if config.logout.default_tenant.trim().is_empty() {
        return Err(ConfigError::invalid(
            "logout.default_tenant",
            None,
            "must not be empty",
        ));
    }
    if config.session_path.as_os_str().is_empty() {
        return Err(ConfigError::invalid("session_path", None, "must not be empty"));
    }
    Ok(())
}
