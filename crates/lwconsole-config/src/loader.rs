//! Configuration loading from a JSON document and `LWCONSOLE_*` overrides.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::{ConsoleConfig, RootDnResolution};
use crate::validate::{parse_flag, parse_port, parse_timeout_secs, validate};

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "LWCONSOLE_";

/// Load configuration from an optional file, then apply process environment
/// overrides and validate the result.
///
/// # Errors
///
/// Returns an error when the file cannot be read or parsed, when an override
/// holds an invalid value, or when validation fails.
pub fn load(path: Option<&Path>) -> ConfigResult<ConsoleConfig> {
    let base = match path {
        Some(path) => load_from_file(path)?,
        None => ConsoleConfig::default(),
    };
    let config = apply_overrides(base, |key| std::env::var(key).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Parse a configuration document without consulting the environment.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] or [`ConfigError::Parse`].
pub fn load_from_file(path: &Path) -> ConfigResult<ConsoleConfig> {
    let payload = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = serde_json::from_str(&payload).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded console configuration");
    Ok(config)
}

/// Apply overrides resolved through `lookup`, keyed by full variable name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for malformed override values.
pub fn apply_overrides<F>(mut config: ConsoleConfig, lookup: F) -> ConfigResult<ConsoleConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

    if let Some(raw) = var("API_PORT") {
        config.api_port = parse_port("api_port", &raw)?;
    }
    if let Some(raw) = var("HTTP_TIMEOUT_SECS") {
        config.http_timeout_secs = parse_timeout_secs("http_timeout_secs", &raw)?;
    }
    if let Some(raw) = var("ACCEPT_INVALID_CERTS") {
        config.accept_invalid_certs = parse_flag("accept_invalid_certs", &raw)?;
    }
    if let Some(raw) = var("ROOT_DN_RESOLUTION") {
        config.root_dn_resolution = raw.parse::<RootDnResolution>()?;
    }
    if let Some(raw) = var("POST_LOGOUT_REDIRECT_URI") {
        config.logout.post_logout_redirect_uri = raw;
    }
    if let Some(raw) = var("DEFAULT_TENANT") {
        config.logout.default_tenant = raw;
    }
    if let Some(raw) = var("SESSION_PATH") {
        config.session_path = PathBuf::from(raw);
    }

    Ok(config)
}
