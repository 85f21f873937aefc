//! Typed console settings.
//!
//! # Design
//! - Pure data carriers; IO lives in `loader.rs`.
//! - Every field has a default so a missing file still yields a usable config.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Port the directory REST head listens on out of the box.
pub const DEFAULT_API_PORT: u16 = 7478;
/// Default HTTP timeout applied to directory requests.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
/// Tenant used when no session is available to name one.
pub const DEFAULT_TENANT: &str = "lightwave.local";

/// How the root DN fallback read from the session is treated.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RootDnResolution {
    /// Re-read the session tenant on every call until a root DN is recorded.
    #[default]
    Fresh,
    /// Persist the first tenant read as the root DN.
    Memoized,
}

impl RootDnResolution {
    /// Render the mode as its lowercase string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Memoized => "memoized",
        }
    }
}

impl FromStr for RootDnResolution {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "fresh" => Ok(Self::Fresh),
            "memoized" => Ok(Self::Memoized),
            other => Err(ConfigError::invalid(
                "root_dn_resolution",
                Some(other),
                "must be 'fresh' or 'memoized'",
            )),
        }
    }
}

/// Identity provider logout parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogoutSettings {
    /// Where the identity provider sends the browser after sign-out.
    pub post_logout_redirect_uri: String,
    /// Tenant used in the logout path when the session does not name one.
    pub default_tenant: String,
}

impl Default for LogoutSettings {
    fn default() -> Self {
        Self {
            post_logout_redirect_uri: "https://localhost/lwraftui".to_string(),
            default_tenant: DEFAULT_TENANT.to_string(),
        }
    }
}

/// Complete console configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Directory REST API port used verbatim in request URLs.
    pub api_port: u16,
    /// Request timeout in seconds.
    pub http_timeout_secs: u64,
    /// Skip TLS certificate verification (self-signed appliance certificates).
    pub accept_invalid_certs: bool,
    /// Root DN fallback behaviour.
    pub root_dn_resolution: RootDnResolution,
    /// Logout URL parameters.
    pub logout: LogoutSettings,
    /// File backing the session store.
    pub session_path: PathBuf,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            accept_invalid_certs: false,
            root_dn_resolution: RootDnResolution::default(),
            logout: LogoutSettings::default(),
            session_path: default_session_path(),
        }
    }
}

impl ConsoleConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn default_session_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".lwconsole")
        .join("session.json")
}
