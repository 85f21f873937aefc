//! CLI error type and the per-invocation context.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use lwconsole_config::{ConfigError, ConsoleConfig};
use lwconsole_core::{ConsoleError, ConsoleServices, SessionError};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<SessionError> for CliError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::Missing | SessionError::SignedOut => {
                Self::validation(format!("{error} (run `lwconsole login`)"))
            }
            SessionError::Malformed { .. } => Self::validation(format!(
                "{error}; sign in again with `lwconsole login`"
            )),
            SessionError::Io { .. } => Self::failure(error),
        }
    }
}

impl From<ConsoleError> for CliError {
    fn from(error: ConsoleError) -> Self {
        match error {
            ConsoleError::Session(session) => session.into(),
            ConsoleError::Request(request) => Self::failure(anyhow!("{}", request.message())),
            other => Self::failure(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::InvalidField { .. } => Self::validation(error.to_string()),
            ConfigError::Io { .. } | ConfigError::Parse { .. } => Self::failure(error),
        }
    }
}

/// Application context passed to command handlers.
#[derive(Debug)]
pub(crate) struct AppContext {
    pub(crate) config: ConsoleConfig,
    pub(crate) services: ConsoleServices,
}
