//! Error normalisation and the crate-level error type.

use thiserror::Error;

use crate::session::SessionError;
use crate::transport::TransportError;

/// Message used when a failure carries nothing more specific.
pub const GENERIC_SERVER_ERROR: &str = "Server error";

/// Display-ready failure delivered to awaiters of a directory request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    message: String,
}

impl RequestError {
    /// Wrap an already normalised message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The normalised message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&TransportError> for RequestError {
    fn from(error: &TransportError) -> Self {
        Self::new(normalize_message(error))
    }
}

/// Derive the user-facing message for a transport failure.
///
/// A non-empty message wins; otherwise an HTTP status renders as
/// `"<status> - <status_text>"`; anything else is [`GENERIC_SERVER_ERROR`].
#[must_use]
pub fn normalize_message(error: &TransportError) -> String {
    match error {
        TransportError::Network { message } | TransportError::Decode { message }
            if !message.trim().is_empty() =>
        {
            message.clone()
        }
        TransportError::Http {
            status,
            status_text,
        } => format!("{status} - {status_text}"),
        TransportError::Network { .. }
        | TransportError::Decode { .. }
        | TransportError::Unknown => GENERIC_SERVER_ERROR.to_string(),
    }
}

/// Errors surfaced by the console services.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The session could not supply server, token, or tenant.
    #[error(transparent)]
    Session(#[from] SessionError),
    /// A directory request failed.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Source reqwest error.
        source: reqwest::Error,
    },
    /// The request identifier is not a valid header value.
    #[error("request identifier '{value}' contains invalid characters")]
    InvalidRequestId {
        /// Rejected identifier.
        value: String,
    },
    /// A request URL could not be parsed.
    #[error("invalid request URL '{url}'")]
    InvalidUrl {
        /// URL text that failed to parse.
        url: String,
        /// Source parse error.
        source: url::ParseError,
    },
}

/// Convenience alias for console results.
pub type ConsoleResult<T> = Result<T, ConsoleError>;
