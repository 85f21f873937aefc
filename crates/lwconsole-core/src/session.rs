//! Session state shared by the console services.
//!
//! # Design
//! - The store only moves raw strings; parsing lives in [`SessionContext`] so
//!   every backend reports the same error kinds.
//! - Sign-out replaces the record with [`SIGNED_OUT_MARKER`] rather than
//!   deleting it, so readers can tell "signed out" from "never signed in".
//! - Last write wins. There is no locking across read-modify-write sequences.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Literal value stored in place of the session record after sign-out.
pub const SIGNED_OUT_MARKER: &str = "logout";

/// Errors raised while reading or writing the session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Nothing has been stored yet.
    #[error("no session is stored; sign in first")]
    Missing,
    /// The stored value is the sign-out marker.
    #[error("the session has been signed out")]
    SignedOut,
    /// The stored value is not a valid session record.
    #[error("stored session is malformed")]
    Malformed {
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// The backing store could not be read or written.
    #[error("session store {operation} failed for {}", path.display())]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Location of the backing store.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

/// Convenience alias for session results.
pub type SessionResult<T> = Result<T, SessionError>;

/// Directory server the session was established against.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerEndpoint {
    /// Host name or address of the directory server.
    pub host: String,
    /// Port the session was established on.
    pub port: u16,
}

/// Tokens issued for the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    /// Bearer token presented on every request.
    pub access_token: String,
    /// OIDC id token, used as the logout hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Token type reported by the issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}

/// Current-user record kept in the session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionRecord {
    /// Server the user signed in to.
    pub server: ServerEndpoint,
    /// Issued tokens.
    pub token: TokenSet,
    /// Tenant (directory domain) of the signed-in user.
    pub tenant: String,
    /// Principal name, when the sign-in flow recorded it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Raw key/value backend for the session record.
pub trait SessionStore: Send + Sync + fmt::Debug {
    /// Read the stored value, `None` when nothing was ever written.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] when the backend cannot be read.
    fn read(&self) -> SessionResult<Option<String>>;

    /// Replace the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Io`] when the backend cannot be written.
    fn write(&self, value: &str) -> SessionResult<()>;
}

/// Process-local store, the equivalent of a browser tab's session storage.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    value: Mutex<Option<String>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `value`.
    #[must_use]
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> SessionResult<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn write(&self, value: &str) -> SessionResult<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(value.to_string());
        Ok(())
    }
}

/// File-backed store so the session survives between CLI invocations.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    /// Store the session at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, operation: &'static str, source: io::Error) -> SessionError {
        SessionError::Io {
            operation,
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> SessionResult<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(self.io_error("read", err)),
        }
    }

    fn write(&self, value: &str) -> SessionResult<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| self.io_error("create_dir", err))?;
        }
        std::fs::write(&self.path, value).map_err(|err| self.io_error("write", err))
    }
}

/// Typed accessor over an injected [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    /// Wrap a store.
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Convenience constructor for an in-memory session.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    /// Parse the current-user record. Each call re-reads the store.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Missing`], [`SessionError::SignedOut`],
    /// [`SessionError::Malformed`] or a store IO error.
    pub fn current_user(&self) -> SessionResult<SessionRecord> {
        let raw = self.store.read()?.ok_or(SessionError::Missing)?;
        if raw.trim() == SIGNED_OUT_MARKER {
            return Err(SessionError::SignedOut);
        }
        serde_json::from_str(&raw).map_err(|source| SessionError::Malformed { source })
    }

    /// Persist a freshly issued record.
    ///
    /// # Errors
    ///
    /// Returns a store IO error, or [`SessionError::Malformed`] if the record
    /// cannot be serialised.
    pub fn sign_in(&self, record: &SessionRecord) -> SessionResult<()> {
        let payload =
            serde_json::to_string(record).map_err(|source| SessionError::Malformed { source })?;
        self.store.write(&payload)?;
        debug!(host = %record.server.host, tenant = %record.tenant, "session stored");
        Ok(())
    }

    /// Overwrite the record with [`SIGNED_OUT_MARKER`].
    ///
    /// # Errors
    ///
    /// Returns a store IO error.
    pub fn sign_out(&self) -> SessionResult<()> {
        self.store.write(SIGNED_OUT_MARKER)
    }

    /// Raw stored value, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns a store IO error.
    pub fn raw(&self) -> SessionResult<Option<String>> {
        self.store.read()
    }
}
