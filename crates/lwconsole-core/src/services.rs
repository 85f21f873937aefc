//! Wiring of the console services from configuration.

use std::sync::Arc;

use lwconsole_config::ConsoleConfig;

use crate::auth::AuthService;
use crate::error::ConsoleResult;
use crate::schema::VmdirSchemaService;
use crate::session::{FileSessionStore, SessionContext};
use crate::transport::{HttpTransport, ReqwestTransport};

/// The service graph a console front end works with.
#[derive(Debug)]
pub struct ConsoleServices {
    /// Session shared by every service.
    pub session: SessionContext,
    /// Authorization state.
    pub auth: Arc<AuthService>,
    /// Schema lookups.
    pub schema: VmdirSchemaService,
}

impl ConsoleServices {
    /// Build the services with a file-backed session and a reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn from_config(config: &ConsoleConfig, request_id: &str) -> ConsoleResult<Self> {
        let session = SessionContext::new(Arc::new(FileSessionStore::new(
            config.session_path.clone(),
        )));
        let transport = ReqwestTransport::with_settings(
            config.http_timeout(),
            config.accept_invalid_certs,
            request_id,
        )?;
        Ok(Self::with_parts(config, session, Arc::new(transport)))
    }

    /// Build the services over caller-supplied session and transport.
    #[must_use]
    pub fn with_parts(
        config: &ConsoleConfig,
        session: SessionContext,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let auth = Arc::new(AuthService::from_config(session.clone(), config));
        let schema = VmdirSchemaService::new(Arc::clone(&auth), transport, config.api_port);
        Self {
            session,
            auth,
            schema,
        }
    }
}
