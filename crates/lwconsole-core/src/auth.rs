//! Authorization header and directory-root context for the signed-in user.
//!
//! # Design
//! - The bearer header is built once and handed out as a shared `Arc`.
//! - Session reads happen outside the state lock; the lock only guards the
//!   memoized fields.
//! - Logout is returned as a [`LogoutIntent`]; the caller decides how to
//!   navigate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lwconsole_config::{ConsoleConfig, LogoutSettings, RootDnResolution};
use rand::{Rng, distr::Alphanumeric};
use tracing::{debug, error, info};

use crate::dn::{self, LogoutRequest};
use crate::error::{RequestError, normalize_message};
use crate::session::{SessionContext, SessionResult};
use crate::transport::TransportError;

const LOGOUT_STATE_LEN: usize = 24;

/// `Authorization: Bearer <token>` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    value: String,
}

impl AuthHeader {
    /// Build a bearer header. The token is used as given.
    #[must_use]
    pub fn bearer(token: &str) -> Self {
        Self {
            value: format!("Bearer {token}"),
        }
    }

    /// Full header value, including the scheme.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Navigation the caller should perform once the session is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct LogoutIntent {
    /// Identity provider logout URL.
    pub url: String,
}

#[derive(Debug, Default)]
struct AuthState {
    domain: Option<String>,
    header: Option<Arc<AuthHeader>>,
    root_dn: Option<String>,
    root_dn_query: Option<String>,
}

/// Per-session authentication state.
#[derive(Debug)]
pub struct AuthService {
    session: SessionContext,
    resolution: RootDnResolution,
    logout: LogoutSettings,
    state: Mutex<AuthState>,
}

impl AuthService {
    /// Create a service reading from `session`.
    #[must_use]
    pub fn new(
        session: SessionContext,
        resolution: RootDnResolution,
        logout: LogoutSettings,
    ) -> Self {
        Self {
            session,
            resolution,
            logout,
            state: Mutex::new(AuthState::default()),
        }
    }

    /// Create a service using the resolution mode and logout settings from `config`.
    #[must_use]
    pub fn from_config(session: SessionContext, config: &ConsoleConfig) -> Self {
        Self::new(session, config.root_dn_resolution, config.logout.clone())
    }

    /// Session this service reads from.
    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Return the cached header, building it from the session on first use.
    ///
    /// Building also resolves and stores the root DN and its query.
    ///
    /// # Errors
    ///
    /// Propagates any [`crate::SessionError`] raised while reading the session.
    pub fn get_auth_header(&self) -> SessionResult<Arc<AuthHeader>> {
        if let Some(header) = self.state().header.clone() {
            return Ok(header);
        }

        let server = self.post_server()?;
        let token = self.token()?;
        let root_dn = self.root_dn()?;
        let root_dn_query = dn::root_dn_query(&root_dn);

        let mut state = self.state();
        if let Some(existing) = state.header.clone() {
            return Ok(existing);
        }
        let header = Arc::new(AuthHeader::bearer(&token));
        state.domain = Some(server);
        state.header = Some(Arc::clone(&header));
        state.root_dn = Some(root_dn);
        state.root_dn_query = Some(root_dn_query);
        drop(state);

        debug!("authorization header constructed from session");
        Ok(header)
    }

    /// Server host: the recorded domain, else the session's `server.host`.
    ///
    /// # Errors
    ///
    /// Propagates session read failures.
    pub fn post_server(&self) -> SessionResult<String> {
        if let Some(domain) = self.state().domain.clone() {
            return Ok(domain);
        }
        Ok(self.session.current_user()?.server.host)
    }

    /// Server port from the session's `server.port`. Never cached.
    ///
    /// # Errors
    ///
    /// Propagates session read failures.
    pub fn post_port(&self) -> SessionResult<u16> {
        Ok(self.session.current_user()?.server.port)
    }

    /// Access token from the session. Never cached.
    ///
    /// # Errors
    ///
    /// Propagates session read failures.
    pub fn token(&self) -> SessionResult<String> {
        Ok(self.session.current_user()?.token.access_token)
    }

    /// Root DN: the recorded value, else the session tenant.
    ///
    /// With [`RootDnResolution::Fresh`] the tenant read is not recorded, so a
    /// later call sees a changed session. With [`RootDnResolution::Memoized`]
    /// the first read sticks.
    ///
    /// # Errors
    ///
    /// Propagates session read failures.
    pub fn root_dn(&self) -> SessionResult<String> {
        if let Some(root_dn) = self.state().root_dn.clone() {
            return Ok(root_dn);
        }
        let tenant = self.session.current_user()?.tenant;
        if self.resolution == RootDnResolution::Memoized {
            let mut state = self.state();
            if state.root_dn.is_none() {
                state.root_dn_query = Some(dn::root_dn_query(&tenant));
                state.root_dn = Some(tenant.clone());
            }
        }
        Ok(tenant)
    }

    /// Recorded `dc=` query for the root DN, if one has been derived.
    #[must_use]
    pub fn root_dn_query(&self) -> Option<String> {
        self.state().root_dn_query.clone()
    }

    /// Record the root DN from a principal name (`user@domain`).
    pub fn construct_root_dn_query(&self, username: &str) {
        let domain = dn::domain_from_username(username).to_string();
        let query = dn::root_dn_query(&domain);
        debug!(root_dn = %domain, root_dn_query = %query, "root DN recorded");

        let mut state = self.state();
        state.root_dn = Some(domain);
        state.root_dn_query = Some(query);
    }

    /// Record the domain and replace the header with one built from `token`.
    pub fn construct_auth_header(&self, tenant: &str, token: &str) {
        let mut state = self.state();
        state.domain = Some(tenant.to_string());
        state.header = Some(Arc::new(AuthHeader::bearer(token)));
    }

    /// Sign out: overwrite the session with the sign-out marker and return
    /// the identity provider URL the caller should navigate to.
    ///
    /// The previous session contents, valid or not, only feed the URL's
    /// tenant and id token hint.
    ///
    /// # Errors
    ///
    /// Returns a store IO error if the marker cannot be written.
    pub fn logout(&self, idp_host: &str) -> SessionResult<LogoutIntent> {
        let record = self.session.current_user().ok();
        let tenant = record
            .as_ref()
            .map_or(self.logout.default_tenant.as_str(), |record| {
                record.tenant.as_str()
            });
        let id_token = record
            .as_ref()
            .and_then(|record| record.token.id_token.as_deref());
        let state = random_state();

        let url = dn::logout_url(&LogoutRequest {
            idp_host,
            tenant,
            id_token,
            post_logout_redirect_uri: &self.logout.post_logout_redirect_uri,
            state: &state,
        });

        self.session.sign_out()?;
        *self.state() = AuthState::default();
        info!(idp_host, tenant, "session signed out");
        Ok(LogoutIntent { url })
    }

    /// Normalise a transport failure, log it, and return it as a request error.
    #[must_use]
    pub fn handle_error(error: &TransportError) -> RequestError {
        let message = normalize_message(error);
        debug!(?error, "directory request failed");
        error!(error = %message, "directory request failed");
        RequestError::new(message)
    }

    fn state(&self) -> MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn random_state() -> String {
    let mut rng = rand::rng();
    std::iter::repeat_with(|| rng.sample(Alphanumeric) as char)
        .take(LOGOUT_STATE_LEN)
        .collect()
}
