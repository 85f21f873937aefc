//! Session fixtures.

use std::sync::Arc;

use lwconsole_core::{
    MemorySessionStore, ServerEndpoint, SessionContext, SessionRecord, SessionResult, TokenSet,
};

/// Host used by [`sample_record`].
pub const SAMPLE_HOST: &str = "dir.example.com";
/// Tenant used by [`sample_record`].
pub const SAMPLE_TENANT: &str = "example.com";
/// Access token used by [`sample_record`].
pub const SAMPLE_TOKEN: &str = "access-token";

/// A complete record as the sign-in flow would store it.
#[must_use]
pub fn sample_record() -> SessionRecord {
    record_for(SAMPLE_HOST, SAMPLE_TENANT, SAMPLE_TOKEN)
}

/// Record for an arbitrary host, tenant, and token.
#[must_use]
pub fn record_for(host: &str, tenant: &str, token: &str) -> SessionRecord {
    SessionRecord {
        server: ServerEndpoint {
            host: host.to_string(),
            port: 443,
        },
        token: TokenSet {
            access_token: token.to_string(),
            id_token: Some("id-token".to_string()),
            token_type: Some("Bearer".to_string()),
        },
        tenant: tenant.to_string(),
        username: Some(format!("administrator@{tenant}")),
    }
}

/// In-memory session already holding `record`.
///
/// # Errors
///
/// Propagates the store write error (never raised by the memory store).
pub fn signed_in_session(record: &SessionRecord) -> SessionResult<SessionContext> {
    let session = SessionContext::new(Arc::new(MemorySessionStore::new()));
    session.sign_in(record)?;
    Ok(session)
}

/// In-memory session holding an arbitrary raw value.
#[must_use]
pub fn raw_session(value: &str) -> SessionContext {
    SessionContext::new(Arc::new(MemorySessionStore::with_value(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_in_session_round_trips_sample() -> SessionResult<()> {
        let session = signed_in_session(&sample_record())?;
        assert_eq!(session.current_user()?, sample_record());
        Ok(())
    }

    #[test]
    fn raw_session_exposes_value() -> SessionResult<()> {
        let session = raw_session("logout");
        assert_eq!(session.raw()?.as_deref(), Some("logout"));
        Ok(())
    }
}
