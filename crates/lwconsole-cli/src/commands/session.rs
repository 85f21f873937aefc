//! Sign-in, identity, and sign-out commands.

use lwconsole_core::{ServerEndpoint, SessionRecord, TokenSet};
use tracing::info;

use crate::cli::{LoginArgs, LogoutArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::{WhoamiView, format_logout, format_whoami};

pub(crate) fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<String> {
    if args.token.trim().is_empty() {
        return Err(CliError::validation("access token cannot be empty"));
    }
    if args.tenant.trim().is_empty() {
        return Err(CliError::validation("tenant cannot be empty"));
    }

    let record = SessionRecord {
        server: ServerEndpoint {
            host: args.host,
            port: args.port,
        },
        token: TokenSet {
            access_token: args.token,
            id_token: args.id_token,
            token_type: Some("Bearer".to_string()),
        },
        tenant: args.tenant,
        username: args.username,
    };
    ctx.services.session.sign_in(&record)?;
    info!(host = %record.server.host, tenant = %record.tenant, "signed in");

    Ok(format!(
        "Signed in to {}:{} (tenant {}).\n",
        record.server.host, record.server.port, record.tenant
    ))
}

pub(crate) fn handle_whoami(ctx: &AppContext, format: OutputFormat) -> CliResult<String> {
    let auth = &ctx.services.auth;
    let record = ctx.services.session.current_user()?;
    if let Some(username) = &record.username {
        auth.construct_root_dn_query(username);
    }
    auth.get_auth_header()?;

    let view = WhoamiView {
        server: auth.post_server()?,
        port: auth.post_port()?,
        root_dn: auth.root_dn()?,
        root_dn_query: auth.root_dn_query(),
        username: record.username,
    };
    format_whoami(&view, format)
}

pub(crate) fn handle_logout(
    ctx: &AppContext,
    args: LogoutArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let intent = ctx.services.auth.logout(&args.idp_host)?;
    format_logout(&intent, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lwconsole_config::ConsoleConfig;
    use lwconsole_core::{ConsoleServices, SIGNED_OUT_MARKER, SessionContext};
    use lwconsole_test_support::fixtures::{sample_record, signed_in_session};
    use lwconsole_test_support::mocks::RecordingTransport;
    use std::sync::Arc;

    fn context(session: SessionContext) -> AppContext {
        let config = ConsoleConfig::default();
        let services =
            ConsoleServices::with_parts(&config, session, Arc::new(RecordingTransport::new()));
        AppContext { config, services }
    }

    fn login_args() -> LoginArgs {
        LoginArgs {
            host: "dir.example.com".to_string(),
            port: 443,
            tenant: "example.com".to_string(),
            token: "tok".to_string(),
            id_token: None,
            username: Some("administrator@example.com".to_string()),
        }
    }

    #[test]
    fn login_stores_record() -> anyhow::Result<()> {
        let ctx = context(SessionContext::in_memory());
        let message = handle_login(&ctx, login_args())
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert_eq!(message, "Signed in to dir.example.com:443 (tenant example.com).\n");
        let stored = ctx.services.session.current_user()?;
        assert_eq!(stored.token.access_token, "tok");
        assert_eq!(stored.username.as_deref(), Some("administrator@example.com"));
        Ok(())
    }

    #[test]
    fn login_rejects_blank_token() {
        let ctx = context(SessionContext::in_memory());
        let args = LoginArgs {
            token: "  ".to_string(),
            ..login_args()
        };
        let err = handle_login(&ctx, args).err();
        assert!(matches!(err, Some(CliError::Validation(_))));
    }

    #[test]
    fn whoami_reports_root_dn_query_from_username() -> anyhow::Result<()> {
        let ctx = context(signed_in_session(&sample_record())?);
        let text = handle_whoami(&ctx, OutputFormat::Table)
            .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert!(text.contains("server: dir.example.com:443"));
        assert!(text.contains("root dn: example.com"));
        assert!(text.contains("root dn query: dc=example,dc=com"));
        Ok(())
    }

    #[test]
    fn whoami_without_session_is_validation_error() {
        let ctx = context(SessionContext::in_memory());
        let err = handle_whoami(&ctx, OutputFormat::Table).err();
        assert_eq!(err.map(|err| err.exit_code()), Some(2));
    }

    #[test]
    fn logout_signs_out_and_prints_url() -> anyhow::Result<()> {
        let ctx = context(signed_in_session(&sample_record())?);
        let text = handle_logout(
            &ctx,
            LogoutArgs {
                idp_host: "idp.example.com".to_string(),
            },
            OutputFormat::Json,
        )
        .map_err(|err| anyhow::anyhow!(err.display_message()))?;
        assert!(text.contains(
            "\"logout_url\": \"https://idp.example.com/openidconnect/logout/example.com?"
        ));
        assert_eq!(ctx.services.session.raw()?.as_deref(), Some(SIGNED_OUT_MARKER));
        Ok(())
    }
}
