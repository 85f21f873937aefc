//! Schema lookup command.

use tracing::debug;

use crate::cli::{OutputFormat, SchemaArgs};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::format_schema;

pub(crate) async fn handle_schema(
    ctx: &AppContext,
    args: SchemaArgs,
    format: OutputFormat,
) -> CliResult<String> {
    let root_dn = match args.root_dn {
        Some(root_dn) => root_dn,
        None => {
            ctx.services.auth.get_auth_header()?;
            ctx.services.auth.root_dn_query().ok_or_else(|| {
                CliError::validation("no root DN available; pass one explicitly")
            })?
        }
    };
    if root_dn.trim().is_empty() {
        return Err(CliError::validation("root DN cannot be empty"));
    }

    let fetch = ctx.services.schema.get_schema(&root_dn)?;
    debug!(url = fetch.url(), api_port = ctx.config.api_port, "fetching schema");
    let response = fetch
        .await
        .map_err(|err| CliError::from(lwconsole_core::ConsoleError::Request(err)))?;
    format_schema(&response, format)
}
