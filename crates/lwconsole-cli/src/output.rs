//! Output renderers and formatting helpers for CLI commands.

use std::fmt::Write as _;

use anyhow::anyhow;
use lwconsole_core::{HttpResponse, LogoutIntent};
use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Identity summary printed by `whoami`.
#[derive(Debug, Serialize)]
pub(crate) struct WhoamiView {
    pub(crate) server: String,
    pub(crate) port: u16,
    pub(crate) root_dn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) root_dn_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) username: Option<String>,
}

pub(crate) fn format_schema(response: &HttpResponse, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(&response.body),
        OutputFormat::Table => {
            let Some(entries) = response.body.get("result").and_then(Value::as_array) else {
                return to_pretty_json(&response.body);
            };
            let mut out = String::new();
            for entry in entries {
                let dn = entry.get("dn").and_then(Value::as_str).unwrap_or("<no dn>");
                let _ = writeln!(out, "dn: {dn}");
                let _ = writeln!(out, "{:<32} {:>6}", "ATTRIBUTE", "VALUES");
                let attributes = entry
                    .get("attributes")
                    .and_then(Value::as_array)
                    .map_or(&[][..], Vec::as_slice);
                for attribute in attributes {
                    let name = attribute
                        .get("type")
                        .and_then(Value::as_str)
                        .unwrap_or("<unnamed>");
                    let count = attribute
                        .get("value")
                        .and_then(Value::as_array)
                        .map_or(0, Vec::len);
                    let _ = writeln!(out, "{name:<32} {count:>6}");
                }
            }
            if entries.is_empty() {
                out.push_str("no schema entries returned\n");
            }
            Ok(out)
        }
    }
}

pub(crate) fn format_whoami(view: &WhoamiView, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(view),
        OutputFormat::Table => {
            let mut out = String::new();
            let _ = writeln!(out, "server: {}:{}", view.server, view.port);
            let _ = writeln!(out, "root dn: {}", view.root_dn);
            if let Some(query) = &view.root_dn_query {
                let _ = writeln!(out, "root dn query: {query}");
            }
            if let Some(username) = &view.username {
                let _ = writeln!(out, "user: {username}");
            }
            Ok(out)
        }
    }
}

pub(crate) fn format_logout(intent: &LogoutIntent, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_pretty_json(&serde_json::json!({ "logout_url": intent.url })),
        OutputFormat::Table => Ok(format!(
            "Signed out. Finish at the identity provider:\n{}\n",
            intent.url
        )),
    }
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map(|mut text| {
            text.push('\n');
            text
        })
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema_response() -> HttpResponse {
        HttpResponse {
            status: 200,
            body: json!({
                "result": [{
                    "dn": "cn=dc=test,dc=com,cn=schemacontext",
                    "attributes": [
                        {
                            "type": "attributetypes",
                            "value": ["( 1.1 NAME 'a' )", "( 1.2 NAME 'b' )"]
                        },
                        { "type": "objectclasses", "value": ["( 2.1 NAME 'top' )"] }
                    ]
                }],
                "result_count": 1
            }),
        }
    }

    #[test]
    fn schema_table_counts_attribute_values() -> CliResult<()> {
        let text = format_schema(&schema_response(), OutputFormat::Table)?;
        assert!(text.starts_with("dn: cn=dc=test,dc=com,cn=schemacontext\n"));
        assert!(text.contains(&format!("{:<32} {:>6}", "attributetypes", 2)));
        assert!(text.contains(&format!("{:<32} {:>6}", "objectclasses", 1)));
        Ok(())
    }

    #[test]
    fn schema_table_falls_back_to_json_for_unknown_shapes() -> CliResult<()> {
        let response = HttpResponse {
            status: 200,
            body: json!({ "unexpected": true }),
        };
        let text = format_schema(&response, OutputFormat::Table)?;
        assert!(text.contains("\"unexpected\": true"));
        Ok(())
    }

    #[test]
    fn whoami_json_omits_missing_fields() -> CliResult<()> {
        let view = WhoamiView {
            server: "dir".to_string(),
            port: 443,
            root_dn: "example.com".to_string(),
            root_dn_query: None,
            username: None,
        };
        let text = format_whoami(&view, OutputFormat::Json)?;
        assert!(!text.contains("root_dn_query"));
        assert!(text.contains("\"root_dn\": \"example.com\""));
        Ok(())
    }

    #[test]
    fn logout_table_prints_url() -> CliResult<()> {
        let text = format_logout(
            &LogoutIntent {
                url: "https://idp/openidconnect/logout/t".to_string(),
            },
            OutputFormat::Table,
        )?;
        assert!(text.ends_with("https://idp/openidconnect/logout/t\n"));
        Ok(())
    }
}
