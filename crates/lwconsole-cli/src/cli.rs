//! Command-line client for a Lightwave directory server.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lwconsole_config::ConsoleConfig;
use lwconsole_core::ConsoleServices;
use lwconsole_telemetry::{LogFormat, LoggingConfig, init_logging};
use tracing::debug;
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::schema::handle_schema;
use crate::commands::session::{handle_login, handle_logout, handle_whoami};

/// Parses CLI arguments, executes the requested command, and prints its
/// output. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);

    let mut logging = LoggingConfig::default();
    if let Some(format) = cli.log_format {
        logging.format = format;
    }
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err}");
    }

    let request_id = Uuid::new_v4().to_string();
    debug!(command = command_name, request_id = %request_id, "dispatching command");

    match dispatch(cli, &request_id).await {
        Ok(output) => {
            print!("{output}");
            0
        }
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli, request_id: &str) -> CliResult<String> {
    let ctx = build_context(cli.config.as_deref(), cli.session_file, request_id)?;

    match cli.command {
        Command::Login(args) => handle_login(&ctx, args),
        Command::Whoami => handle_whoami(&ctx, cli.output),
        Command::Schema(args) => handle_schema(&ctx, args, cli.output).await,
        Command::Logout(args) => handle_logout(&ctx, args, cli.output),
    }
}

fn build_context(
    config_path: Option<&std::path::Path>,
    session_file: Option<PathBuf>,
    request_id: &str,
) -> CliResult<AppContext> {
    let mut config: ConsoleConfig = lwconsole_config::load(config_path)?;
    if let Some(path) = session_file {
        config.session_path = path;
    }
    let services = ConsoleServices::from_config(&config, request_id)?;
    Ok(AppContext { config, services })
}

#[derive(Parser)]
#[command(
    name = "lwconsole",
    about = "Administrative CLI for Lightwave directory servers"
)]
struct Cli {
    #[arg(long, global = true, env = "LWCONSOLE_CONFIG")]
    config: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Session file to use instead of the configured one"
    )]
    session_file: Option<PathBuf>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "LWCONSOLE_LOG_FORMAT", value_parser = parse_log_format)]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a session for a directory server.
    Login(LoginArgs),
    /// Show the server and directory root of the current session.
    Whoami,
    /// Fetch the schema entry for a directory root.
    Schema(SchemaArgs),
    /// Sign out and print the identity provider logout URL.
    Logout(LogoutArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, help = "Directory server host")]
    pub(crate) host: String,
    #[arg(long, default_value_t = 443, help = "Port the session is established on")]
    pub(crate) port: u16,
    #[arg(long, help = "Tenant (directory domain)")]
    pub(crate) tenant: String,
    #[arg(long, env = "LWCONSOLE_ACCESS_TOKEN", help = "Bearer access token")]
    pub(crate) token: String,
    #[arg(long, help = "OIDC id token, used as the logout hint")]
    pub(crate) id_token: Option<String>,
    #[arg(long, help = "Principal name, e.g. administrator@example.com")]
    pub(crate) username: Option<String>,
}

#[derive(Args)]
pub(crate) struct SchemaArgs {
    #[arg(help = "Root DN; defaults to the session's dc= root")]
    pub(crate) root_dn: Option<String>,
}

#[derive(Args)]
pub(crate) struct LogoutArgs {
    #[arg(long, help = "Identity provider host")]
    pub(crate) idp_host: String,
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Whoami => "whoami",
        Command::Schema(_) => "schema",
        Command::Logout(_) => "logout",
    }
}

fn parse_log_format(input: &str) -> Result<LogFormat, String> {
    input.parse::<LogFormat>().map_err(|err| err.to_string())
}
