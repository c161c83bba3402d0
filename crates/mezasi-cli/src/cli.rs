//! Command-line entry point: global options, endpoint setup, and dispatch.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mezasi_config::defaults::{ENV_ENDPOINT, ENV_PROFILE, ENV_PROFILES_FILE};
use mezasi_config::{DEFAULT_PROFILE, EndpointSource, resolve_endpoint};
use mezasi_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::info;

use crate::client::{CliError, CliResult, EndpointClient};
use crate::commands::descriptor::{Descriptor, Invocation, find, overview};
use crate::commands::execute;

/// Parses CLI arguments, executes the requested command, and reports any
/// error. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.logging_config()) {
        eprintln!("warning: {err}");
    }

    match dispatch(&cli).await {
        Ok(()) => 0,
        Err(err) => {
            if err.is_reported() {
                eprintln!("error: {err}");
            }
            err.exit_code()
        }
    }
}

async fn dispatch(cli: &Cli) -> CliResult<()> {
    let Some((descriptor, invocation)) = select(&cli.command)? else {
        return Ok(());
    };

    let endpoint = resolve_endpoint(&cli.endpoint_source())?;
    let client = EndpointClient::new(endpoint)?;
    info!(endpoint = %client.base_url(), "endpoint");

    execute(&client, descriptor, &invocation).await
}

/// Pick the command named by the first token and validate the rest against
/// it. Returns `Ok(None)` when only help was requested.
pub(crate) fn select(tokens: &[String]) -> CliResult<Option<(&'static Descriptor, Invocation)>> {
    let Some((name, rest)) = tokens.split_first() else {
        return Err(CliError::NoCommand {
            overview: overview(),
        });
    };
    let descriptor = find(name).ok_or_else(|| CliError::UnknownCommand { name: name.clone() })?;
    Ok(descriptor
        .parse(rest)?
        .map(|invocation| (descriptor, invocation)))
}

#[derive(Parser)]
#[command(
    name = "mezasi",
    version,
    about = "Command-line client for a remote VM management service",
    after_help = "Run without a command to list available commands."
)]
struct Cli {
    #[arg(long, env = ENV_PROFILE, default_value = DEFAULT_PROFILE, help = "Profile holding the service endpoint")]
    profile: String,
    #[arg(long, env = ENV_PROFILES_FILE, help = "Profiles file (TOML)")]
    profiles_file: Option<PathBuf>,
    #[arg(long, env = ENV_ENDPOINT, help = "Service endpoint URL; bypasses the profiles file")]
    endpoint: Option<String>,
    #[arg(long, env = "MEZASI_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, value_enum, default_value_t = LogFormatArg::Compact)]
    log_format: LogFormatArg,
    #[arg(
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND",
        help = "Command followed by its arguments"
    )]
    command: Vec<String>,
}

impl Cli {
    fn endpoint_source(&self) -> EndpointSource {
        EndpointSource {
            profile: self.profile.clone(),
            profiles_file: self.profiles_file.clone(),
            endpoint: self.endpoint.clone(),
        }
    }

    fn logging_config(&self) -> LoggingConfig<'_> {
        LoggingConfig {
            level: &self.log_level,
            format: self.log_format.into(),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogFormatArg {
    #[default]
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::descriptor::{Handler, LifecycleVerb, REMOVE_YES};

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    fn selected(values: &[&str]) -> CliResult<(&'static Descriptor, Invocation)> {
        select(&tokens(values))?.ok_or(CliError::Usage {
            message: "help displayed".to_string(),
        })
    }

    #[test]
    fn cli_collects_command_tokens_after_global_options() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from([
            "mezasi",
            "--endpoint",
            "http://vm-host/api/",
            "ssh",
            "alpha",
            "-p",
            "2222",
        ])?;
        assert_eq!(cli.endpoint.as_deref(), Some("http://vm-host/api/"));
        assert_eq!(cli.command, tokens(&["ssh", "alpha", "-p", "2222"]));
        Ok(())
    }

    #[test]
    fn cli_keeps_command_flags_for_the_command() -> Result<(), clap::Error> {
        let cli = Cli::try_parse_from(["mezasi", "remove", "alpha", "--yes"])?;
        assert_eq!(cli.command, tokens(&["remove", "alpha", "--yes"]));
        assert_eq!(cli.profile, DEFAULT_PROFILE);
        assert!(matches!(
            LogFormat::from(cli.log_format),
            LogFormat::Compact
        ));
        Ok(())
    }

    #[test]
    fn select_requires_a_command() {
        let err = select(&[]).expect_err("no command given");
        assert!(matches!(err, CliError::NoCommand { .. }));
        assert!(err.to_string().contains("public_key <name> [file]"));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn select_rejects_unknown_commands() {
        let err = select(&tokens(&["reboot", "alpha"])).expect_err("unknown command");
        assert!(matches!(err, CliError::UnknownCommand { ref name } if name == "reboot"));
    }

    #[test]
    fn select_matches_exact_names_only() {
        assert!(matches!(
            select(&tokens(&["List"])),
            Err(CliError::UnknownCommand { .. })
        ));
        assert!(matches!(
            select(&tokens(&["force"])),
            Err(CliError::UnknownCommand { .. })
        ));
    }

    #[test]
    fn select_validates_arity_before_running() {
        let err = select(&tokens(&["start"])).expect_err("name required");
        assert!(matches!(err, CliError::ArgumentCount { usage: "start <name>" }));
        let err = select(&tokens(&["list", "extra"])).expect_err("list takes nothing");
        assert!(matches!(err, CliError::ArgumentCount { usage: "list" }));
    }

    #[test]
    fn select_builds_invocation() -> CliResult<()> {
        let (descriptor, invocation) = selected(&["force_stop", "alpha"])?;
        assert_eq!(
            descriptor.handler,
            Handler::Lifecycle(LifecycleVerb::ForceStop)
        );
        assert_eq!(invocation.name()?, "alpha");

        let (descriptor, invocation) = selected(&["remove", "alpha", "--yes"])?;
        assert_eq!(descriptor.handler, Handler::Remove);
        assert!(invocation.flag(REMOVE_YES));
        Ok(())
    }

    #[test]
    fn select_allows_any_ssh_tail() -> CliResult<()> {
        let (descriptor, invocation) =
            selected(&["ssh", "alpha", "-o", "StrictHostKeyChecking=no", "uptime"])?;
        assert_eq!(descriptor.handler, Handler::Ssh);
        assert_eq!(invocation.args.len(), 4);
        assert!(matches!(
            select(&tokens(&["ssh"])),
            Err(CliError::ArgumentCount { .. })
        ));
        Ok(())
    }

    #[test]
    fn select_returns_none_for_help() -> CliResult<()> {
        assert!(select(&tokens(&["register", "--help"]))?.is_none());
        Ok(())
    }
}
