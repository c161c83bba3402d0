//! `ssh <name> ...`: look up the VM address and hand the terminal to ssh.

use std::env;
use std::ffi::OsString;

use reqwest::StatusCode;
use serde_json::Value;
use tokio::process::Command;
use tracing::info;

use crate::client::{CliError, CliResult, EndpointClient};
use crate::commands::descriptor::Invocation;
use crate::commands::vm::info_request;
use crate::output::present;

const ADDRESS_FIELD: &str = "ip_addr";
const ENV_SSH: &str = "MEZASI_SSH";

pub(crate) async fn handle_ssh(client: &EndpointClient, invocation: &Invocation) -> CliResult<()> {
    let name = invocation.name()?;
    let address = resolve_address(client, name).await?;
    info!(vm = name, %address, "connecting");
    let extra = invocation.args.get(1..).unwrap_or_default();
    run_ssh(ssh_program(), &address, extra).await
}

/// Fetch the VM info and extract its address. Anything but `200 OK` is shown
/// to the user and then reported as a failed lookup.
pub(crate) async fn resolve_address(client: &EndpointClient, name: &str) -> CliResult<String> {
    let outcome = client.execute(info_request(name)).await?;
    if outcome.status != StatusCode::OK {
        present(&outcome, &mut std::io::stdout().lock())?;
        return Err(CliError::RemoteLookup {
            status: outcome.status,
        });
    }
    extract_address(&outcome.body)
}

pub(crate) fn extract_address(body: &[u8]) -> CliResult<String> {
    let info: Value =
        serde_json::from_slice(body).map_err(|source| CliError::MalformedJson { source })?;
    info.get(ADDRESS_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(CliError::FieldMissing {
            field: ADDRESS_FIELD,
        })
}

fn ssh_program() -> OsString {
    env::var_os(ENV_SSH).unwrap_or_else(|| OsString::from("ssh"))
}

/// Run `program <address> <extra>...` on the inherited terminal; a non-zero
/// exit becomes this process's exit code.
pub(crate) async fn run_ssh(program: OsString, address: &str, extra: &[String]) -> CliResult<()> {
    let status = Command::new(program)
        .arg(address)
        .args(extra)
        .status()
        .await
        .map_err(|source| CliError::Ssh { source })?;
    if status.success() {
        Ok(())
    } else {
        Err(CliError::ChildExit {
            code: status.code().unwrap_or(1),
        })
    }
}
