use std::path::PathBuf;

use tracing::{info, warn};

use crate::client::{CliError, CliResult, EndpointClient, FormPart, RequestIntent};
use crate::commands::descriptor::{
    Invocation, REGISTER_BASE, REGISTER_NAME, REGISTER_PUBLIC_KEY, REGISTER_USER_DATA,
    REGISTER_WAIT,
};
use crate::commands::send_and_present;
use crate::commands::vm::notify_request;

/// Validated `register` options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegisterOptions {
    pub(crate) name: String,
    pub(crate) base: String,
    pub(crate) public_key: Option<PathBuf>,
    pub(crate) user_data: Option<PathBuf>,
    pub(crate) wait: bool,
}

impl RegisterOptions {
    pub(crate) fn from_invocation(invocation: &Invocation) -> CliResult<Self> {
        let required = |option: &'static str| {
            let value = invocation.text(option);
            if value.is_empty() {
                Err(CliError::MissingRequiredOption {
                    option,
                    usage: invocation.usage,
                })
            } else {
                Ok(value.to_string())
            }
        };
        let optional_path = |option: &str| {
            Some(invocation.text(option))
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
        };

        Ok(Self {
            name: required(REGISTER_NAME)?,
            base: required(REGISTER_BASE)?,
            public_key: optional_path(REGISTER_PUBLIC_KEY),
            user_data: optional_path(REGISTER_USER_DATA),
            wait: invocation.flag(REGISTER_WAIT),
        })
    }
}

/// Multipart registration request. Attachment files are read here, so a
/// missing file fails before anything is sent.
pub(crate) async fn register_request(options: &RegisterOptions) -> CliResult<RequestIntent> {
    let mut parts = vec![
        FormPart::text("name", options.name.as_str()),
        FormPart::text("base", options.base.as_str()),
    ];
    if let Some(path) = &options.public_key {
        parts.push(FormPart::file("public_key", path).await?);
    }
    if let Some(path) = &options.user_data {
        parts.push(FormPart::file("user_data", path).await?);
    }
    Ok(RequestIntent::multipart("vm/register", parts))
}

pub(crate) async fn handle_register(client: &EndpointClient, invocation: &Invocation) -> CliResult<()> {
    let options = RegisterOptions::from_invocation(invocation)?;
    let intent = register_request(&options).await?;
    info!(vm = %options.name, base = %options.base, "registering vm");
    let outcome = send_and_present(client, intent).await?;

    if !options.wait {
        return Ok(());
    }
    if !outcome.status.is_success() {
        warn!(status = %outcome.status, "registration failed; not waiting for boot up");
        return Ok(());
    }

    info!("waiting for vm boot up...");
    send_and_present(client, notify_request(&options.name)).await?;
    info!(vm = %options.name, "vm boot up reported");
    Ok(())
}
