//! Command handlers grouped by concern, plus the shared execute-and-render
//! step every handler ends with.

pub(crate) mod arity;
pub(crate) mod attach;
pub(crate) mod descriptor;
pub(crate) mod register;
pub(crate) mod ssh;
pub(crate) mod vm;

use std::io;

use crate::client::{CliResult, EndpointClient, RequestIntent, ResponseOutcome};
use crate::commands::descriptor::{Descriptor, Handler, Invocation};
use crate::output::present;

/// Run the handler of `descriptor` with an already validated invocation.
pub(crate) async fn execute(
    client: &EndpointClient,
    descriptor: &Descriptor,
    invocation: &Invocation,
) -> CliResult<()> {
    match descriptor.handler {
        Handler::List => fetch(client, vm::list_request()).await,
        Handler::Config => fetch(client, vm::config_request()).await,
        Handler::Info => fetch(client, vm::info_request(invocation.name()?)).await,
        Handler::Lifecycle(verb) => fetch(client, vm::lifecycle_request(verb, invocation.name()?)).await,
        Handler::Remove => vm::handle_remove(client, invocation, &mut io::stdin().lock()).await,
        Handler::Register => register::handle_register(client, invocation).await,
        Handler::Attach(kind) => attach::handle_attach(client, kind, invocation).await,
        Handler::Ssh => ssh::handle_ssh(client, invocation).await,
    }
}

/// Send `intent` and print the response whatever its status.
pub(crate) async fn send_and_present(
    client: &EndpointClient,
    intent: RequestIntent,
) -> CliResult<ResponseOutcome> {
    let outcome = client.execute(intent).await?;
    present(&outcome, &mut io::stdout().lock())?;
    Ok(outcome)
}

async fn fetch(client: &EndpointClient, intent: RequestIntent) -> CliResult<()> {
    send_and_present(client, intent).await.map(|_| ())
}
