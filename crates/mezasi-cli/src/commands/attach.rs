//! `public_key` and `user_data`: fetch the current value with one argument,
//! upload a replacement file with two.

use crate::client::{CliError, CliResult, EndpointClient, FormPart, RequestIntent};
use crate::commands::descriptor::{Attachment, Invocation};
use crate::commands::send_and_present;

pub(crate) async fn attach_request(
    kind: Attachment,
    args: &[String],
    usage: &'static str,
) -> CliResult<RequestIntent> {
    match args {
        [name] => Ok(RequestIntent::get(kind.path(name))),
        [name, file] => {
            let part = FormPart::file(kind.field(), file).await?;
            Ok(RequestIntent::multipart(kind.path(name), vec![part]))
        }
        _ => Err(CliError::InvalidArguments { usage }),
    }
}

pub(crate) async fn handle_attach(
    client: &EndpointClient,
    kind: Attachment,
    invocation: &Invocation,
) -> CliResult<()> {
    let intent = attach_request(kind, &invocation.args, invocation.usage).await?;
    send_and_present(client, intent).await?;
    Ok(())
}
