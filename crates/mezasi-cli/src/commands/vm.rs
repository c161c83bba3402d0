use std::io::BufRead;

use anyhow::anyhow;
use tracing::info;

use crate::client::{CliError, CliResult, EndpointClient, RequestIntent};
use crate::commands::descriptor::{Invocation, LifecycleVerb, REMOVE_YES};
use crate::commands::send_and_present;

pub(crate) fn list_request() -> RequestIntent {
    RequestIntent::get("vm/list")
}

pub(crate) fn config_request() -> RequestIntent {
    RequestIntent::get("config")
}

pub(crate) fn info_request(name: &str) -> RequestIntent {
    RequestIntent::get(format!("vm/info/{name}"))
}

pub(crate) fn lifecycle_request(verb: LifecycleVerb, name: &str) -> RequestIntent {
    RequestIntent::post(verb.path(name))
}

pub(crate) fn remove_request(name: &str) -> RequestIntent {
    RequestIntent::post(format!("vm/remove/{name}"))
}

/// Blocks on the server until the VM reports boot completion.
pub(crate) fn notify_request(name: &str) -> RequestIntent {
    RequestIntent::get(format!("notify/{name}"))
}

/// Remove a VM, asking on `input` first unless `--yes` was given.
pub(crate) async fn handle_remove(
    client: &EndpointClient,
    invocation: &Invocation,
    input: &mut impl BufRead,
) -> CliResult<()> {
    let name = invocation.name()?;
    if !invocation.flag(REMOVE_YES) {
        println!("Really remove {name}? [y/N]");
        confirm(input)?;
    }
    info!(vm = name, "removing vm");
    send_and_present(client, remove_request(name)).await?;
    Ok(())
}

/// Read one line and accept it only when its first character is `y` or `Y`.
pub(crate) fn confirm(input: &mut impl BufRead) -> CliResult<()> {
    let mut line = String::new();
    input
        .read_line(&mut line)
        .map_err(|err| CliError::failure(anyhow!("failed to read confirmation: {err}")))?;
    match line.chars().next() {
        Some('y' | 'Y') => Ok(()),
        _ => Err(CliError::UserDeclined),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::descriptor::find;
    use anyhow::Result;
    use httpmock::prelude::*;
    use reqwest::Method;

    fn client_for(server: &MockServer) -> Result<EndpointClient> {
        Ok(EndpointClient::new(server.base_url().parse()?)?)
    }

    fn remove_invocation(yes: bool) -> Invocation {
        Invocation::new("remove <name>", vec!["alpha".to_string()]).with_flag(REMOVE_YES, yes)
    }

    #[test]
    fn fixed_resources_use_get_without_body() {
        assert_eq!(list_request(), RequestIntent::get("vm/list"));
        assert_eq!(config_request(), RequestIntent::get("config"));
        assert_eq!(info_request("alpha"), RequestIntent::get("vm/info/alpha"));
        assert_eq!(notify_request("alpha"), RequestIntent::get("notify/alpha"));
    }

    #[test]
    fn lifecycle_requests_post_to_verb_path() {
        let intent = lifecycle_request(LifecycleVerb::ForceStop, "alpha");
        assert_eq!(intent.method, Method::POST);
        assert_eq!(intent.path, "vm/force_stop/alpha");
        assert_eq!(remove_request("alpha"), RequestIntent::post("vm/remove/alpha"));
    }

    #[test]
    fn confirm_accepts_only_leading_y() {
        assert!(confirm(&mut "y\n".as_bytes()).is_ok());
        assert!(confirm(&mut "Yes please\n".as_bytes()).is_ok());
        for answer in ["n\n", "\n", "", "no\n", " y\n", "\ty\n"] {
            assert!(matches!(
                confirm(&mut answer.as_bytes()),
                Err(CliError::UserDeclined)
            ));
        }
    }

    #[tokio::test]
    async fn lifecycle_commands_post_and_show_error_payloads() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/vm/stop/alpha");
            then.status(409)
                .header("content-type", "application/json")
                .body(r#"{"error":"already stopped"}"#);
        });

        let client = client_for(&server)?;
        let descriptor = find("stop").ok_or_else(|| anyhow!("stop command"))?;
        let invocation = Invocation::new(descriptor.usage, vec!["alpha".to_string()]);
        crate::commands::execute(&client, descriptor, &invocation).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn info_fetches_named_vm() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/vm/info/alpha");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"name":"alpha","state":"running"}"#);
        });

        let client = client_for(&server)?;
        let descriptor = find("info").ok_or_else(|| anyhow!("info command"))?;
        let invocation = Invocation::new(descriptor.usage, vec!["alpha".to_string()]);
        crate::commands::execute(&client, descriptor, &invocation).await?;
        mock.assert();
        Ok(())
    }

    #[tokio::test]
    async fn malformed_json_response_is_reported() -> Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/vm/list");
            then.status(200)
                .header("content-type", "application/json")
                .body("<html>");
        });

        let client = client_for(&server)?;
        let descriptor = find("list").ok_or_else(|| anyhow!("list command"))?;
        let err = crate::commands::execute(&client, descriptor, &Invocation::new("list", Vec::new()))
            .await
            .expect_err("body is not JSON");
        assert!(matches!(err, CliError::MalformedJson { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn remove_declined_sends_nothing() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/vm/remove/alpha");
            then.status(200);
        });

        let client = client_for(&server)?;
        let err = handle_remove(&client, &remove_invocation(false), &mut "n\n".as_bytes())
            .await
            .expect_err("declined removal should fail");
        assert!(matches!(err, CliError::UserDeclined));
        assert_ne!(err.exit_code(), 0);
        mock.assert_hits(0);
        Ok(())
    }

    #[tokio::test]
    async fn remove_confirmed_posts_once() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/vm/remove/alpha");
            then.status(200).body("removed");
        });

        let client = client_for(&server)?;
        handle_remove(&client, &remove_invocation(false), &mut "y\n".as_bytes()).await?;
        mock.assert_hits(1);
        Ok(())
    }

    #[tokio::test]
    async fn remove_with_yes_skips_prompt() -> Result<()> {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/vm/remove/alpha");
            then.status(200);
        });

        let client = client_for(&server)?;
        handle_remove(&client, &remove_invocation(true), &mut "".as_bytes()).await?;
        mock.assert_hits(1);
        Ok(())
    }
}
