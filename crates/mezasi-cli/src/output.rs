//! Response rendering.

use std::io::Write;

use anyhow::anyhow;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::info;

use crate::client::{CliError, CliResult, ResponseOutcome};

const JSON_INDENT: &[u8] = b"    ";

/// Log the status line and write the rendered body to `out`.
pub(crate) fn present(outcome: &ResponseOutcome, out: &mut impl Write) -> CliResult<()> {
    info!("{}", status_line(outcome));
    let text = render(outcome)?;
    writeln!(out, "{text}").map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}

/// Body text as shown to the user: JSON bodies re-indented with four
/// spaces, anything else verbatim.
pub(crate) fn render(outcome: &ResponseOutcome) -> CliResult<String> {
    if outcome.is_json() {
        indent_json(&outcome.body)
    } else {
        Ok(String::from_utf8_lossy(&outcome.body).into_owned())
    }
}

pub(crate) fn indent_json(body: &[u8]) -> CliResult<String> {
    let value: Value =
        serde_json::from_slice(body).map_err(|source| CliError::MalformedJson { source })?;
    let mut buffer = Vec::with_capacity(body.len() * 2);
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(JSON_INDENT));
    value
        .serialize(&mut serializer)
        .map_err(|source| CliError::MalformedJson { source })?;
    String::from_utf8(buffer)
        .map_err(|err| CliError::failure(anyhow!("formatted JSON is not UTF-8: {err}")))
}

fn status_line(outcome: &ResponseOutcome) -> String {
    let status = outcome.status;
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_str()),
        None => status.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn outcome(content_type: &str, body: &str) -> ResponseOutcome {
        ResponseOutcome {
            status: StatusCode::OK,
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_bodies_are_indented_with_four_spaces() -> CliResult<()> {
        let text = render(&outcome("application/json", r#"{"a":1}"#))?;
        assert_eq!(text, "{\n    \"a\": 1\n}");
        Ok(())
    }

    #[test]
    fn json_key_order_is_preserved() -> CliResult<()> {
        let text = render(&outcome(
            "application/json; charset=utf-8",
            r#"{"name":"alpha","ip_addr":"10.0.0.2","disks":[1,2]}"#,
        ))?;
        assert_eq!(
            text,
            "{\n    \"name\": \"alpha\",\n    \"ip_addr\": \"10.0.0.2\",\n    \"disks\": [\n        1,\n        2\n    ]\n}"
        );
        Ok(())
    }

    #[test]
    fn json_numbers_keep_their_original_text() -> CliResult<()> {
        let text = render(&outcome(
            "application/json",
            r#"{"id":123456789012345678901234567890,"mem":1.50,"e":1e3}"#,
        ))?;
        assert_eq!(
            text,
            "{\n    \"id\": 123456789012345678901234567890,\n    \"mem\": 1.50,\n    \"e\": 1e3\n}"
        );
        Ok(())
    }

    #[test]
    fn other_bodies_are_printed_verbatim() -> CliResult<()> {
        assert_eq!(render(&outcome("text/plain", "hello"))?, "hello");
        let missing = ResponseOutcome {
            status: StatusCode::NO_CONTENT,
            content_type: None,
            body: Vec::new(),
        };
        assert_eq!(render(&missing)?, "");
        Ok(())
    }

    #[test]
    fn malformed_json_is_a_presentation_error() {
        let err = render(&outcome("application/json", "{not json"))
            .expect_err("malformed body should fail");
        assert!(matches!(err, CliError::MalformedJson { .. }));
    }

    #[test]
    fn present_appends_newline() -> CliResult<()> {
        let mut out = Vec::new();
        present(&outcome("text/plain", "hello"), &mut out)?;
        assert_eq!(out, b"hello\n");
        Ok(())
    }

    #[test]
    fn status_line_includes_reason() {
        let mut response = outcome("text/plain", "");
        response.status = StatusCode::NOT_FOUND;
        assert_eq!(status_line(&response), "404 Not Found");
    }
}
