//! Endpoint client, request intents, and the CLI error taxonomy.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mezasi_config::ConfigError;
use reqwest::header::{self, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

/// Identifying header attached to every outgoing request.
pub(crate) const USER_AGENT: &str = concat!("Mezasi/", env!("CARGO_PKG_VERSION"));

/// Upper bound on connection establishment; reads are unbounded.
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(300);

/// Errors surfaced by command selection, request construction, and execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),
    #[error("{overview}")]
    NoCommand { overview: String },
    #[error("unknown command '{name}' (run without arguments to list commands)")]
    UnknownCommand { name: String },
    #[error("{message}")]
    Usage { message: String },
    #[error("invalid argument\nUsage: {usage}")]
    ArgumentCount { usage: &'static str },
    #[error("invalid arguments\nUsage: {usage}")]
    InvalidArguments { usage: &'static str },
    #[error("missing required option --{option}\nUsage: {usage}")]
    MissingRequiredOption {
        option: &'static str,
        usage: &'static str,
    },
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        path: String,
        source: url::ParseError,
    },
    #[error("failed to build HTTP client: {source}")]
    ClientBuild { source: reqwest::Error },
    #[error("{source}")]
    Transport { source: reqwest::Error },
    #[error("failed to read {}: {source}", path.display())]
    FileAccess { path: PathBuf, source: io::Error },
    #[error("vm lookup failed with status {status}")]
    RemoteLookup { status: StatusCode },
    #[error("vm info has no '{field}' field")]
    FieldMissing { field: &'static str },
    #[error("response body is not valid JSON: {source}")]
    MalformedJson { source: serde_json::Error },
    #[error("removal cancelled")]
    UserDeclined,
    #[error("failed to launch ssh: {source}")]
    Ssh { source: io::Error },
    #[error("ssh exited with status {code}")]
    ChildExit { code: i32 },
    #[error("{0:#}")]
    Failure(#[from] anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_)
            | Self::NoCommand { .. }
            | Self::UnknownCommand { .. }
            | Self::Usage { .. }
            | Self::ArgumentCount { .. }
            | Self::InvalidArguments { .. }
            | Self::MissingRequiredOption { .. } => 2,
            Self::UserDeclined => 1,
            Self::ChildExit { code } => *code,
            _ => 3,
        }
    }

    /// Whether the top level should print this error; a failed ssh session
    /// has already reported to the terminal.
    pub(crate) const fn is_reported(&self) -> bool {
        !matches!(self, Self::ChildExit { .. })
    }
}

/// One named part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        path: PathBuf,
        contents: Vec<u8>,
    },
}

impl FormPart {
    pub(crate) fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Read `path` in full into a file part. The handle is closed before
    /// this returns, whatever the outcome.
    pub(crate) async fn file(name: impl Into<String>, path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| CliError::FileAccess {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::File {
            name: name.into(),
            path: path.to_path_buf(),
            contents,
        })
    }

    pub(crate) fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RequestBody {
    Empty,
    Multipart(Vec<FormPart>),
}

/// Method, path relative to the endpoint, and body of a request to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RequestIntent {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: RequestBody,
}

impl RequestIntent {
    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    pub(crate) fn multipart(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            body: RequestBody::Multipart(parts),
        }
    }
}

/// Status, content type, and body of a completed exchange.
#[derive(Debug, Clone)]
pub(crate) struct ResponseOutcome {
    pub(crate) status: StatusCode,
    pub(crate) content_type: Option<String>,
    pub(crate) body: Vec<u8>,
}

impl ResponseOutcome {
    async fn read(response: Response) -> CliResult<Self> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|source| CliError::Transport { source })?
            .to_vec();
        Ok(Self {
            status,
            content_type,
            body,
        })
    }

    pub(crate) fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.contains("json"))
    }
}

/// HTTP client bound to the configured service endpoint.
#[derive(Debug, Clone)]
pub(crate) struct EndpointClient {
    http: Client,
    base_url: Url,
}

impl EndpointClient {
    pub(crate) fn new(base_url: Url) -> CliResult<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|source| CliError::ClientBuild { source })?;
        Ok(Self { http, base_url })
    }

    pub(crate) const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the endpoint using standard reference
    /// resolution: relative paths nest under the base, absolute URLs replace it.
    pub(crate) fn resolve(&self, path: &str) -> CliResult<Url> {
        self.base_url
            .join(path)
            .map_err(|source| CliError::InvalidPath {
                path: path.to_string(),
                source,
            })
    }

    /// Build a request for `intent`. Multipart bodies carry their own
    /// boundary content type.
    pub(crate) fn new_request(&self, intent: RequestIntent) -> CliResult<RequestBuilder> {
        let url = self.resolve(&intent.path)?;
        debug!(method = %intent.method, %url, "building request");
        let builder = self
            .http
            .request(intent.method, url)
            .header(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        Ok(match intent.body {
            RequestBody::Empty => builder,
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)),
        })
    }

    /// Send `intent` and read the full response. Non-2xx statuses are
    /// returned as outcomes, not errors.
    pub(crate) async fn execute(&self, intent: RequestIntent) -> CliResult<ResponseOutcome> {
        let response = self
            .new_request(intent)?
            .send()
            .await
            .map_err(|source| CliError::Transport { source })?;
        ResponseOutcome::read(response).await
    }
}

fn build_form(parts: Vec<FormPart>) -> Form {
    parts.into_iter().fold(Form::new(), |form, part| {
        debug!(field = part.name(), "adding form part");
        match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                path,
                contents,
            } => {
                debug!(path = %path.display(), bytes = contents.len(), "attaching file");
                form.part(name, Part::bytes(contents))
            }
        }
    })
}
