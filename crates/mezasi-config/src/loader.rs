//! Endpoint resolution.
//!
//! # Design
//! - An explicit endpoint override wins and never touches the filesystem.
//! - Otherwise the named profile is read from the profiles file.
//! - The returned URL always ends with `/` so relative paths nest under it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use crate::defaults::default_profiles_path;
use crate::error::{ConfigError, ConfigResult};
use crate::model::ProfilesFile;

/// Inputs used to locate the service endpoint.
#[derive(Debug, Clone)]
pub struct EndpointSource {
    /// Profile to read from the profiles file.
    pub profile: String,
    /// Explicit profiles file; falls back to [`default_profiles_path`].
    pub profiles_file: Option<PathBuf>,
    /// Endpoint supplied directly, bypassing the profiles file.
    pub endpoint: Option<String>,
}

/// Resolve the service endpoint for the given source.
///
/// # Errors
///
/// Returns a [`ConfigError`] when the profiles file cannot be read or parsed,
/// the profile or its endpoint is missing, or the endpoint is not a valid
/// http(s) URL.
pub fn resolve_endpoint(source: &EndpointSource) -> ConfigResult<Url> {
    if let Some(raw) = source
        .endpoint
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        debug!("using endpoint override");
        return parse_endpoint(raw);
    }

    let path = match &source.profiles_file {
        Some(path) => path.clone(),
        None => default_profiles_path().ok_or(ConfigError::NoConfigDir)?,
    };
    let profiles = load_profiles(&path)?;
    let profile = profiles
        .profile(&source.profile)
        .ok_or_else(|| ConfigError::ProfileMissing {
            profile: source.profile.clone(),
            path: path.clone(),
        })?;

    let endpoint = profile.endpoint.trim();
    if endpoint.is_empty() {
        return Err(ConfigError::EndpointMissing {
            profile: source.profile.clone(),
        });
    }
    parse_endpoint(endpoint)
}

/// Parse and normalise an endpoint URL.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEndpoint`] for unparsable input and
/// [`ConfigError::UnsupportedScheme`] for non-http(s) URLs.
pub fn parse_endpoint(raw: &str) -> ConfigResult<Url> {
    let mut url = Url::parse(raw).map_err(|source| ConfigError::InvalidEndpoint {
        value: raw.to_string(),
        source,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            value: raw.to_string(),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn load_profiles(path: &Path) -> ConfigResult<ProfilesFile> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
