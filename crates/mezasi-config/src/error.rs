//! Error types for configuration resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for endpoint resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No profiles file location could be determined.
    #[error("no configuration directory available; pass --profiles-file or --endpoint")]
    NoConfigDir,
    /// The profiles file could not be read.
    #[error("failed to read profiles file {}: {source}", path.display())]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The profiles file is not valid TOML.
    #[error("profiles file {} is invalid: {source}", path.display())]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// The requested profile does not exist.
    #[error("profile '{profile}' not found in {}", path.display())]
    ProfileMissing {
        /// Requested profile name.
        profile: String,
        /// File that was searched.
        path: PathBuf,
    },
    /// The profile exists but has no endpoint.
    #[error("profile '{profile}' requires an 'endpoint' (API endpoint, http://...)")]
    EndpointMissing {
        /// Profile lacking the key.
        profile: String,
    },
    /// The endpoint is not a valid URL.
    #[error("invalid endpoint '{value}': {source}")]
    InvalidEndpoint {
        /// Offending value.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The endpoint uses a scheme other than http or https.
    #[error("endpoint '{value}' must use http or https")]
    UnsupportedScheme {
        /// Offending value.
        value: String,
    },
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
