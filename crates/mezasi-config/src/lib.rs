#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Profile-backed configuration for the Mezasi CLI.
//!
//! Layout:
//! - `defaults.rs`: profile name, file location, and environment keys
//! - `model.rs`: on-disk shape of the profiles file
//! - `loader.rs`: endpoint resolution from overrides or the profiles file
//! - `error.rs`: configuration error taxonomy

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use defaults::{DEFAULT_PROFILE, default_profiles_path};
pub use error::{ConfigError, ConfigResult};
pub use loader::{EndpointSource, parse_endpoint, resolve_endpoint};
pub use model::{Profile, ProfilesFile};
