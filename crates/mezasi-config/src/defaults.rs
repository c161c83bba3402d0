//! Defaults shared by the configuration loader and the CLI flags.

use std::path::PathBuf;

/// Profile consulted when none is requested explicitly.
pub const DEFAULT_PROFILE: &str = "urume.config";

/// Environment variable overriding the profile name.
pub const ENV_PROFILE: &str = "MEZASI_PROFILE";

/// Environment variable overriding the profiles file location.
pub const ENV_PROFILES_FILE: &str = "MEZASI_PROFILES_FILE";

/// Environment variable supplying the endpoint directly.
pub const ENV_ENDPOINT: &str = "MEZASI_ENDPOINT";

const PROFILES_DIR: &str = "mezasi";
const PROFILES_FILE: &str = "profiles.toml";

/// Location of the profiles file under the user's configuration directory.
///
/// Returns `None` when the platform exposes no configuration directory.
#[must_use]
pub fn default_profiles_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(PROFILES_DIR).join(PROFILES_FILE))
}
