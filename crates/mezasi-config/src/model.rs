//! On-disk shape of the profiles file.
//!
//! ```toml
//! [profiles."urume.config"]
//! endpoint = "http://vm-host:8080/api/"
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

/// Parsed profiles file keyed by profile name.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfilesFile {
    /// Named profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

/// Settings stored under a single profile.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Profile {
    /// Base URL of the VM management service.
    #[serde(default)]
    pub endpoint: String,
}

impl ProfilesFile {
    /// Look up a profile by exact name.
    #[must_use]
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }
}
