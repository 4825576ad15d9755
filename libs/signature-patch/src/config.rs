use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PatchError;

/// Signature patcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatcherConfig {
    /// Install the patcher at module init
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Delay before the second scan in milliseconds (default: 1000)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Substring identifying modules of the target library
    #[serde(default = "default_library_marker")]
    pub library_marker: String,

    /// Substrings identifying the library regions that verify requests.
    /// A module must match at least one.
    #[serde(default = "default_region_markers")]
    pub region_markers: Vec<String>,

    /// Exported name of the verification function
    #[serde(default = "default_function_name")]
    pub function_name: String,
}

fn default_enabled() -> bool {
    true
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_library_marker() -> String {
    "app-sdk".to_owned()
}

fn default_region_markers() -> Vec<String> {
    vec!["verify-signature".to_owned(), "handlers/next".to_owned()]
}

fn default_function_name() -> String {
    "verifySignatureWithJwks".to_owned()
}

impl Default for PatcherConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            delay_ms: default_delay_ms(),
            library_marker: default_library_marker(),
            region_markers: default_region_markers(),
            function_name: default_function_name(),
        }
    }
}

impl PatcherConfig {
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Whether a module at `path` may contain the verification function.
    #[must_use]
    pub fn is_candidate(&self, path: &str) -> bool {
        path.contains(&self.library_marker)
            && self.region_markers.iter().any(|m| path.contains(m.as_str()))
    }

    /// # Errors
    ///
    /// Returns `PatchError::InvalidConfig` when a marker or the function name is empty.
    pub fn validate(&self) -> Result<(), PatchError> {
        if self.library_marker.is_empty() {
            return Err(PatchError::InvalidConfig("library_marker is empty".into()));
        }
        if self.region_markers.is_empty() || self.region_markers.iter().any(String::is_empty) {
            return Err(PatchError::InvalidConfig(
                "region_markers must be non-empty strings".into(),
            ));
        }
        if self.function_name.is_empty() {
            return Err(PatchError::InvalidConfig("function_name is empty".into()));
        }
        Ok(())
    }
}
