//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use crate::shortcuts::Platform;

/// Application configuration, read from camelCase JSON.
///
/// Every field is optional in the file; absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Preference namespace (default: "/shortcut-manager")
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Action definitions XML. None means the bundled definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions_file: Option<String>,
    /// JSON preferences file (default: <config dir>/shortcut-manager/preferences.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_file: Option<String>,
    /// Force the Mac or PC modifier vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Operating system name matched against `os` restrictions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            namespace: default_namespace(),
            actions_file: None,
            store_file: None,
            platform: None,
            os_name: None,
        }
    }
}

impl Config {
    /// Returns the platform, detected from the host unless overridden.
    pub fn get_platform(&self) -> Platform {
        self.platform.unwrap_or_else(Platform::current)
    }

    /// Returns the OS name, `std::env::consts::OS` unless overridden.
    pub fn get_os_name(&self) -> String {
        self.os_name
            .clone()
            .unwrap_or_else(|| std::env::consts::OS.to_string())
    }

    /// Returns the actions file with `~` expanded, if configured.
    pub fn get_actions_path(&self) -> Option<PathBuf> {
        self.actions_file.as_deref().map(expand_path)
    }

    /// Returns the preferences file with `~` expanded.
    pub fn get_store_path(&self) -> PathBuf {
        match &self.store_file {
            Some(path) => expand_path(path),
            None => default_store_path(),
        }
    }
}

pub(crate) fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}

fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(DEFAULT_APP_DIR)
        .join(DEFAULT_STORE_FILE_NAME)
}
