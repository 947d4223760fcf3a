//! Default configuration values
//!
//! All constants used throughout the config module are defined here.

/// Preference namespace shared by every action of the application
pub const DEFAULT_NAMESPACE: &str = "/shortcut-manager";

/// Directory (under the platform config dir) holding the preferences file
pub const DEFAULT_APP_DIR: &str = "shortcut-manager";

/// File name of the JSON preferences store
pub const DEFAULT_STORE_FILE_NAME: &str = "preferences.json";

/// Location of the config file itself
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/shortcut-manager/config.json";
