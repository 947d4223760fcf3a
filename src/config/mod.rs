//! Configuration module - Application settings
//!
//! This module provides functionality for:
//! - Loading configuration from ~/.config/shortcut-manager/config.json
//! - Default values for all settings
//! - Type definitions for config structures
//!
//! # Module Structure
//!
//! - `defaults` - All default constant values
//! - `types` - Configuration struct definition
//! - `loader` - File system loading and parsing

mod defaults;
mod loader;
mod types;

// Re-export defaults that are used externally
pub use defaults::{DEFAULT_CONFIG_PATH, DEFAULT_NAMESPACE};

// Re-export types that are used externally
pub use types::Config;

// Re-export loader
pub use loader::load_config;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
