//! Shortcut Manager - keyboard shortcut definitions and user preferences
//!
//! This library provides:
//! - A codec between the internal, external and display forms of shortcuts
//! - The catalog of actions and their default shortcuts, loaded from XML
//! - A namespaced preference store with change notification
//! - A headless editing surface enforcing the collision policy

pub mod actions;
pub mod config;
pub mod error;
pub mod logging;
pub mod shortcuts;
