use thiserror::Error;
use tracing::warn;

use crate::actions::CatalogError;
use crate::shortcuts::{EditError, Platform, PreferenceError, ShortcutParseError, StoreError};

/// Error severity for user-facing reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,     // expected outcome of user input
    Warning,  // recoverable
    Error,    // operation failed
    Critical, // the application cannot start
}

/// Crate-level error covering every fallible operation
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ShortcutParseError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl Error {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Parse(_) => ErrorSeverity::Warning,
            Self::Catalog(_) => ErrorSeverity::Critical,
            Self::Store(_) => ErrorSeverity::Error,
            Self::Preference(PreferenceError::RelativeNamespace(_)) => ErrorSeverity::Critical,
            Self::Preference(PreferenceError::Store(_)) => ErrorSeverity::Error,
            Self::Edit(EditError::Conflict(_)) => ErrorSeverity::Info,
            Self::Edit(EditError::UnknownAction(_) | EditError::InvalidKey(_)) => {
                ErrorSeverity::Warning
            }
            Self::Edit(EditError::Preference(_)) => ErrorSeverity::Error,
        }
    }

    /// Message for the person at the terminal. Shortcuts are rendered for
    /// `platform`.
    pub fn user_message(&self, platform: Platform) -> String {
        match self {
            Self::Parse(e) => format!("Not a valid shortcut: {}", e.form()),
            Self::Catalog(e) => format!("Could not load action definitions: {}", e),
            Self::Store(e) => format!("Could not save preferences: {}", e),
            Self::Preference(e) => format!("Preferences unavailable: {}", e),
            Self::Edit(EditError::Conflict(conflict)) => {
                format!(
                    "{} is already taken by {}.",
                    conflict.shortcut.display_for_platform(platform),
                    conflict.conflicting_id
                )
            }
            Self::Edit(e) => e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the value can degrade to absent.
///
/// # Examples
///
/// ```ignore
/// use shortcut_manager::error::ResultExt;
///
/// // Fall back to defaults if the config cannot be read
/// let contents = std::fs::read_to_string(path).warn_on_err();
/// ```
pub trait ResultExt<T> {
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(error) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?error,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}
