//! Action types and data structures
//!
//! An `Action` is an immutable value: changing its shortcut produces a new
//! value through `with_shortcut`.

use crate::shortcuts::Shortcut;

/// Separator between class id and variant id in a composite identifier.
pub const ID_SEPARATOR: &str = "-";

/// A user-triggerable action with its default and current shortcut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// Owning class identifier
    pub class_id: String,
    /// Disambiguates several actions on the same owning class
    pub variant_id: Option<String>,
    pub label: String,
    pub tooltip: String,
    /// Shortcut declared in the action definitions
    pub default_shortcut: Option<Shortcut>,
    /// Shortcut currently in effect (equal to the default when loaded)
    pub shortcut: Option<Shortcut>,
}

impl Action {
    pub fn new(
        class_id: impl Into<String>,
        variant_id: Option<String>,
        label: impl Into<String>,
        tooltip: impl Into<String>,
        default_shortcut: Option<Shortcut>,
    ) -> Self {
        Action {
            class_id: class_id.into(),
            variant_id,
            label: label.into(),
            tooltip: tooltip.into(),
            shortcut: default_shortcut.clone(),
            default_shortcut,
        }
    }

    /// Composite identifier: `class` or `class-variant`.
    pub fn id(&self) -> String {
        match &self.variant_id {
            Some(variant) => format!("{}{}{}", self.class_id, ID_SEPARATOR, variant),
            None => self.class_id.clone(),
        }
    }

    pub fn with_shortcut(&self, shortcut: Option<Shortcut>) -> Self {
        Action {
            shortcut,
            ..self.clone()
        }
    }

    /// This action carrying its default shortcut as the current one.
    pub fn with_default_shortcut(&self) -> Self {
        self.with_shortcut(self.default_shortcut.clone())
    }
}
