//! Platform-bound shortcut codec.
//!
//! Wraps the `Shortcut` constructors and renderer with an injected
//! `Platform`, so the same process can decode and render for Mac and PC.

use super::types::{Platform, Shortcut, ShortcutParseError};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ShortcutCodec {
    platform: Platform,
}

impl ShortcutCodec {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    pub fn current() -> Self {
        Self::new(Platform::current())
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Decode modifier and key names written in the external vocabulary.
    pub fn decode_external<S: AsRef<str>>(
        &self,
        modifier_names: &[S],
        key_names: &[S],
    ) -> Result<Shortcut, ShortcutParseError> {
        Shortcut::from_external(modifier_names, key_names, self.platform)
    }

    /// Decode a stored internal form.
    pub fn decode_internal(&self, form: &str) -> Result<Shortcut, ShortcutParseError> {
        Shortcut::from_internal(form)
    }

    pub fn render(&self, shortcut: &Shortcut) -> String {
        shortcut.display_for_platform(self.platform)
    }

    /// Render an optional shortcut, empty when absent.
    pub fn render_optional(&self, shortcut: Option<&Shortcut>) -> String {
        shortcut.map(|s| self.render(s)).unwrap_or_default()
    }
}
