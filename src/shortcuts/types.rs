//! Core shortcut types with proper error handling and platform-aware display.
//!
//! This module provides:
//! - `Shortcut` - A keyboard shortcut identified by its internal form
//! - `KeyStroke` - The key event an internal form describes
//! - `KeyModifiers` - Modifier mask flags (shift, ctrl, meta, alt, ...)
//! - `ShortcutParseError` - Detailed parse errors carrying the unparsed string
//! - `Platform` - Which modifier vocabulary applies (Mac or everything else)
//!
//! The internal form is a space-delimited token string such as
//! `"ctrl shift pressed S"`. It is kept exactly as composed (only whitespace
//! runs are collapsed), so it never gets reordered and stays loadable on any
//! platform. Equality and hashing use it and nothing else.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

use super::display;

/// Separator between tokens of an internal form.
pub const INTERNAL_FORM_DELIMITER: &str = " ";

const EXTERNAL_MENU: &str = "menu";
const EXTERNAL_COMMAND: &str = "command";

const INTERNAL_CTRL: &str = "ctrl";
const INTERNAL_META: &str = "meta";

/// Errors that can occur when parsing a shortcut string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutParseError {
    #[error("shortcut string is empty")]
    Empty,
    #[error("unknown modifier '{token}' in shortcut '{form}'")]
    UnknownModifier { form: String, token: String },
    #[error("unknown key '{token}' in shortcut '{form}'")]
    UnknownKey { form: String, token: String },
    #[error("typed shortcut '{form}' must end in a single character, got '{token}'")]
    InvalidTypedChar { form: String, token: String },
    #[error("unexpected token '{token}' after event qualifier in shortcut '{form}'")]
    TrailingToken { form: String, token: String },
}

impl ShortcutParseError {
    /// The string that failed to parse.
    pub fn form(&self) -> &str {
        match self {
            Self::Empty => "",
            Self::UnknownModifier { form, .. }
            | Self::UnknownKey { form, .. }
            | Self::InvalidTypedChar { form, .. }
            | Self::TrailingToken { form, .. } => form,
        }
    }
}

/// Platform capability used for modifier aliases, rendering and OS filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    pub fn is_mac(self) -> bool {
        self == Platform::Mac
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mac" | "macos" => Ok(Platform::Mac),
            "other" | "pc" => Ok(Platform::Other),
            _ => Err(format!("unknown platform '{}', expected 'mac' or 'other'", s)),
        }
    }
}

bitflags! {
    /// Modifier mask of a parsed key stroke.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u16 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const META = 1 << 2;
        const ALT = 1 << 3;
        const ALT_GRAPH = 1 << 4;
        const BUTTON1 = 1 << 5;
        const BUTTON2 = 1 << 6;
        const BUTTON3 = 1 << 7;
    }
}

/// Canonical keyword order, used when a stroke is written back out.
const MODIFIER_KEYWORDS: [(KeyModifiers, &str); 8] = [
    (KeyModifiers::SHIFT, "shift"),
    (KeyModifiers::CTRL, "ctrl"),
    (KeyModifiers::META, "meta"),
    (KeyModifiers::ALT, "alt"),
    (KeyModifiers::ALT_GRAPH, "altGraph"),
    (KeyModifiers::BUTTON1, "button1"),
    (KeyModifiers::BUTTON2, "button2"),
    (KeyModifiers::BUTTON3, "button3"),
];

impl KeyModifiers {
    /// Parse a single modifier keyword. Keywords are case-sensitive.
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "control" => Some(Self::CTRL),
            _ => MODIFIER_KEYWORDS
                .iter()
                .find(|(_, keyword)| *keyword == token)
                .map(|(flag, _)| *flag),
        }
    }

    /// Keywords for the set flags, in canonical order.
    pub fn keywords(self) -> Vec<&'static str> {
        MODIFIER_KEYWORDS
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect()
    }
}

/// Event qualifier token of an internal form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyEventKind {
    Typed,
    Pressed,
    Released,
}

impl KeyEventKind {
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "typed" => Some(Self::Typed),
            "pressed" => Some(Self::Pressed),
            "released" => Some(Self::Released),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Typed => "typed",
            Self::Pressed => "pressed",
            Self::Released => "released",
        }
    }
}

/// Key identified by a stroke: a typed character or a virtual-key name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyIdentifier {
    Char(char),
    Named(String),
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{}", c),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A parsed key event: modifiers, qualifier and key.
///
/// Grammar: `modifier* (typed <char> | (pressed|released)? <KEYNAME>)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    pub modifiers: KeyModifiers,
    pub kind: KeyEventKind,
    pub key: KeyIdentifier,
}

impl KeyStroke {
    pub fn pressed(modifiers: KeyModifiers, key_name: impl Into<String>) -> Self {
        Self {
            modifiers,
            kind: KeyEventKind::Pressed,
            key: KeyIdentifier::Named(key_name.into()),
        }
    }
}

impl FromStr for KeyStroke {
    type Err = ShortcutParseError;

    fn from_str(form: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = form.split_whitespace().collect();
        let (key_token, prefix) = tokens.split_last().ok_or(ShortcutParseError::Empty)?;

        let mut modifiers = KeyModifiers::empty();
        let mut qualifier = None;

        for (i, token) in prefix.iter().enumerate() {
            if let Some(kind) = KeyEventKind::from_keyword(token) {
                // The qualifier is always immediately followed by the key.
                if i + 1 != prefix.len() {
                    return Err(ShortcutParseError::TrailingToken {
                        form: form.to_string(),
                        token: prefix[i + 1].to_string(),
                    });
                }
                qualifier = Some(kind);
                continue;
            }
            match KeyModifiers::from_keyword(token) {
                Some(flag) => modifiers |= flag,
                None => {
                    return Err(ShortcutParseError::UnknownModifier {
                        form: form.to_string(),
                        token: token.to_string(),
                    })
                }
            }
        }

        if qualifier == Some(KeyEventKind::Typed) {
            let mut chars = key_token.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Self {
                    modifiers,
                    kind: KeyEventKind::Typed,
                    key: KeyIdentifier::Char(c),
                }),
                _ => Err(ShortcutParseError::InvalidTypedChar {
                    form: form.to_string(),
                    token: key_token.to_string(),
                }),
            };
        }

        if !is_known_key(key_token) {
            return Err(ShortcutParseError::UnknownKey {
                form: form.to_string(),
                token: key_token.to_string(),
            });
        }

        Ok(Self {
            modifiers,
            kind: qualifier.unwrap_or(KeyEventKind::Pressed),
            key: KeyIdentifier::Named(key_token.to_string()),
        })
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for keyword in self.modifiers.keywords() {
            write!(f, "{} ", keyword)?;
        }
        write!(f, "{} {}", self.kind.as_str(), self.key)
    }
}

/// A keyboard shortcut.
///
/// Serializes as its internal form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Shortcut {
    internal_form: String,
    stroke: KeyStroke,
}

impl Shortcut {
    /// Parse a stored internal form.
    pub fn from_internal(form: &str) -> Result<Self, ShortcutParseError> {
        let stroke = form.parse::<KeyStroke>()?;
        let internal_form = form
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(INTERNAL_FORM_DELIMITER);
        Ok(Self {
            internal_form,
            stroke,
        })
    }

    /// Compose a shortcut from the external vocabulary of action definitions.
    ///
    /// Modifier names come first, then key names, each in the given order.
    pub fn from_external<S: AsRef<str>>(
        modifier_names: &[S],
        key_names: &[S],
        platform: Platform,
    ) -> Result<Self, ShortcutParseError> {
        let form = modifier_names
            .iter()
            .chain(key_names)
            .map(|name| external_to_internal(name.as_ref(), platform))
            .filter(|token| !token.is_empty())
            .collect::<Vec<_>>()
            .join(INTERNAL_FORM_DELIMITER);
        Self::from_internal(&form)
    }

    pub fn internal_form(&self) -> &str {
        &self.internal_form
    }

    pub fn stroke(&self) -> &KeyStroke {
        &self.stroke
    }

    pub fn display_for_platform(&self, platform: Platform) -> String {
        display::render(&self.internal_form, platform)
    }
}

impl PartialEq for Shortcut {
    fn eq(&self, other: &Self) -> bool {
        self.internal_form == other.internal_form
    }
}

impl Eq for Shortcut {}

impl Hash for Shortcut {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.internal_form.hash(state);
    }
}

/// Writes the internal form. Display forms go through `display_for_platform`.
impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.internal_form)
    }
}

impl FromStr for Shortcut {
    type Err = ShortcutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_internal(s)
    }
}

impl TryFrom<String> for Shortcut {
    type Error = ShortcutParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_internal(&value)
    }
}

impl From<Shortcut> for String {
    fn from(shortcut: Shortcut) -> Self {
        shortcut.internal_form
    }
}

/// Translate an external key name to its internal token.
///
/// `menu` is the platform accelerator (meta on Mac, ctrl elsewhere) and
/// `command` is always meta. Everything else passes through.
pub fn external_to_internal(name: &str, platform: Platform) -> &str {
    match name {
        EXTERNAL_MENU if platform.is_mac() => INTERNAL_META,
        EXTERNAL_MENU => INTERNAL_CTRL,
        EXTERNAL_COMMAND => INTERNAL_META,
        other => other,
    }
}

/// Virtual-key names other than letters, digits and function keys.
const NAMED_KEYS: &[&str] = &[
    "ENTER",
    "BACK_SPACE",
    "TAB",
    "CANCEL",
    "CLEAR",
    "SHIFT",
    "CONTROL",
    "ALT",
    "ALT_GRAPH",
    "META",
    "WINDOWS",
    "CONTEXT_MENU",
    "PAUSE",
    "CAPS_LOCK",
    "ESCAPE",
    "SPACE",
    "PAGE_UP",
    "PAGE_DOWN",
    "END",
    "HOME",
    "LEFT",
    "UP",
    "RIGHT",
    "DOWN",
    "KP_LEFT",
    "KP_UP",
    "KP_RIGHT",
    "KP_DOWN",
    "COMMA",
    "MINUS",
    "PERIOD",
    "SLASH",
    "SEMICOLON",
    "EQUALS",
    "OPEN_BRACKET",
    "BACK_SLASH",
    "CLOSE_BRACKET",
    "BACK_QUOTE",
    "QUOTE",
    "QUOTEDBL",
    "MULTIPLY",
    "ADD",
    "SEPARATOR",
    "SUBTRACT",
    "DECIMAL",
    "DIVIDE",
    "DELETE",
    "INSERT",
    "HELP",
    "NUM_LOCK",
    "SCROLL_LOCK",
    "PRINTSCREEN",
    "AMPERSAND",
    "ASTERISK",
    "LESS",
    "GREATER",
    "BRACELEFT",
    "BRACERIGHT",
    "AT",
    "COLON",
    "CIRCUMFLEX",
    "DOLLAR",
    "EURO_SIGN",
    "EXCLAMATION_MARK",
    "INVERTED_EXCLAMATION_MARK",
    "LEFT_PARENTHESIS",
    "RIGHT_PARENTHESIS",
    "NUMBER_SIGN",
    "PLUS",
    "UNDERSCORE",
];

/// Check if a virtual-key name is known. Names are case-sensitive.
pub fn is_known_key(name: &str) -> bool {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_uppercase() || c.is_ascii_digit();
    }
    if let Some(n) = name.strip_prefix("NUMPAD") {
        return n.len() == 1 && n.chars().all(|c| c.is_ascii_digit());
    }
    if let Some(n) = name.strip_prefix('F') {
        if !n.starts_with('0') && n.chars().all(|c| c.is_ascii_digit()) {
            return n.parse::<u8>().is_ok_and(|n| (1..=24).contains(&n));
        }
    }
    NAMED_KEYS.contains(&name)
}
