//! Keyboard shortcut system.
//!
//! This module provides:
//! - The canonical internal form of a shortcut and its platform display form
//! - Persistence of user overrides in a namespaced key-value store
//! - Collision-checked editing on top of the persisted preferences
//!
//! # Example
//!
//! ```ignore
//! use shortcut_manager::shortcuts::{Platform, ShortcutCodec};
//!
//! let codec = ShortcutCodec::new(Platform::Other);
//! let shortcut = codec.decode_external(&["menu", "shift"], &["S"])?;
//! assert_eq!(shortcut.internal_form(), "ctrl shift S");
//! println!("Display: {}", codec.render(&shortcut)); // Shift+Ctrl+S
//! ```

mod codec;
mod display;
mod editor;
mod persistence;
mod types;


// Re-export core types
pub use codec::ShortcutCodec;
pub use display::render;
pub use types::{
    external_to_internal, is_known_key, KeyEventKind, KeyIdentifier, KeyModifiers, KeyStroke,
    Platform, Shortcut, ShortcutParseError, INTERNAL_FORM_DELIMITER,
};

// Re-export persistence types
pub use persistence::{
    JsonFileStore, KeyValueStore, MemoryStore, PreferenceError, PreferenceStore, ShortcutListener,
    StoreError, SubscriptionId, NO_SHORTCUT,
};

// Re-export editing types
pub use editor::{
    CaptureOutcome, EditError, KeyPress, ShortcutConflict, ShortcutEditor, ShortcutRow,
};
