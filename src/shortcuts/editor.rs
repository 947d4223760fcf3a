//! Headless shortcut editing surface.
//!
//! Layers the editing policy on top of `PreferenceStore`:
//! - a candidate shortcut already bound to another action is refused
//! - clearing a shortcut is never collision-checked
//! - raw key presses are filtered the way a shortcut table captures them
//!
//! Every write still goes through `PreferenceStore::store`, so listeners
//! observe edits exactly as they observe reconciliation.

use thiserror::Error;
use tracing::info;

use super::codec::ShortcutCodec;
use super::persistence::{KeyValueStore, PreferenceError, PreferenceStore};
use super::types::{KeyModifiers, KeyStroke, Shortcut, ShortcutParseError};
use crate::actions::Action;

/// Backspace/Delete with no modifiers clear the shortcut.
const CLEAR_KEYS: [&str; 2] = ["BACK_SPACE", "DELETE"];
/// Pressing only a modifier never completes a shortcut.
const MODIFIER_KEYS: [&str; 4] = ["CONTROL", "SHIFT", "ALT", "META"];
/// Keys accepted without a modifier (or with Shift alone).
const STANDALONE_KEYS: [&str; 2] = ["RIGHT", "LEFT"];

/// A shortcut that is already bound to another action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutConflict {
    /// Action the edit was for
    pub id: String,
    /// Action that currently holds the shortcut
    pub conflicting_id: String,
    pub shortcut: Shortcut,
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("no action with id '{0}'")]
    UnknownAction(String),

    #[error("{} is already taken by {}", .0.shortcut.internal_form(), .0.conflicting_id)]
    Conflict(ShortcutConflict),

    #[error("invalid key press: {0}")]
    InvalidKey(#[from] ShortcutParseError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),
}

/// A raw key press as delivered by a UI toolkit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyPress {
    /// Virtual-key name, e.g. `S`, `LEFT`, `BACK_SPACE`
    pub key: String,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    pub fn new(key: impl Into<String>, modifiers: KeyModifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn to_shortcut(&self) -> Result<Shortcut, ShortcutParseError> {
        let stroke = KeyStroke::pressed(self.modifiers, self.key.clone());
        Shortcut::from_internal(&stroke.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The press does not make a shortcut on its own
    Ignored,
    Cleared(Action),
    Assigned(Action),
}

/// One row of a shortcut table, rendered for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortcutRow {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    /// Empty when no shortcut is bound
    pub current: String,
    pub default: String,
}

pub struct ShortcutEditor<'a, S: KeyValueStore> {
    store: &'a mut PreferenceStore<S>,
    codec: ShortcutCodec,
}

impl<'a, S: KeyValueStore> ShortcutEditor<'a, S> {
    pub fn new(store: &'a mut PreferenceStore<S>, codec: ShortcutCodec) -> Self {
        Self { store, codec }
    }

    /// The other action currently bound to `candidate`, if any.
    pub fn find_conflict(&self, id: &str, candidate: &Shortcut) -> Option<ShortcutConflict> {
        let current = self.store.retrieve_all();
        self.store
            .catalog()
            .iter()
            .map(Action::id)
            .filter(|other| other != id)
            .find(|other| current.get(other).and_then(Option::as_ref) == Some(candidate))
            .map(|conflicting_id| ShortcutConflict {
                id: id.to_string(),
                conflicting_id,
                shortcut: candidate.clone(),
            })
    }

    /// Bind `shortcut` to the action `id`, or clear it with `None`.
    pub fn assign(&mut self, id: &str, shortcut: Option<Shortcut>) -> Result<Action, EditError> {
        let action = self
            .store
            .catalog()
            .get(id)
            .ok_or_else(|| EditError::UnknownAction(id.to_string()))?
            .with_shortcut(shortcut);

        if let Some(candidate) = &action.shortcut {
            if let Some(conflict) = self.find_conflict(id, candidate) {
                info!(
                    id,
                    conflicting_id = %conflict.conflicting_id,
                    shortcut = %candidate.internal_form(),
                    "Refusing shortcut already taken"
                );
                return Err(EditError::Conflict(conflict));
            }
        }

        self.store.store(&action)?;
        Ok(action)
    }

    pub fn clear(&mut self, id: &str) -> Result<Action, EditError> {
        self.assign(id, None)
    }

    /// Apply a captured key press to the action `id`.
    pub fn capture(&mut self, id: &str, press: &KeyPress) -> Result<CaptureOutcome, EditError> {
        let key = press.key.as_str();

        if press.modifiers.is_empty() && CLEAR_KEYS.contains(&key) {
            return self.clear(id).map(CaptureOutcome::Cleared);
        }
        if MODIFIER_KEYS.contains(&key) {
            return Ok(CaptureOutcome::Ignored);
        }

        let bare = press.modifiers.is_empty() || press.modifiers == KeyModifiers::SHIFT;
        if bare && !STANDALONE_KEYS.contains(&key) {
            return Ok(CaptureOutcome::Ignored);
        }

        let shortcut = press.to_shortcut()?;
        self.assign(id, Some(shortcut)).map(CaptureOutcome::Assigned)
    }

    /// Put every action back on its catalog default.
    pub fn restore_defaults(&mut self) -> Result<(), EditError> {
        self.store.init(true)?;
        Ok(())
    }

    pub fn rows(&self) -> Vec<ShortcutRow> {
        self.store
            .catalog()
            .iter()
            .map(|action| {
                let id = action.id();
                let current = self.store.retrieve(&id);
                ShortcutRow {
                    label: action.label.clone(),
                    tooltip: action.tooltip.clone(),
                    current: self.codec.render_optional(current.as_ref()),
                    default: self.codec.render_optional(action.default_shortcut.as_ref()),
                    id,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::CatalogLoader;
    use crate::shortcuts::{MemoryStore, Platform};
    use std::cell::RefCell;
    use std::rc::Rc;

    const NAMESPACE: &str = "/test/editor";

    const ACTIONS: &str = r#"
    <actions>
      <action class="Save" name="Save" tooltip="Save the file">
        <shortcut><mask keyname="ctrl"/><mask keyname="shift"/><key keyname="pressed"/><key keyname="S"/></shortcut>
      </action>
      <action class="Open" name="Open">
        <shortcut><mask keyname="ctrl"/><key keyname="O"/></shortcut>
      </action>
      <action class="Seek" enum="BACK" name="Seek back"/>
    </actions>
    "#;

    fn store() -> PreferenceStore<MemoryStore> {
        let catalog = CatalogLoader::new(Platform::Other, "linux")
            .load_str(ACTIONS)
            .unwrap();
        let mut store = PreferenceStore::new(NAMESPACE, MemoryStore::new(), catalog).unwrap();
        store.init(false).unwrap();
        store
    }

    fn shortcut(form: &str) -> Shortcut {
        Shortcut::from_internal(form).unwrap()
    }

    fn editor(store: &mut PreferenceStore<MemoryStore>) -> ShortcutEditor<'_, MemoryStore> {
        ShortcutEditor::new(store, ShortcutCodec::new(Platform::Other))
    }

    #[test]
    fn conflicting_shortcut_is_rejected_without_writing() {
        let mut store = store();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        store.subscribe(move |_: &Action, _: Option<&Shortcut>| *counter.borrow_mut() += 1);

        let result = editor(&mut store).assign("Open", Some(shortcut("ctrl shift pressed S")));

        match result {
            Err(EditError::Conflict(conflict)) => {
                assert_eq!(conflict.id, "Open");
                assert_eq!(conflict.conflicting_id, "Save");
                assert_eq!(conflict.shortcut, shortcut("ctrl shift pressed S"));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert_eq!(store.retrieve("Open"), Some(shortcut("ctrl O")));
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn equality_is_by_internal_form() {
        let mut store = store();
        // Same key event, different internal form: not a collision.
        let action = editor(&mut store)
            .assign("Open", Some(shortcut("shift ctrl pressed S")))
            .unwrap();
        assert_eq!(action.shortcut, Some(shortcut("shift ctrl pressed S")));
    }

    #[test]
    fn reassigning_own_shortcut_is_allowed() {
        let mut store = store();
        let result = editor(&mut store).assign("Open", Some(shortcut("ctrl O")));
        assert!(result.is_ok());
    }

    #[test]
    fn freed_shortcut_can_be_taken() {
        let mut store = store();
        let mut editor = editor(&mut store);
        editor.clear("Save").unwrap();
        editor
            .assign("Open", Some(shortcut("ctrl shift pressed S")))
            .unwrap();
        assert_eq!(store.retrieve("Save"), None);
        assert_eq!(store.retrieve("Open"), Some(shortcut("ctrl shift pressed S")));
    }

    #[test]
    fn clearing_notifies_with_previous_shortcut() {
        let mut store = store();
        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = heard.clone();
        store.subscribe(move |action: &Action, previous: Option<&Shortcut>| {
            sink.borrow_mut()
                .push((action.id(), action.shortcut.clone(), previous.cloned()));
        });

        let cleared = editor(&mut store).clear("Open").unwrap();

        assert_eq!(cleared.shortcut, None);
        assert_eq!(
            heard.borrow().as_slice(),
            &[("Open".to_string(), None, Some(shortcut("ctrl O")))]
        );
    }

    #[test]
    fn unknown_action_is_reported() {
        let mut store = store();
        assert!(matches!(
            editor(&mut store).assign("Nope", None),
            Err(EditError::UnknownAction(id)) if id == "Nope"
        ));
    }

    #[test]
    fn capture_backspace_clears() {
        let mut store = store();
        let outcome = editor(&mut store)
            .capture("Open", &KeyPress::new("BACK_SPACE", KeyModifiers::empty()))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Cleared(_)));
        assert_eq!(store.retrieve("Open"), None);
    }

    #[test]
    fn capture_ignores_modifier_only_and_bare_keys() {
        let mut store = store();
        let mut editor = editor(&mut store);
        let ignored = [
            KeyPress::new("CONTROL", KeyModifiers::CTRL),
            KeyPress::new("A", KeyModifiers::empty()),
            KeyPress::new("A", KeyModifiers::SHIFT),
            KeyPress::new("BACK_SPACE", KeyModifiers::SHIFT),
        ];
        for press in &ignored {
            assert_eq!(editor.capture("Open", press).unwrap(), CaptureOutcome::Ignored);
        }
        assert_eq!(store.retrieve("Open"), Some(shortcut("ctrl O")));
    }

    #[test]
    fn capture_accepts_standalone_and_modified_keys() {
        let mut store = store();
        let mut editor = editor(&mut store);

        let outcome = editor
            .capture("Seek-BACK", &KeyPress::new("LEFT", KeyModifiers::SHIFT))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Assigned(_)));

        let outcome = editor
            .capture("Open", &KeyPress::new("P", KeyModifiers::CTRL | KeyModifiers::ALT))
            .unwrap();
        assert!(matches!(outcome, CaptureOutcome::Assigned(_)));

        assert_eq!(store.retrieve("Seek-BACK"), Some(shortcut("shift pressed LEFT")));
        assert_eq!(store.retrieve("Open"), Some(shortcut("ctrl alt pressed P")));
    }

    #[test]
    fn capture_applies_collision_policy() {
        let mut store = store();
        let mut editor = editor(&mut store);
        let press = KeyPress::new("S", KeyModifiers::SHIFT | KeyModifiers::CTRL);

        // Canonical "shift ctrl" differs from Save's "ctrl shift" default.
        assert!(editor.capture("Seek-BACK", &press).is_ok());
        let result = editor.capture("Open", &press);
        assert!(matches!(
            result,
            Err(EditError::Conflict(conflict)) if conflict.conflicting_id == "Seek-BACK"
        ));

        assert_eq!(store.retrieve("Seek-BACK"), Some(shortcut("shift ctrl pressed S")));
        assert_eq!(store.retrieve("Open"), Some(shortcut("ctrl O")));
    }

    #[test]
    fn capture_rejects_unknown_key_names() {
        let mut store = store();
        let result = editor(&mut store).capture("Open", &KeyPress::new("NOPE", KeyModifiers::CTRL));
        assert!(matches!(result, Err(EditError::InvalidKey(_))));
    }

    #[test]
    fn restore_defaults_resets_everything() {
        let mut store = store();
        {
            let mut editor = editor(&mut store);
            editor.clear("Save").unwrap();
            editor.assign("Seek-BACK", Some(shortcut("alt LEFT"))).unwrap();
            editor.restore_defaults().unwrap();
        }
        assert_eq!(store.retrieve("Save"), Some(shortcut("ctrl shift pressed S")));
        assert_eq!(store.retrieve("Seek-BACK"), None);
    }

    #[test]
    fn rows_render_current_and_default() {
        let mut store = store();
        let mut editor = editor(&mut store);
        editor.clear("Open").unwrap();

        let rows = editor.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows[0],
            ShortcutRow {
                id: "Save".into(),
                label: "Save".into(),
                tooltip: "Save the file".into(),
                current: "Shift+Ctrl+S".into(),
                default: "Shift+Ctrl+S".into(),
            }
        );
        assert_eq!(rows[1].current, "");
        assert_eq!(rows[1].default, "Ctrl+O");
        assert_eq!(rows[2].default, "");
    }
}
