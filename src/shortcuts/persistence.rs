//! User shortcut customization persistence.
//!
//! Preferences live in an abstract namespaced key-value store. Each catalog
//! action id maps to one string value:
//! - the shortcut's internal form, e.g. `"ctrl shift pressed S"`
//! - `"#"` = the user explicitly removed the shortcut
//!
//! A missing value means "never stored" and is reconciled with the catalog
//! default by `PreferenceStore::init`.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::types::Shortcut;
use crate::actions::{Action, ActionCatalog};

/// Stored value meaning "this action has no shortcut".
pub const NO_SHORTCUT: &str = "#";

/// Errors raised by a key-value backend.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("preferences file '{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by `PreferenceStore`.
#[derive(Error, Debug)]
pub enum PreferenceError {
    #[error("namespace {0} is not absolute")]
    RelativeNamespace(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Durable string storage scoped by namespace.
pub trait KeyValueStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String>;
    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError>;
}

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory backend. Clones share the same data, so a second
/// `PreferenceStore` over a clone sees what the first one wrote.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<Namespaces>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every value stored under `namespace`.
    pub fn snapshot(&self, namespace: &str) -> BTreeMap<String, String> {
        self.data.lock().get(namespace).cloned().unwrap_or_default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.data.lock().get(namespace)?.get(key).cloned()
    }

    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        self.data
            .lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk document: `{ "<namespace>": { "<id>": "<value>" } }`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct PreferencesFile {
    namespaces: Namespaces,
}

/// JSON file backend. The whole document is rewritten on every `put`.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    file: PreferencesFile,
}

impl JsonFileStore {
    /// Open the preferences file, starting empty if it doesn't exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            info!(path = %path.display(), "Preferences file not found, starting empty");
            return Ok(Self {
                path,
                file: PreferencesFile::default(),
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file = serde_json::from_str(&content).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, file: &PreferencesFile) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        };

        // Create parent directories if needed
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let content =
            serde_json::to_string_pretty(file).map_err(|source| StoreError::Json {
                path: self.path.display().to_string(),
                source,
            })?;
        fs::write(&self.path, content).map_err(io_error)
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, namespace: &str, key: &str) -> Option<String> {
        self.file.namespaces.get(namespace)?.get(key).cloned()
    }

    /// The in-memory document only changes once the file is written.
    fn put(&mut self, namespace: &str, key: &str, value: &str) -> Result<(), StoreError> {
        let mut updated = self.file.clone();
        updated
            .namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        self.save(&updated)?;
        self.file = updated;
        Ok(())
    }
}

/// Observer of shortcut writes.
///
/// Called with the action as written and the shortcut it had before.
pub trait ShortcutListener {
    fn action_updated(&mut self, action: &Action, previous: Option<&Shortcut>);
}

impl<F> ShortcutListener for F
where
    F: FnMut(&Action, Option<&Shortcut>),
{
    fn action_updated(&mut self, action: &Action, previous: Option<&Shortcut>) {
        self(action, previous)
    }
}

/// Handle returned by `PreferenceStore::subscribe`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

/// Persistent mapping from action id to its current shortcut.
///
/// Sole mutator of the stored preferences. Writes are never refused here;
/// collision checks belong to the caller (see `ShortcutEditor`).
pub struct PreferenceStore<S: KeyValueStore> {
    namespace: String,
    backend: S,
    catalog: ActionCatalog,
    listeners: Vec<(SubscriptionId, Box<dyn ShortcutListener>)>,
    next_subscription: usize,
}

impl<S: KeyValueStore> PreferenceStore<S> {
    pub fn new(
        namespace: impl Into<String>,
        backend: S,
        catalog: ActionCatalog,
    ) -> Result<Self, PreferenceError> {
        let namespace = namespace.into();
        if !namespace.starts_with('/') {
            return Err(PreferenceError::RelativeNamespace(namespace));
        }
        Ok(Self {
            namespace,
            backend,
            catalog,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn subscribe(&mut self, listener: impl ShortcutListener + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Write catalog defaults for ids with no stored value, or for every id
    /// when `overwrite` is set. Goes through `store`, so listeners see it.
    pub fn init(&mut self, overwrite: bool) -> Result<(), PreferenceError> {
        let defaults: Vec<Action> = self.catalog.actions().to_vec();
        let mut written = 0usize;
        for action in &defaults {
            let id = action.id();
            if overwrite || self.backend.get(&self.namespace, &id).is_none() {
                self.store(&action.with_default_shortcut())?;
                written += 1;
            }
        }
        info!(
            namespace = %self.namespace,
            overwrite,
            written,
            "Reconciled shortcut preferences with catalog defaults"
        );
        Ok(())
    }

    /// Current shortcut for `id`. Unset, removed and unparseable values are
    /// all `None`.
    pub fn retrieve(&self, id: &str) -> Option<Shortcut> {
        let stored = self.backend.get(&self.namespace, id)?;
        if stored == NO_SHORTCUT {
            return None;
        }
        match Shortcut::from_internal(&stored) {
            Ok(shortcut) => Some(shortcut),
            Err(error) => {
                warn!(
                    namespace = %self.namespace,
                    id,
                    stored = %stored,
                    error = %error,
                    "Won't retrieve unparseable shortcut"
                );
                None
            }
        }
    }

    /// Current shortcut of every catalog action.
    pub fn retrieve_all(&self) -> HashMap<String, Option<Shortcut>> {
        self.catalog
            .iter()
            .map(|action| {
                let id = action.id();
                let shortcut = self.retrieve(&id);
                (id, shortcut)
            })
            .collect()
    }

    /// Persist `action.shortcut` under `action.id()`.
    ///
    /// Listeners are notified with the previous shortcut before the value
    /// is written.
    pub fn store(&mut self, action: &Action) -> Result<(), PreferenceError> {
        let key = action.id();
        let old_shortcut = self.retrieve_all().remove(&key).flatten();

        let value = match &action.shortcut {
            Some(shortcut) => shortcut.internal_form(),
            None => NO_SHORTCUT,
        };

        for (_, listener) in &mut self.listeners {
            listener.action_updated(action, old_shortcut.as_ref());
        }

        self.backend.put(&self.namespace, &key, value)?;
        debug!(
            namespace = %self.namespace,
            id = %key,
            value,
            "Stored shortcut preference"
        );
        Ok(())
    }

    /// The catalog action for `id` carrying its current shortcut.
    pub fn current_action(&self, id: &str) -> Option<Action> {
        self.catalog
            .get(id)
            .map(|action| action.with_shortcut(self.retrieve(id)))
    }

    pub fn current_actions(&self) -> Vec<Action> {
        self.catalog
            .iter()
            .map(|action| action.with_shortcut(self.retrieve(&action.id())))
            .collect()
    }

    /// Notify listeners once per catalog action with its current shortcut,
    /// so consumers can set up live accelerators at startup.
    pub fn announce_all(&mut self) {
        for action in self.current_actions() {
            let current = action.shortcut.clone();
            for (_, listener) in &mut self.listeners {
                listener.action_updated(&action, current.as_ref());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::CatalogLoader;
    use crate::shortcuts::Platform;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    const NAMESPACE: &str = "/org/example/shortcuts";

    const ACTIONS: &str = r#"
    <actions>
      <action class="Save" name="Save">
        <shortcut><mask keyname="ctrl"/><key keyname="S"/></shortcut>
      </action>
      <action class="Open" name="Open">
        <shortcut><mask keyname="ctrl"/><key keyname="O"/></shortcut>
      </action>
      <action class="Play" enum="PAUSE" name="Pause"/>
    </actions>
    "#;

    type Heard = Rc<RefCell<Vec<(String, Option<String>, Option<String>)>>>;

    fn catalog() -> ActionCatalog {
        CatalogLoader::new(Platform::Other, "linux")
            .load_str(ACTIONS)
            .unwrap()
    }

    fn shortcut(form: &str) -> Shortcut {
        Shortcut::from_internal(form).unwrap()
    }

    fn form(shortcut: Option<&Shortcut>) -> Option<String> {
        shortcut.map(|s| s.internal_form().to_string())
    }

    fn recording(store: &mut PreferenceStore<MemoryStore>) -> Heard {
        let heard: Heard = Rc::default();
        let sink = heard.clone();
        store.subscribe(move |action: &Action, previous: Option<&Shortcut>| {
            sink.borrow_mut().push((
                action.id(),
                form(action.shortcut.as_ref()),
                form(previous),
            ));
        });
        heard
    }

    fn memory_store(backend: MemoryStore) -> PreferenceStore<MemoryStore> {
        PreferenceStore::new(NAMESPACE, backend, catalog()).unwrap()
    }

    #[test]
    fn relative_namespace_is_rejected() {
        let result = PreferenceStore::new("org/example", MemoryStore::new(), catalog());
        assert!(matches!(
            result,
            Err(PreferenceError::RelativeNamespace(ns)) if ns == "org/example"
        ));
    }

    #[test]
    fn init_persists_defaults_and_sentinel() {
        let backend = MemoryStore::new();
        let mut store = memory_store(backend.clone());
        let heard = recording(&mut store);

        store.init(false).unwrap();

        let stored = backend.snapshot(NAMESPACE);
        assert_eq!(stored.get("Save").map(String::as_str), Some("ctrl S"));
        assert_eq!(stored.get("Open").map(String::as_str), Some("ctrl O"));
        assert_eq!(stored.get("Play-PAUSE").map(String::as_str), Some(NO_SHORTCUT));
        assert_eq!(heard.borrow().len(), 3);
        assert_eq!(store.retrieve("Play-PAUSE"), None);
    }

    #[test]
    fn init_without_overwrite_keeps_user_values() {
        let backend = MemoryStore::new();
        let mut store = memory_store(backend.clone());
        store.init(false).unwrap();

        let save = store.catalog().get("Save").unwrap().clone();
        store
            .store(&save.with_shortcut(Some(shortcut("ctrl shift S"))))
            .unwrap();
        let open = store.catalog().get("Open").unwrap().clone();
        store.store(&open.with_shortcut(None)).unwrap();

        // Simulate a restart over the same durable data.
        let mut restarted = memory_store(backend.clone());
        let heard = recording(&mut restarted);
        restarted.init(false).unwrap();

        assert!(heard.borrow().is_empty());
        assert_eq!(restarted.retrieve("Save"), Some(shortcut("ctrl shift S")));
        assert_eq!(restarted.retrieve("Open"), None);

        restarted.init(true).unwrap();
        assert_eq!(restarted.retrieve("Save"), Some(shortcut("ctrl S")));
        assert_eq!(restarted.retrieve("Open"), Some(shortcut("ctrl O")));
        assert_eq!(heard.borrow().len(), 3);
    }

    #[test]
    fn retrieve_treats_unparseable_value_as_absent() {
        let mut backend = MemoryStore::new();
        backend.put(NAMESPACE, "Save", "ctrl hyper S").unwrap();
        let mut store = memory_store(backend.clone());

        assert_eq!(store.retrieve("Save"), None);
        assert_eq!(store.retrieve("Unknown"), None);

        // A corrupt value still counts as stored.
        store.init(false).unwrap();
        assert_eq!(
            backend.snapshot(NAMESPACE).get("Save").map(String::as_str),
            Some("ctrl hyper S")
        );
    }

    #[test]
    fn retrieve_all_covers_exactly_catalog_ids() {
        let mut backend = MemoryStore::new();
        backend.put(NAMESPACE, "Stray", "ctrl Q").unwrap();
        let mut store = memory_store(backend);
        store.init(false).unwrap();

        let all = store.retrieve_all();
        assert_eq!(all.len(), 3);
        assert!(!all.contains_key("Stray"));
        assert_eq!(all["Save"], Some(shortcut("ctrl S")));
        assert_eq!(all["Play-PAUSE"], None);
    }

    #[test]
    fn listener_runs_before_value_is_written() {
        let backend = MemoryStore::new();
        let mut store = memory_store(backend.clone());
        store.init(false).unwrap();

        let observed = Rc::new(RefCell::new(None));
        let sink = observed.clone();
        let probe = backend.clone();
        store.subscribe(move |_: &Action, _: Option<&Shortcut>| {
            *sink.borrow_mut() = probe.get(NAMESPACE, "Save");
        });

        let save = store.catalog().get("Save").unwrap().clone();
        store.store(&save.with_shortcut(Some(shortcut("alt S")))).unwrap();

        assert_eq!(observed.borrow().as_deref(), Some("ctrl S"));
        assert_eq!(store.retrieve("Save"), Some(shortcut("alt S")));
    }

    #[test]
    fn clearing_reports_previous_shortcut() {
        let mut store = memory_store(MemoryStore::new());
        store.init(false).unwrap();
        let heard = recording(&mut store);

        let save = store.catalog().get("Save").unwrap().clone();
        store.store(&save.with_shortcut(None)).unwrap();

        assert_eq!(
            heard.borrow().as_slice(),
            &[("Save".to_string(), None, Some("ctrl S".to_string()))]
        );
        assert_eq!(
            store.backend().get(NAMESPACE, "Save").as_deref(),
            Some(NO_SHORTCUT)
        );
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let mut store = memory_store(MemoryStore::new());
        let heard = recording(&mut store);
        let other: Heard = Rc::default();
        let sink = other.clone();
        let id = store.subscribe(move |action: &Action, _: Option<&Shortcut>| {
            sink.borrow_mut().push((action.id(), None, None));
        });

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.init(false).unwrap();

        assert_eq!(heard.borrow().len(), 3);
        assert!(other.borrow().is_empty());
    }

    #[test]
    fn announce_all_reports_current_shortcuts() {
        let mut store = memory_store(MemoryStore::new());
        store.init(false).unwrap();
        let save = store.catalog().get("Save").unwrap().clone();
        store.store(&save.with_shortcut(Some(shortcut("alt S")))).unwrap();

        let heard = recording(&mut store);
        store.announce_all();

        let heard = heard.borrow();
        assert_eq!(heard.len(), 3);
        assert_eq!(
            heard[0],
            (
                "Save".to_string(),
                Some("alt S".to_string()),
                Some("alt S".to_string())
            )
        );
        assert_eq!(store.current_action("Save").unwrap().shortcut, Some(shortcut("alt S")));
        assert_eq!(
            store.current_action("Save").unwrap().default_shortcut,
            Some(shortcut("ctrl S"))
        );
    }

    #[test]
    fn namespaces_are_isolated() {
        let backend = MemoryStore::new();
        let mut first = memory_store(backend.clone());
        first.init(false).unwrap();

        let second = PreferenceStore::new("/other/app", backend.clone(), catalog()).unwrap();
        assert_eq!(second.retrieve("Save"), None);
        assert!(backend.snapshot("/other/app").is_empty());
    }

    #[test]
    fn json_file_store_survives_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let backend = JsonFileStore::open(&path).unwrap();
        let mut store = PreferenceStore::new(NAMESPACE, backend, catalog()).unwrap();
        store.init(false).unwrap();
        let save = store.catalog().get("Save").unwrap().clone();
        store.store(&save.with_shortcut(Some(shortcut("ctrl shift pressed S")))).unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        let store = PreferenceStore::new(NAMESPACE, reopened, catalog()).unwrap();
        assert_eq!(store.retrieve("Save"), Some(shortcut("ctrl shift pressed S")));
        assert_eq!(store.retrieve("Play-PAUSE"), None);

        let json = fs::read_to_string(&path).unwrap();
        assert!(json.contains(NAMESPACE));
        assert!(json.contains("\"#\""));
    }

    #[test]
    fn json_file_store_rejects_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Json { .. })
        ));
    }

    #[test]
    fn json_file_store_failed_write_leaves_value_unchanged() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let mut backend = JsonFileStore::open(blocker.join("preferences.json")).unwrap();
        let result = backend.put(NAMESPACE, "Save", "ctrl S");

        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert_eq!(backend.get(NAMESPACE, "Save"), None);
    }

    #[test]
    fn failed_write_is_not_seen_by_retrieve() {
        let dir = tempdir().unwrap();
        let prefs_dir = dir.path().join("prefs");
        let path = prefs_dir.join("preferences.json");
        let mut prefs =
            PreferenceStore::new(NAMESPACE, JsonFileStore::open(&path).unwrap(), catalog())
                .unwrap();
        prefs.init(false).unwrap();

        // Replace the preferences directory with a regular file so the next write fails.
        fs::remove_dir_all(&prefs_dir).unwrap();
        fs::write(&prefs_dir, "").unwrap();

        let save = prefs.catalog().get("Save").unwrap().clone();
        let result = prefs.store(&save.with_shortcut(Some(shortcut("alt S"))));

        assert!(matches!(result, Err(PreferenceError::Store(_))));
        assert_eq!(prefs.retrieve("Save"), Some(shortcut("ctrl S")));
    }
}
