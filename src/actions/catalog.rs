//! Action catalog loading from XML definitions.
//!
//! Definitions look like:
//!
//! ```xml
//! <actions>
//!   <action class="SaveAction" name="Save" tooltip="Save the file">
//!     <shortcut>
//!       <mask keyname="menu"/>
//!       <key keyname="S"/>
//!     </shortcut>
//!   </action>
//!   <action class="SeekAction" enum="FORWARD" name="Forward" os="linux,windows"/>
//! </actions>
//! ```
//!
//! Entries restricted to other operating systems are skipped, as are entries
//! whose shortcut cannot be decoded. Duplicate ids or duplicate default
//! shortcuts among the surviving entries reject the whole catalog.

use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::io::BufRead;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::types::Action;
use crate::shortcuts::{Platform, ShortcutCodec};

/// Errors that abort catalog loading.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("failed to read action definitions from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed action definitions: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("shortcuts file contains duplicate ID: {0}")]
    DuplicateId(String),

    #[error("shortcuts file contains duplicate shortcut: {0}")]
    DuplicateShortcut(String),
}

#[derive(Debug, Default, Deserialize)]
struct ActionsRoot {
    #[serde(rename = "action", default)]
    actions: Vec<ActionElement>,
}

#[derive(Debug, Deserialize)]
struct ActionElement {
    #[serde(rename = "@class")]
    class_name: String,
    #[serde(rename = "@name", default)]
    name: Option<String>,
    #[serde(rename = "@tooltip", default)]
    tooltip: Option<String>,
    #[serde(rename = "@enum", default)]
    enum_value: Option<String>,
    #[serde(rename = "@os", default)]
    os: Option<String>,
    #[serde(default)]
    shortcut: Option<ShortcutElement>,
}

#[derive(Debug, Default, Deserialize)]
struct ShortcutElement {
    #[serde(rename = "mask", default)]
    masks: Vec<KeyElement>,
    #[serde(rename = "key", default)]
    keys: Vec<KeyElement>,
}

#[derive(Debug, Deserialize)]
struct KeyElement {
    #[serde(rename = "@keyname")]
    keyname: String,
}

/// Loads action definitions for one host.
#[derive(Clone, Debug)]
pub struct CatalogLoader {
    codec: ShortcutCodec,
    os_name: String,
}

impl CatalogLoader {
    pub fn new(platform: Platform, os_name: impl Into<String>) -> Self {
        Self {
            codec: ShortcutCodec::new(platform),
            os_name: os_name.into(),
        }
    }

    /// Loader for the running platform, identified by `std::env::consts::OS`.
    pub fn for_current_host() -> Self {
        Self::new(Platform::current(), std::env::consts::OS)
    }

    pub fn platform(&self) -> Platform {
        self.codec.platform()
    }

    pub fn os_name(&self) -> &str {
        &self.os_name
    }

    #[instrument(skip(self), fields(os = %self.os_name))]
    pub fn load_path(&self, path: &Path) -> Result<ActionCatalog, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let catalog = self.load_str(&content)?;
        info!(
            path = %path.display(),
            actions = catalog.len(),
            "Loaded action catalog"
        );
        Ok(catalog)
    }

    pub fn load_reader<R: BufRead>(&self, reader: R) -> Result<ActionCatalog, CatalogError> {
        let root: ActionsRoot = quick_xml::de::from_reader(reader)?;
        self.build(root)
    }

    pub fn load_str(&self, xml: &str) -> Result<ActionCatalog, CatalogError> {
        let root: ActionsRoot = quick_xml::de::from_str(xml)?;
        self.build(root)
    }

    fn build(&self, root: ActionsRoot) -> Result<ActionCatalog, CatalogError> {
        let actions: Vec<Action> = root
            .actions
            .into_iter()
            .filter_map(|element| self.parse_action(element))
            .collect();

        assert_no_dups(actions.iter().map(Action::id), CatalogError::DuplicateId)?;
        assert_no_dups(
            actions
                .iter()
                .filter_map(|a| a.default_shortcut.as_ref())
                .map(|s| s.internal_form().to_string()),
            CatalogError::DuplicateShortcut,
        )?;

        Ok(ActionCatalog { actions })
    }

    fn parse_action(&self, element: ActionElement) -> Option<Action> {
        if let Some(os) = &element.os {
            if !os.split(',').any(|allowed| allowed.trim() == self.os_name) {
                debug!(
                    class = %element.class_name,
                    allowed = %os,
                    "Skipping action restricted to other platforms"
                );
                return None;
            }
        }

        let shortcut = match &element.shortcut {
            None => None,
            Some(declared) => {
                let masks: Vec<&str> = declared.masks.iter().map(|k| k.keyname.as_str()).collect();
                let keys: Vec<&str> = declared.keys.iter().map(|k| k.keyname.as_str()).collect();
                match self.codec.decode_external(&masks, &keys) {
                    Ok(shortcut) => Some(shortcut),
                    Err(error) => {
                        // An undecodable shortcut drops the whole entry.
                        warn!(
                            class = %element.class_name,
                            variant = ?element.enum_value,
                            error = %error,
                            "Dropping action with unparseable shortcut"
                        );
                        return None;
                    }
                }
            }
        };

        Some(Action::new(
            element.class_name,
            element.enum_value,
            element.name.unwrap_or_default(),
            element.tooltip.unwrap_or_default(),
            shortcut,
        ))
    }
}

fn assert_no_dups<T, I>(items: I, error: fn(T) -> CatalogError) -> Result<(), CatalogError>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    for item in items {
        if !seen.insert(item.clone()) {
            warn!("Rejecting action catalog with duplicate entries");
            return Err(error(item));
        }
    }
    Ok(())
}

/// The validated, OS-filtered, duplicate-free list of default actions.
#[derive(Clone, Debug, Default)]
pub struct ActionCatalog {
    actions: Vec<Action>,
}

impl ActionCatalog {
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> Vec<String> {
        self.actions.iter().map(Action::id).collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActionCatalog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.iter()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
