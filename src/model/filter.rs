// File: ./src/model/filter.rs
// Tag selection and the visibility predicate.
//
// Selected tags combine with AND: an entry is shown only if it carries every
// selected tag. With nothing selected, everything is shown.
use crate::error::StorageError;
use crate::model::entry::Entry;
use crate::storage::KeyValueStore;
use std::collections::BTreeMap;

/// Per-tag selection flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    flags: BTreeMap<String, bool>,
}

impl TagSelection {
    /// Every tag of `all_tags` present and unselected.
    pub fn new(all_tags: &[String]) -> Self {
        Self {
            flags: all_tags.iter().map(|t| (t.clone(), false)).collect(),
        }
    }

    /// Selects the tags of `selected` that exist in `all_tags`.
    pub fn from_selected<S: AsRef<str>>(all_tags: &[String], selected: &[S]) -> Self {
        let mut selection = Self::new(all_tags);
        for tag in selected {
            if let Some(flag) = selection.flags.get_mut(tag.as_ref()) {
                *flag = true;
            }
        }
        selection
    }

    pub fn is_selected(&self, tag: &str) -> bool {
        self.flags.get(tag).copied().unwrap_or(false)
    }

    pub fn set(&mut self, tag: &str, selected: bool) {
        self.flags.insert(tag.to_string(), selected);
    }

    /// Selected tags, in `all_tags` order.
    pub fn selected(&self, all_tags: &[String]) -> Vec<String> {
        all_tags
            .iter()
            .filter(|t| self.is_selected(t))
            .cloned()
            .collect()
    }

    /// Restores the selection persisted under `key`. A missing or unreadable
    /// value means nothing is selected.
    pub fn load(store: &dyn KeyValueStore, key: &str, all_tags: &[String]) -> Self {
        match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(selected) => Self::from_selected(all_tags, &selected),
                Err(e) => {
                    log::warn!("Resetting tag selection, stored value is malformed: {}", e);
                    Self::new(all_tags)
                }
            },
            Ok(None) => Self::new(all_tags),
            Err(e) => {
                log::warn!("Resetting tag selection, storage read failed: {}", e);
                Self::new(all_tags)
            }
        }
    }

    pub fn save(
        &self,
        store: &dyn KeyValueStore,
        key: &str,
        all_tags: &[String],
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.selected(all_tags))
            .map_err(|e| StorageError::malformed(key, e))?;
        store.set(key, &json)
    }
}

/// True when the entry carries every tag of `all_tags` that is selected.
pub fn is_visible(entry_tags: &[String], selection: &TagSelection, all_tags: &[String]) -> bool {
    all_tags
        .iter()
        .filter(|tag| selection.is_selected(tag))
        .all(|tag| entry_tags.contains(tag))
}

/// Flips one tag. An unknown tag becomes selected.
pub fn toggle(tag: &str, mut selection: TagSelection) -> TagSelection {
    let current = selection.is_selected(tag);
    selection.set(tag, !current);
    selection
}

/// Keeps the visible entries of an ordered view, preserving its order.
pub fn visible<'a>(
    entries: &[&'a Entry],
    selection: &TagSelection,
    all_tags: &[String],
) -> Vec<&'a Entry> {
    entries
        .iter()
        .copied()
        .filter(|entry| is_visible(&entry.tags, selection, all_tags))
        .collect()
}
