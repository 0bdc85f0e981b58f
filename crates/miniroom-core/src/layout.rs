//! Saving and restoring the current room layout.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::constants::CURRENT_LAYOUT_KEY;
use crate::editor::EditorState;
use crate::error::StorageError;
use crate::placement::PlacedItem;
use crate::snap::SnapConfig;
use crate::storage::KeyValueStorage;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoom {
    pub items: Vec<PlacedItem>,
    #[serde(default)]
    pub snap: SnapConfig,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
}

/// Layout persistence plus the editor revision last written or restored.
pub struct LayoutStore<S> {
    storage: S,
    saved_revision: Cell<u64>,
}

impl<S: KeyValueStorage> LayoutStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            saved_revision: Cell::new(0),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Writes the editor's items and snap settings, stamped with `timestamp`.
    pub fn save_current(&self, state: &EditorState, timestamp: f64) -> Result<(), StorageError> {
        let room = SavedRoom {
            items: state.items().to_vec(),
            snap: state.snap,
            timestamp,
        };
        let json = serde_json::to_string(&room).map_err(|e| StorageError::Backend(e.to_string()))?;
        self.storage.set_item(CURRENT_LAYOUT_KEY, &json)?;
        self.saved_revision.set(state.revision());
        log::info!("[layout] saved {} items", room.items.len());
        Ok(())
    }

    /// The saved layout, or `None` when absent, unreadable or malformed.
    pub fn load_saved(&self) -> Option<SavedRoom> {
        let raw = match self.storage.get_item(CURRENT_LAYOUT_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("[layout] load skipped: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(room) => Some(room),
            Err(e) => {
                log::warn!("[layout] ignoring malformed layout: {}", e);
                None
            }
        }
    }

    pub fn has_saved(&self) -> bool {
        matches!(self.storage.get_item(CURRENT_LAYOUT_KEY), Ok(Some(_)))
    }

    /// Loads the saved layout into `state`. Returns whether anything was restored.
    pub fn restore_into(&self, state: &mut EditorState) -> bool {
        match self.load_saved() {
            Some(room) => {
                state.snap = room.snap;
                state.load_items(room.items);
                self.saved_revision.set(state.revision());
                true
            }
            None => false,
        }
    }

    /// Whether `state` changed since the last save or restore.
    pub fn is_dirty(&self, state: &EditorState) -> bool {
        state.revision() != self.saved_revision.get()
    }

    /// Saves only when [`is_dirty`](Self::is_dirty). Returns whether a write happened.
    pub fn autosave(&self, state: &EditorState, timestamp: f64) -> Result<bool, StorageError> {
        if !self.is_dirty(state) {
            return Ok(false);
        }
        self.save_current(state, timestamp)?;
        Ok(true)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(CURRENT_LAYOUT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Footprint;
    use crate::storage::MemoryStorage;
    use glam::Vec3;

    #[test]
    fn save_and_restore_round_trip() {
        let store = LayoutStore::new(MemoryStorage::new());
        assert!(!store.has_saved());

        let mut ed = EditorState::new();
        ed.add_item(PlacedItem::new("sofa", Footprint::new(2.0, 1.0, 0.8)).at(Vec3::new(1.0, 0.0, 2.0)))
            .unwrap();
        ed.lock_item("sofa").unwrap();
        ed.snap.rotation.angle_degrees = 30.0;
        store.save_current(&ed, 1_700_000_000_000.0).unwrap();
        assert!(store.has_saved());

        let saved = store.load_saved().unwrap();
        assert_eq!(saved.timestamp, 1_700_000_000_000.0);
        assert_eq!(saved.items, ed.items());

        let mut fresh = EditorState::new();
        assert!(store.restore_into(&mut fresh));
        assert_eq!(fresh.items(), ed.items());
        assert_eq!(fresh.snap.rotation.angle_degrees, 30.0);
        assert!(!fresh.can_undo());
    }

    #[test]
    fn restored_layout_is_not_written_back() {
        let store = LayoutStore::new(MemoryStorage::new());
        let mut ed = EditorState::new();
        assert!(!store.is_dirty(&ed));
        ed.add_item(PlacedItem::new("a", Footprint::default())).unwrap();
        assert!(store.is_dirty(&ed));
        assert!(store.autosave(&ed, 1.0).unwrap());
        assert!(!store.autosave(&ed, 2.0).unwrap());

        let mut fresh = EditorState::new();
        fresh.add_item(PlacedItem::new("b", Footprint::default())).unwrap();
        assert!(store.restore_into(&mut fresh));
        assert!(!store.is_dirty(&fresh));
        assert!(!store.autosave(&fresh, 3.0).unwrap());
        assert_eq!(store.load_saved().unwrap().timestamp, 1.0);

        fresh.select_item(Some("a"));
        fresh.toggle_grid();
        fresh.remove_item("a").unwrap();
        assert!(store.autosave(&fresh, 4.0).unwrap());
    }

    #[test]
    fn malformed_layout_is_none() {
        let storage = MemoryStorage::new();
        storage.set_item(CURRENT_LAYOUT_KEY, "{\"items\": 3}").unwrap();
        let store = LayoutStore::new(storage);
        assert!(store.has_saved());
        assert_eq!(store.load_saved(), None);
        assert!(!store.restore_into(&mut EditorState::new()));
    }

    #[test]
    fn unavailable_storage_fails_save() {
        let store = LayoutStore::new(MemoryStorage::unavailable());
        let err = store.save_current(&EditorState::new(), 0.0).unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
        assert_eq!(store.load_saved(), None);
    }

    #[test]
    fn stored_items_use_locked_flag_name() {
        let storage = MemoryStorage::new();
        let mut ed = EditorState::new();
        ed.add_item(PlacedItem::new("a", Footprint::default())).unwrap();
        ed.lock_item("a").unwrap();
        let store = LayoutStore::new(storage);
        store.save_current(&ed, 1.0).unwrap();
        let raw = store.storage().get_item(CURRENT_LAYOUT_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""isLocked":true"#), "{raw}");
        assert!(raw.contains(r#""snapSettings""#), "{raw}");
        store.clear().unwrap();
        assert!(!store.has_saved());
    }
}
