//! Editor state: placed items, selection, tools, snapping, undo history and
//! the debounced auto-lock.

use std::collections::VecDeque;
use std::time::Duration;

use fnv::FnvHashMap;
use glam::Vec3;
use instant::Instant;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::EditorError;
use crate::placement::{constrain_to_room, Footprint, PlacedItem};
use crate::room::{RoomDimensions, RoomDimensionsPatch};
use crate::snap::{LockedSnapSettings, SnapConfig};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    View,
    Edit,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Translate,
    Rotate,
    Scale,
    Delete,
    Duplicate,
}

impl Tool {
    /// Next tool in the keyboard cycle. Delete/Duplicate fall back to Select.
    pub fn next(self) -> Self {
        match self {
            Tool::Select => Tool::Translate,
            Tool::Translate => Tool::Rotate,
            Tool::Rotate => Tool::Scale,
            Tool::Scale | Tool::Delete | Tool::Duplicate => Tool::Select,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoLockSettings {
    pub enabled: bool,
    pub delay_ms: u64,
}

impl Default for AutoLockSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_ms: AUTO_LOCK_DELAY_MS,
        }
    }
}

/// Partial item update; present fields replace the item's.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub footprint: Option<Footprint>,
}

impl ItemUpdate {
    pub fn position(p: Vec3) -> Self {
        Self {
            position: Some(p),
            ..Default::default()
        }
    }

    pub fn rotation(r: Vec3) -> Self {
        Self {
            rotation: Some(r),
            ..Default::default()
        }
    }

    pub fn scale(s: Vec3) -> Self {
        Self {
            scale: Some(s),
            ..Default::default()
        }
    }

    fn moves(&self) -> bool {
        self.position.is_some() || self.rotation.is_some() || self.scale.is_some()
    }

    fn affects_bounds(&self) -> bool {
        self.moves() || self.footprint.is_some()
    }
}

/// Debounced per-item lock timer.
///
/// `gesture_ended` arms (or re-arms) a deadline; `poll` hands back every id
/// whose deadline has passed, sorted, and forgets it.
#[derive(Debug, Default)]
pub struct AutoLockTimer {
    deadlines: FnvHashMap<String, Instant>,
}

impl AutoLockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture_ended(&mut self, id: &str, now: Instant, delay: Duration) {
        self.deadlines.insert(id.to_owned(), now + delay);
    }

    pub fn cancel(&mut self, id: &str) {
        self.deadlines.remove(id);
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_armed(&self, id: &str) -> bool {
        self.deadlines.contains_key(id)
    }

    pub fn poll(&mut self, now: Instant) -> Vec<String> {
        let mut due: Vec<String> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(id, _)| id.clone())
            .collect();
        due.sort();
        for id in &due {
            self.deadlines.remove(id);
        }
        due
    }
}

#[derive(Debug, Default)]
struct History {
    past: VecDeque<Vec<PlacedItem>>,
    future: Vec<Vec<PlacedItem>>,
}

impl History {
    fn record(&mut self, snapshot: Vec<PlacedItem>) {
        self.past.push_back(snapshot);
        while self.past.len() > MAX_HISTORY {
            self.past.pop_front();
        }
        self.future.clear();
    }
}

#[derive(Debug, Default)]
pub struct EditorState {
    items: Vec<PlacedItem>,
    selected: Option<String>,
    mode: Mode,
    tool: Tool,
    pub snap: SnapConfig,
    pub auto_lock: AutoLockSettings,
    room: RoomDimensions,
    show_grid: bool,
    view_locked: bool,
    history: History,
    timer: AutoLockTimer,
    copy_counter: u64,
    revision: u64,
}

impl EditorState {
    pub fn new() -> Self {
        Self {
            show_grid: true,
            ..Default::default()
        }
    }

    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn item(&self, id: &str) -> Option<&PlacedItem> {
        self.items.iter().find(|it| it.id == id)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn room(&self) -> &RoomDimensions {
        &self.room
    }

    pub fn show_grid(&self) -> bool {
        self.show_grid
    }

    pub fn is_view_locked(&self) -> bool {
        self.view_locked
    }

    pub fn set_view_locked(&mut self, locked: bool) {
        self.view_locked = locked;
    }

    fn index_of(&self, id: &str) -> Result<usize, EditorError> {
        self.items
            .iter()
            .position(|it| it.id == id)
            .ok_or_else(|| EditorError::NotFound(id.to_owned()))
    }

    fn checkpoint(&mut self) {
        self.history.record(self.items.clone());
        self.revision += 1;
    }

    /// Bumped on every change to the item list, including undo and redo.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn constrained(&self, item: &PlacedItem) -> PlacedItem {
        constrain_to_room(item, &self.room.boundaries(), FURNITURE_SAFETY_MARGIN)
    }

    /// Adds `item` (moved inside the room if needed) and selects it.
    pub fn add_item(&mut self, item: PlacedItem) -> Result<(), EditorError> {
        if self.item(&item.id).is_some() {
            log::warn!("[editor] duplicate id {}", item.id);
            return Err(EditorError::DuplicateId(item.id));
        }
        let item = self.constrained(&item);
        self.checkpoint();
        log::debug!("[editor] added {}", item.display_name());
        self.selected = Some(item.id.clone());
        self.items.push(item);
        Ok(())
    }

    pub fn update_item(&mut self, id: &str, update: ItemUpdate) -> Result<(), EditorError> {
        let idx = self.index_of(id)?;
        let current = &self.items[idx];
        if current.locked && update.moves() {
            return Err(EditorError::ItemLocked(id.to_owned()));
        }

        let mut next = current.clone();
        if let Some(name) = &update.name {
            next.name = name.clone();
        }
        if let Some(p) = update.position {
            next.position = p;
        }
        if let Some(r) = update.rotation {
            next.rotation = r;
        }
        if let Some(s) = update.scale {
            next.scale = s;
        }
        if let Some(f) = update.footprint {
            next.footprint = f;
        }
        if update.affects_bounds() {
            next = self.constrained(&next);
        }
        if next == self.items[idx] {
            return Ok(());
        }

        self.checkpoint();
        self.items[idx] = next;
        Ok(())
    }

    pub fn remove_item(&mut self, id: &str) -> Result<PlacedItem, EditorError> {
        let idx = self.index_of(id)?;
        self.checkpoint();
        let removed = self.items.remove(idx);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.timer.cancel(id);
        log::debug!("[editor] removed {}", removed.display_name());
        Ok(removed)
    }

    /// Copies `id` next to the original and selects the copy. Returns its id.
    pub fn duplicate_item(&mut self, id: &str) -> Result<String, EditorError> {
        let original = self.items[self.index_of(id)?].clone();
        let new_id = loop {
            self.copy_counter += 1;
            let candidate = format!("{}_copy_{}", original.id, self.copy_counter);
            if self.item(&candidate).is_none() {
                break candidate;
            }
        };
        let mut copy = original;
        copy.id = new_id.clone();
        copy.position += duplicate_offset_vec3();
        copy.locked = false;
        copy.snap_settings = None;
        let copy = self.constrained(&copy);

        self.checkpoint();
        self.items.push(copy);
        self.selected = Some(new_id.clone());
        Ok(new_id)
    }

    /// Selects `id`; `None` clears the selection. Unknown ids are ignored.
    pub fn select_item(&mut self, id: Option<&str>) {
        match id {
            Some(id) if self.item(id).is_none() => {
                log::debug!("[editor] select ignored, unknown {}", id);
            }
            _ => self.selected = id.map(str::to_owned),
        }
    }

    /// Locks `id`, remembering the snap settings active at lock time.
    pub fn lock_item(&mut self, id: &str) -> Result<(), EditorError> {
        let idx = self.index_of(id)?;
        self.timer.cancel(id);
        if self.items[idx].locked {
            return Ok(());
        }
        self.checkpoint();
        let snap = LockedSnapSettings::from(&self.snap);
        let item = &mut self.items[idx];
        item.locked = true;
        item.snap_settings = Some(snap);
        log::info!("[editor] locked {}", item.display_name());
        Ok(())
    }

    pub fn unlock_item(&mut self, id: &str) -> Result<(), EditorError> {
        let idx = self.index_of(id)?;
        if !self.items[idx].locked {
            return Ok(());
        }
        self.checkpoint();
        let item = &mut self.items[idx];
        item.locked = false;
        log::info!("[editor] unlocked {}", item.display_name());
        Ok(())
    }

    /// Flips the lock of `id`; returns the new state.
    pub fn toggle_lock(&mut self, id: &str) -> Result<bool, EditorError> {
        let locked = self.items[self.index_of(id)?].locked;
        if locked {
            self.unlock_item(id)?;
        } else {
            self.lock_item(id)?;
        }
        Ok(!locked)
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        if mode == Mode::View {
            self.tool = Tool::Select;
        }
        log::info!("[editor] mode {:?}", mode);
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    pub fn cycle_tool(&mut self) -> Tool {
        self.tool = self.tool.next();
        self.tool
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.show_grid = !self.show_grid;
        self.show_grid
    }

    pub fn toggle_grid_snap(&mut self) -> bool {
        self.snap.grid.enabled = !self.snap.grid.enabled;
        self.snap.grid.enabled
    }

    pub fn toggle_rotation_snap(&mut self) -> bool {
        self.snap.rotation.enabled = !self.snap.rotation.enabled;
        self.snap.rotation.enabled
    }

    pub fn set_room_dimensions(&mut self, patch: RoomDimensionsPatch) {
        self.room.apply(patch);
    }

    pub fn can_undo(&self) -> bool {
        !self.history.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.history.future.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(prev) = self.history.past.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.items, prev);
        self.history.future.push(current);
        self.revision += 1;
        self.fix_selection();
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.future.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.items, next);
        self.history.past.push_back(current);
        self.revision += 1;
        self.fix_selection();
        true
    }

    pub fn clear_history(&mut self) {
        self.history = History::default();
    }

    fn fix_selection(&mut self) {
        if let Some(id) = self.selected.clone() {
            if self.item(&id).is_none() {
                self.selected = None;
            }
        }
    }

    /// Replaces all items (e.g. from a saved layout) and resets history.
    pub fn load_items(&mut self, items: Vec<PlacedItem>) {
        self.items = items.iter().map(|it| self.constrained(it)).collect();
        self.selected = None;
        self.timer.clear();
        self.clear_history();
        self.revision += 1;
    }

    /// A move/rotate/scale gesture on `id` finished at `now`.
    pub fn end_gesture(&mut self, id: &str, now: Instant) {
        if !self.auto_lock.enabled {
            return;
        }
        match self.item(id) {
            Some(item) if !item.locked => {
                let delay = Duration::from_millis(self.auto_lock.delay_ms);
                self.timer.gesture_ended(id, now, delay);
            }
            _ => {}
        }
    }

    /// A new gesture started on `id`; pending auto-lock is postponed.
    pub fn begin_gesture(&mut self, id: &str) {
        self.timer.cancel(id);
    }

    pub fn auto_lock_pending(&self, id: &str) -> bool {
        self.timer.is_armed(id)
    }

    /// Locks every item whose auto-lock delay has elapsed; returns their ids.
    pub fn tick(&mut self, now: Instant) -> Vec<String> {
        let due = self.timer.poll(now);
        let mut locked = Vec::with_capacity(due.len());
        for id in due {
            if self.lock_item(&id).is_ok() {
                locked.push(id);
            }
        }
        locked
    }

    pub fn set_auto_lock_enabled(&mut self, enabled: bool) {
        self.auto_lock.enabled = enabled;
        if !enabled {
            self.timer.clear();
        }
    }

    pub fn set_auto_lock_delay(&mut self, delay_ms: u64) {
        self.auto_lock.delay_ms = delay_ms;
    }
}
