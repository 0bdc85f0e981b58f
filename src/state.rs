use std::cell::RefCell;

use miniroom_core::{EditorState, LayoutStore, Mode, ViewLock};

use crate::camera::CameraControlsRig;
use crate::keymap::{requires_edit_mode, KeyAction};
use crate::storage::LocalStorage;

/// Everything the bindings keep between JS calls.
pub struct App {
    pub editor: EditorState,
    pub view_lock: ViewLock,
    pub rig: Option<CameraControlsRig>,
    pub layout: LayoutStore<LocalStorage>,
}

impl App {
    fn new() -> Self {
        Self {
            editor: EditorState::new(),
            view_lock: ViewLock::default(),
            rig: None,
            layout: LayoutStore::new(LocalStorage),
        }
    }

    /// Applies a keyboard action; returns whether it was consumed.
    pub fn apply(&mut self, action: KeyAction) -> bool {
        if requires_edit_mode(action) && self.editor.mode() != Mode::Edit {
            return false;
        }
        let selected = self.editor.selected().map(str::to_owned);
        match action {
            KeyAction::ToggleLock => {
                let Some(id) = selected else { return false };
                if let Err(e) = self.editor.toggle_lock(&id) {
                    log::warn!("[keys] lock toggle failed: {}", e);
                }
            }
            KeyAction::SetTool(tool) => self.editor.set_tool(tool),
            KeyAction::Duplicate => {
                let Some(id) = selected else { return false };
                match self.editor.duplicate_item(&id) {
                    Ok(copy) => log::info!("[keys] duplicated {} -> {}", id, copy),
                    Err(e) => log::warn!("[keys] duplicate failed: {}", e),
                }
            }
            KeyAction::Delete => {
                let Some(id) = selected else { return false };
                if let Err(e) = self.editor.remove_item(&id) {
                    log::warn!("[keys] delete failed: {}", e);
                }
            }
            KeyAction::Deselect => self.editor.select_item(None),
            KeyAction::Undo => {
                self.editor.undo();
            }
            KeyAction::Redo => {
                self.editor.redo();
            }
            KeyAction::ToggleGrid => {
                self.editor.toggle_grid();
            }
            KeyAction::ToggleGridSnap => {
                let on = self.editor.toggle_grid_snap();
                log::info!("[keys] grid snap {}", if on { "on" } else { "off" });
            }
            KeyAction::ToggleRotationSnap => {
                let on = self.editor.toggle_rotation_snap();
                log::info!("[keys] rotation snap {}", if on { "on" } else { "off" });
            }
            KeyAction::SetMode(mode) => self.editor.set_mode(mode),
            KeyAction::ToggleViewLock => {
                let Some(rig) = self.rig.as_mut() else {
                    log::warn!("[keys] no camera controls attached");
                    return false;
                };
                self.view_lock.toggle(rig);
                self.editor.set_view_locked(self.view_lock.is_locked());
            }
        }
        true
    }
}

thread_local! {
    static APP: RefCell<App> = RefCell::new(App::new());
}

/// Runs `f` with the shared app state. Returns `None` on re-entrant use
/// (a JS callback calling back into the bindings mid-update).
pub fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|app| match app.try_borrow_mut() {
        Ok(mut app) => Some(f(&mut app)),
        Err(_) => {
            log::warn!("[state] re-entrant access skipped");
            None
        }
    })
}
