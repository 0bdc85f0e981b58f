use miniroom_core::{Mode, Tool};

/// What a key press asks the editor to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    ToggleLock,
    SetTool(Tool),
    Duplicate,
    Delete,
    Deselect,
    Undo,
    Redo,
    ToggleGrid,
    ToggleGridSnap,
    ToggleRotationSnap,
    SetMode(Mode),
    ToggleViewLock,
}

/// Maps a `KeyboardEvent.key` plus modifier state to an editor action.
///
/// `ctrl` covers both Control and Meta.
#[inline]
pub fn action_for_key(key: &str, ctrl: bool, shift: bool) -> Option<KeyAction> {
    if ctrl {
        return match key {
            "z" | "Z" if shift => Some(KeyAction::Redo),
            "z" | "Z" => Some(KeyAction::Undo),
            "y" | "Y" => Some(KeyAction::Redo),
            "g" | "G" => Some(KeyAction::ToggleGridSnap),
            "r" | "R" => Some(KeyAction::ToggleRotationSnap),
            _ => None,
        };
    }
    match key {
        "l" | "L" => Some(KeyAction::ToggleLock),
        "q" | "Q" => Some(KeyAction::SetTool(Tool::Select)),
        "t" | "T" => Some(KeyAction::SetTool(Tool::Translate)),
        "r" | "R" => Some(KeyAction::SetTool(Tool::Rotate)),
        "s" | "S" => Some(KeyAction::SetTool(Tool::Scale)),
        "d" | "D" => Some(KeyAction::Duplicate),
        "Delete" | "Backspace" => Some(KeyAction::Delete),
        "Escape" => Some(KeyAction::Deselect),
        "g" | "G" => Some(KeyAction::ToggleGrid),
        "v" | "V" => Some(KeyAction::SetMode(Mode::View)),
        "e" | "E" => Some(KeyAction::SetMode(Mode::Edit)),
        "k" | "K" => Some(KeyAction::ToggleViewLock),
        _ => None,
    }
}

/// Actions that only make sense while editing.
#[inline]
pub fn requires_edit_mode(action: KeyAction) -> bool {
    !matches!(action, KeyAction::SetMode(_) | KeyAction::ToggleViewLock | KeyAction::ToggleGrid)
}
