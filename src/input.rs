/// Modifier keys attached to a pointer or keyboard event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    /// Command on macOS.
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    /// The platform "command" chord: Ctrl, or Cmd on macOS.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// History operations reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    Undo,
    Redo,
}

/// Map a key press to a history action, honoring the conventional chords:
/// Ctrl/Cmd+Z undoes, Shift+Ctrl/Cmd+Z and Ctrl/Cmd+Y redo. Suppressed
/// while focus is inside a text input so the browser/native edit shortcuts
/// keep working there.
pub fn history_shortcut(
    key: &str,
    modifiers: Modifiers,
    in_text_input: bool,
) -> Option<HistoryAction> {
    if in_text_input || !modifiers.command() {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "z" if modifiers.shift => Some(HistoryAction::Redo),
        "z" => Some(HistoryAction::Undo),
        "y" => Some(HistoryAction::Redo),
        _ => None,
    }
}
