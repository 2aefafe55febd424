//! Keyboard shortcut registry.

use crate::input::KeyEvent;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DeleteSelected,
    DuplicateSelected,
    ClearSelection,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    /// Ctrl, or Cmd on macOS.
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+D").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.key.eq_ignore_ascii_case(&event.key)
            && self.ctrl == event.modifiers.command()
            && self.shift == event.modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", false, false, Command::DeleteSelected, "Delete selected element"),
            Shortcut::new("Backspace", false, false, Command::DeleteSelected, "Delete selected element"),
            Shortcut::new("D", true, false, Command::DuplicateSelected, "Duplicate selected element"),
            Shortcut::new("Escape", false, false, Command::ClearSelection, "Clear selection"),
        ]
    }

    /// Find the command bound to a key press.
    pub fn lookup(event: &KeyEvent) -> Option<Command> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(event))
            .map(|shortcut| shortcut.command)
    }

    /// Shortcut list for help output.
    pub fn describe() -> String {
        Self::all()
            .iter()
            .map(|shortcut| format!("  {:20} {}", shortcut.format(), shortcut.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
