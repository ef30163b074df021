//! Keyboard input handling for the TKView TUI.
//!
//! Converts terminal key events into [`Intent`]s, the routing signals the
//! session's update loop understands.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::view::Pane;

/// User intents produced by the input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Request application quit
    Quit,
    /// Move the selection forward in the focused pane
    Next,
    /// Move the selection backward in the focused pane
    Prev,
    /// Expand or collapse the current workflow
    Toggle,
    /// Focus a specific pane
    Focus(Pane),
    /// Focus the next pane
    FocusNext,
    /// Focus the previous pane
    FocusPrev,
    /// Re-fetch the organisation and workflow trees
    Refresh,
    /// Show or hide the help overlay
    ToggleHelp,
    /// Close overlays and dismiss the current error
    Cancel,
    /// No action needed
    None,
}

/// Input handler for converting key events to intents.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Create a new input handler.
    pub fn new() -> Self {
        Self
    }

    /// Handle a key event and return the corresponding intent.
    pub fn handle_key(&self, key: KeyEvent) -> Intent {
        // Ctrl+C always quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Intent::Quit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => Intent::Quit,
            KeyCode::Esc => Intent::Cancel,
            KeyCode::Char('?') => Intent::ToggleHelp,

            KeyCode::Down | KeyCode::Char('j') => Intent::Next,
            KeyCode::Up | KeyCode::Char('k') => Intent::Prev,

            KeyCode::Enter | KeyCode::Char(' ') => Intent::Toggle,

            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    Intent::FocusPrev
                } else {
                    Intent::FocusNext
                }
            }
            KeyCode::BackTab => Intent::FocusPrev,

            KeyCode::Char('r') | KeyCode::Char('R') => Intent::Refresh,

            KeyCode::Char(c) => Pane::from_hotkey(c).map_or(Intent::None, Intent::Focus),

            _ => Intent::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn key_event_with_mods(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn test_focus_hotkeys() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('e'))),
            Intent::Focus(Pane::Environments)
        );
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Intent::Focus(Pane::Agents)
        );
        assert_eq!(
            handler.handle_key(key_event(KeyCode::Char('W'))),
            Intent::Focus(Pane::Workflows)
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        let handler = InputHandler::new();

        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Intent::Quit
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), Intent::Quit);
    }

    #[test]
    fn test_navigation_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), Intent::Next);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), Intent::Next);
        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), Intent::Prev);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), Intent::Prev);
    }

    #[test]
    fn test_toggle_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Enter)), Intent::Toggle);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char(' '))), Intent::Toggle);
    }

    #[test]
    fn test_tab_cycling() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), Intent::FocusNext);
        assert_eq!(
            handler.handle_key(key_event_with_mods(KeyCode::Tab, KeyModifiers::SHIFT)),
            Intent::FocusPrev
        );
        assert_eq!(handler.handle_key(key_event(KeyCode::BackTab)), Intent::FocusPrev);
    }

    #[test]
    fn test_misc_keys() {
        let handler = InputHandler::new();

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('r'))), Intent::Refresh);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('?'))), Intent::ToggleHelp);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), Intent::Cancel);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('x'))), Intent::None);
        assert_eq!(handler.handle_key(key_event(KeyCode::F(5))), Intent::None);
    }
}
