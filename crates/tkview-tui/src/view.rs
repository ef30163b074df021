//! Pane focus for the TKView dashboard.
//!
//! The dashboard shows three panes at once; focus decides which one receives
//! navigation keys and which one is drawn with a highlighted border.

use std::fmt;

/// Panes of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pane {
    /// Organisation → environment tree
    #[default]
    Environments,
    /// Agents of the selected organisation
    Agents,
    /// Workflows of the selected environment, with executions
    Workflows,
}

impl Pane {
    /// All panes in focus-cycling order.
    pub const ALL: [Pane; 3] = [Pane::Environments, Pane::Agents, Pane::Workflows];

    /// Returns the hotkey character for this pane.
    pub fn hotkey(&self) -> char {
        match self {
            Pane::Environments => 'e',
            Pane::Agents => 'a',
            Pane::Workflows => 'w',
        }
    }

    /// Returns the display title for this pane.
    pub fn title(&self) -> &'static str {
        match self {
            Pane::Environments => "Environments",
            Pane::Agents => "Agents",
            Pane::Workflows => "Workflows",
        }
    }

    /// Title with the hotkey marked, e.g. `(E)nvironments`.
    pub fn hotkey_title(&self) -> String {
        let title = self.title();
        format!("({}){}", &title[..1], &title[1..])
    }

    /// Returns the next pane in the cycle.
    pub fn next(&self) -> Pane {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Returns the previous pane in the cycle.
    pub fn prev(&self) -> Pane {
        let idx = Self::ALL.iter().position(|p| p == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Try to parse a pane from a hotkey character.
    pub fn from_hotkey(key: char) -> Option<Pane> {
        match key.to_ascii_lowercase() {
            'e' => Some(Pane::Environments),
            'a' => Some(Pane::Agents),
            'w' => Some(Pane::Workflows),
            _ => None,
        }
    }
}

impl fmt::Display for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}
