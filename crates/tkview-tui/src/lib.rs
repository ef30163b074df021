//! # tkview-tui
//!
//! Terminal user interface for the TKView dashboard.
//!
//! The UI is built on Ratatui and follows a message-driven design: key
//! presses and fetch results become [`Message`]s, a single [`Session`]
//! applies them in order, and the [`Command`]s it returns are executed by
//! the [`App`] shell.

pub mod app;
pub mod event;
pub mod message;
pub mod render;
pub mod session;
pub mod view;

pub use app::{App, AppResult, SharedLister, restore_terminal, setup_terminal};
pub use event::{InputHandler, Intent};
pub use message::{Command, Message};
pub use session::{ErrorNotice, Loading, Session, Snapshot};
pub use view::Pane;
