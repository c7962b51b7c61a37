//! # Panel Adapter
//!
//! The display + keypad capability the engine drives. The engine only ever
//! talks to `dyn Panel`; which hardware sits behind it is decided in `main`.
//!
//! ```text
//!   Panel
//!   ├── initialize / teardown
//!   ├── clear / message / set_cursor / toggle_blink   (display)
//!   ├── is_pressed(button)                            (keypad levels)
//!   └── release_hook()                                (teardown from the signal thread)
//! ```
//!
//! `render()` and friends sit on top of the trait. Display failures are
//! logged and swallowed: a flaky display must not stop the control loop.

mod event;
pub mod lcd;
pub mod terminal;
mod ui;

use std::fmt;
use std::time::Duration;

use log::warn;

use crate::core::debounce::Button;

pub use terminal::TerminalPanel;

/// Display teardown that can run on another thread.
pub type ReleaseHook = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug)]
pub enum PanelError {
    Io(std::io::Error),
    /// Operation attempted before `initialize` or after `teardown`.
    NotInitialized,
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Io(e) => write!(f, "panel I/O error: {e}"),
            PanelError::NotInitialized => write!(f, "panel not initialized"),
        }
    }
}

impl std::error::Error for PanelError {}

impl From<std::io::Error> for PanelError {
    fn from(e: std::io::Error) -> Self {
        PanelError::Io(e)
    }
}

pub trait Panel {
    fn initialize(&mut self, cols: u16, rows: u16) -> Result<(), PanelError>;

    fn clear(&mut self) -> Result<(), PanelError>;

    /// Write text at the cursor. `\n` starts the next row.
    fn message(&mut self, text: &str) -> Result<(), PanelError>;

    fn set_cursor(&mut self, col: u16, row: u16) -> Result<(), PanelError>;

    fn toggle_blink(&mut self) -> Result<(), PanelError>;

    /// Raw level: is the button physically down right now.
    fn is_pressed(&mut self, button: Button) -> bool;

    /// Keep the current screen up. Blocks the caller.
    fn hold(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn teardown(&mut self) -> Result<(), PanelError>;

    fn release_hook(&self) -> ReleaseHook;
}

/// Show `text`, optionally clearing first, and keep it up for `hold`.
pub fn render(panel: &mut dyn Panel, text: &str, hold: Duration, clear: bool) {
    if clear && let Err(e) = panel.clear() {
        warn!("Failed to clear display: {}", e);
    }
    if let Err(e) = panel.message(text) {
        warn!("Failed to write {:?} to display: {}", text, e);
    }
    if !hold.is_zero() {
        panel.hold(hold);
    }
}

/// Clear and show `text` with no hold.
pub fn show(panel: &mut dyn Panel, text: &str) {
    render(panel, text, Duration::ZERO, true);
}

/// Clear and show `text` for `hold`.
pub fn show_for(panel: &mut dyn Panel, text: &str, hold: Duration) {
    render(panel, text, hold, true);
}

/// Park the cursor at `(col, row)` and toggle the blink indicator.
/// Called once to start a busy indication and once more to stop it.
pub fn toggle_busy(panel: &mut dyn Panel, at: Option<(u16, u16)>) {
    if let Some((col, row)) = at
        && let Err(e) = panel.set_cursor(col, row)
    {
        warn!("Failed to move display cursor: {}", e);
    }
    if let Err(e) = panel.toggle_blink() {
        warn!("Failed to toggle blink: {}", e);
    }
}
