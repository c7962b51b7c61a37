//! # Engine State
//!
//! Everything the front panel remembers between button presses lives in one
//! owned `Engine`. Handlers receive it explicitly; there are no globals.
//!
//! ```text
//! Engine
//! ├── content: Menu          // payloads found on storage (rebuilt on refresh)
//! ├── commands: Menu         // device actions (built once at startup)
//! ├── active: MenuKind       // which of the two menus the cursor lives in
//! ├── targets: Vec<String>   // remote target addresses
//! ├── target_index: usize    // currently selected target
//! └── debouncer: Debouncer   // buttons already reacted to and still held
//! ```
//!
//! The selection is never cached: `selection()` always reads the active
//! menu's cursor, so it cannot drift out of sync after a rebuild.

use crate::core::debounce::Debouncer;
use crate::core::menu::{Menu, MenuItem};

/// The two menu contexts. Flat, not a hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Content,
    Command,
}

pub struct Engine {
    pub content: Menu,
    pub commands: Menu,
    pub active: MenuKind,
    pub targets: Vec<String>,
    pub target_index: usize,
    pub debouncer: Debouncer,
}

impl Engine {
    /// Starts on the content menu with the first target selected.
    pub fn new(content: Menu, commands: Menu, targets: Vec<String>) -> Self {
        Self {
            content,
            commands,
            active: MenuKind::Content,
            targets,
            target_index: 0,
            debouncer: Debouncer::new(),
        }
    }

    pub fn menu(&self, kind: MenuKind) -> &Menu {
        match kind {
            MenuKind::Content => &self.content,
            MenuKind::Command => &self.commands,
        }
    }

    pub fn active_menu(&self) -> &Menu {
        self.menu(self.active)
    }

    pub fn active_menu_mut(&mut self) -> &mut Menu {
        match self.active {
            MenuKind::Content => &mut self.content,
            MenuKind::Command => &mut self.commands,
        }
    }

    /// Item under the active menu's cursor.
    pub fn selection(&self) -> Option<&MenuItem> {
        self.active_menu().current()
    }

    pub fn current_target(&self) -> Option<&str> {
        self.targets.get(self.target_index).map(String::as_str)
    }

    /// Select the next target, wrapping around. `None` when no targets exist.
    pub fn cycle_target(&mut self) -> Option<&str> {
        if self.targets.is_empty() {
            return None;
        }
        self.target_index = (self.target_index + 1) % self.targets.len();
        self.current_target()
    }

    /// Swap in a freshly built content menu. The old one is dropped.
    pub fn replace_content(&mut self, menu: Menu) {
        self.content = menu;
    }
}
