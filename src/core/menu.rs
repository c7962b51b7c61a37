//! # Menus
//!
//! A `Menu` is an ordered, cyclic list of `MenuItem`s with a cursor.
//! Each item carries a `Command`: the tag the handler dispatcher executes
//! when the item is activated.
//!
//! ```text
//! Menu "Commands"
//! ├── [0] Change Target     → Command::CycleTarget
//! ├── [1] Download Update   → Command::CheckUpdate
//! └── ...                    ▲
//!                            └── cursor wraps both ways
//! ```

use std::path::PathBuf;

/// Label of the placeholder item that replaces an empty catalog.
pub const NO_CONTENT_LABEL: &str = "NO GAMES FOUND";

/// What happens when a menu item is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Placeholder for an empty catalog. Tells the user, dispatches nothing.
    NoContent,
    /// Send the payload at this path to the selected target.
    Transfer(PathBuf),
    CycleTarget,
    CheckUpdate,
    RefreshCatalog,
    Shutdown,
    Restart,
    Ping,
    EnableDhcp,
    EnableStatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub name: String,
    pub command: Command,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, command: Command) -> Self {
        Self {
            name: name.into(),
            command,
        }
    }

    /// The sentinel item used when a catalog scan finds nothing.
    pub fn no_content() -> Self {
        Self::new(NO_CONTENT_LABEL, Command::NoContent)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Menu {
    title: String,
    items: Vec<MenuItem>,
    cursor: usize,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Self {
            title: title.into(),
            items,
            cursor: 0,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item. Only used while building the command menu at startup.
    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    /// Item under the cursor, or `None` for an empty menu.
    pub fn current(&self) -> Option<&MenuItem> {
        self.items.get(self.cursor)
    }

    /// Move forward one item, wrapping past the end back to 0.
    pub fn advance(&mut self) -> Option<&MenuItem> {
        self.step(1)
    }

    /// Move back one item, wrapping from 0 to the last item.
    pub fn retreat(&mut self) -> Option<&MenuItem> {
        self.step(-1)
    }

    fn step(&mut self, delta: isize) -> Option<&MenuItem> {
        if self.items.is_empty() {
            return None;
        }
        let len = self.items.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
        self.current()
    }
}
