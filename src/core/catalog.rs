//! # Content Catalog
//!
//! Turns an inventory (display name → file identifier) into the content
//! menu, keeping only entries whose file exists under the ROM directory.
//!
//! The inventory file is a flat JSON object, read in file order:
//!
//! ```json
//! { "Virtua Striker 2": "vs2.bin", "F-Zero AX": "fzeroax.bin" }
//! ```

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, info, warn};
use serde_json::Value;

use crate::core::menu::{Command, Menu, MenuItem};

pub const CONTENT_TITLE: &str = "Games List";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub name: String,
    pub file: String,
}

impl InventoryEntry {
    pub fn new(name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

/// Source of known payloads. Implementations must not fail: an unreadable
/// source is an empty one.
pub trait Inventory {
    fn entries(&self) -> Vec<InventoryEntry>;
}

impl Inventory for Vec<InventoryEntry> {
    fn entries(&self) -> Vec<InventoryEntry> {
        self.clone()
    }
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    /// The top-level JSON value was not an object.
    NotAnObject,
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "catalog I/O error: {e}"),
            CatalogError::Parse(e) => write!(f, "catalog parse error: {e}"),
            CatalogError::NotAnObject => write!(f, "catalog must be a JSON object"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Inventory backed by a JSON file on disk. Re-read on every scan so a
/// refresh picks up edits.
pub struct JsonInventory {
    path: PathBuf,
}

impl JsonInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse inventory JSON. Entries whose value is not a string are skipped.
    pub fn parse(text: &str) -> Result<Vec<InventoryEntry>, CatalogError> {
        let value: Value = serde_json::from_str(text).map_err(CatalogError::Parse)?;
        let Value::Object(map) = value else {
            return Err(CatalogError::NotAnObject);
        };

        let mut entries = Vec::with_capacity(map.len());
        for (name, file) in map {
            match file {
                Value::String(file) => entries.push(InventoryEntry { name, file }),
                other => warn!("Skipping catalog entry {:?}: expected a string, got {}", name, other),
            }
        }
        Ok(entries)
    }

    fn load(&self) -> Result<Vec<InventoryEntry>, CatalogError> {
        let text = fs::read_to_string(&self.path).map_err(CatalogError::Io)?;
        Self::parse(&text)
    }
}

impl Inventory for JsonInventory {
    fn entries(&self) -> Vec<InventoryEntry> {
        match self.load() {
            Ok(entries) => {
                debug!("Loaded {} catalog entries from {}", entries.len(), self.path.display());
                entries
            }
            Err(e) => {
                warn!("Failed to read catalog {}: {}", self.path.display(), e);
                Vec::new()
            }
        }
    }
}

/// Build the content menu from `entries`, keeping those for which
/// `exists(root/file)` holds. Sorted by name (byte order, stable). An empty
/// result becomes a single `NO GAMES FOUND` item.
pub fn build_catalog<F>(entries: &[InventoryEntry], root: &Path, exists: F) -> Menu
where
    F: Fn(&Path) -> bool,
{
    let mut items: Vec<MenuItem> = entries
        .iter()
        .filter_map(|entry| {
            let Some(path) = resolve_under(root, &entry.file) else {
                warn!(
                    "Skipping catalog entry {:?}: {:?} is not a path inside {}",
                    entry.name,
                    entry.file,
                    root.display()
                );
                return None;
            };
            if exists(&path) {
                Some(MenuItem::new(entry.name.clone(), Command::Transfer(path)))
            } else {
                debug!("Catalog entry {:?} missing at {}", entry.name, path.display());
                None
            }
        })
        .collect();

    items.sort_by(|a, b| a.name.cmp(&b.name));
    info!("Catalog scan found {} of {} entries", items.len(), entries.len());

    if items.is_empty() {
        items.push(MenuItem::no_content());
    }
    Menu::new(CONTENT_TITLE, items)
}

/// Join `file` onto `root`, refusing identifiers that would leave it
/// (absolute paths, `..`, drive prefixes) or name nothing.
fn resolve_under(root: &Path, file: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    let mut named = false;
    for component in Path::new(file).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                named = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    named.then_some(path)
}

/// Number of real (non-placeholder) entries in a content menu.
pub fn available_count(menu: &Menu) -> usize {
    menu.items()
        .iter()
        .filter(|item| item.command != Command::NoContent)
        .count()
}
