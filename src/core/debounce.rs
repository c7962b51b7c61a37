//! # Button Debouncing
//!
//! The keypad reports levels ("is this button down right now"), and a human
//! press stays down for many poll cycles. The `Debouncer` turns those levels
//! into press edges: one event per physical press, none on release.
//!
//! ```text
//! poll:     1  2  3  4  5  6
//! level:    _  ▔  ▔  ▔  _  ▔
//! edge:        ●           ●
//! ```

use std::collections::HashSet;
use std::fmt;

/// Front-panel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Select,
    Left,
    Right,
    Up,
    Down,
}

impl Button {
    /// Every button, in the order a poll cycle checks them.
    pub const ALL: [Button; 5] = [
        Button::Select,
        Button::Left,
        Button::Right,
        Button::Up,
        Button::Down,
    ];
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Button::Select => "select",
            Button::Left => "left",
            Button::Right => "right",
            Button::Up => "up",
            Button::Down => "down",
        };
        f.write_str(name)
    }
}

/// Level-to-edge converter. Purely edge-triggered: no hold-time threshold.
#[derive(Debug, Default)]
pub struct Debouncer {
    held: HashSet<Button>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one poll cycle. `is_pressed` is asked once per button; the
    /// returned edges keep `Button::ALL` order.
    pub fn poll<F>(&mut self, mut is_pressed: F) -> Vec<Button>
    where
        F: FnMut(Button) -> bool,
    {
        let mut edges = Vec::new();
        for button in Button::ALL {
            if is_pressed(button) {
                if self.held.insert(button) {
                    edges.push(button);
                }
            } else {
                self.held.remove(&button);
            }
        }
        edges
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    pub fn held_count(&self) -> usize {
        self.held.len()
    }
}
