use std::collections::HashSet;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::debounce::Button;

/// Terminal input relevant to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Button(Button),
    /// Ctrl+C. Raw mode swallows SIGINT, so it is re-raised by hand.
    Interrupt,
    /// Terminal resized; the display needs a redraw.
    Redraw,
}

/// Map a terminal event to panel input
pub fn map_event(event: &Event) -> Option<(KeyInput, KeyEventKind)> {
    match event {
        Event::Key(key_event) => {
            log::debug!("Key event: {:?} ({:?})", key_event.code, key_event.kind);
            map_key(key_event).map(|input| (input, key_event.kind))
        }
        Event::Resize(_, _) => Some((KeyInput::Redraw, KeyEventKind::Press)),
        _ => None,
    }
}

fn map_key(key_event: &KeyEvent) -> Option<KeyInput> {
    match (key_event.modifiers, key_event.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(KeyInput::Interrupt),
        (_, KeyCode::Enter) | (_, KeyCode::Char(' ')) => Some(KeyInput::Button(Button::Select)),
        (_, KeyCode::Left) => Some(KeyInput::Button(Button::Left)),
        (_, KeyCode::Right) => Some(KeyInput::Button(Button::Right)),
        (_, KeyCode::Up) => Some(KeyInput::Button(Button::Up)),
        (_, KeyCode::Down) => Some(KeyInput::Button(Button::Down)),
        _ => None,
    }
}

/// Drain every event that is already queued, without blocking
pub fn drain_pending() -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        match event::poll(Duration::ZERO) {
            Ok(true) => match event::read() {
                Ok(event) => events.push(event),
                Err(e) => {
                    log::warn!("Failed to read terminal event: {}", e);
                    break;
                }
            },
            Ok(false) => break,
            Err(e) => {
                log::warn!("Failed to poll terminal events: {}", e);
                break;
            }
        }
    }
    events
}

/// Turns key events into button levels.
///
/// Terminals that report key releases give true levels. Others only send
/// presses, so a press counts as "down" for exactly one query. Either way a
/// press stays latched until queried once, so a tap released within one
/// drain is not lost.
#[derive(Debug, Default)]
pub struct KeyState {
    held: HashSet<Button>,
    latched: HashSet<Button>,
    reports_release: bool,
}

impl KeyState {
    pub fn apply(&mut self, button: Button, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                self.latched.insert(button);
                if self.reports_release {
                    self.held.insert(button);
                }
            }
            KeyEventKind::Release => {
                self.reports_release = true;
                self.held.remove(&button);
            }
        }
    }

    pub fn is_down(&mut self, button: Button) -> bool {
        let latched = self.latched.remove(&button);
        self.held.contains(&button) || latched
    }
}
