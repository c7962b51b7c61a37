//! # Terminal Panel
//!
//! Draws the character display inside a terminal and reads the keypad from
//! the keyboard, so the whole panel runs on a workstation or over SSH.
//!
//! Key release reporting is requested through the keyboard enhancement
//! protocol. Terminals that ignore it still work: see `KeyState`.

use std::io::stdout;

use crossterm::event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use crossterm::execute;
use log::{info, warn};
use ratatui::DefaultTerminal;

use super::event::{KeyInput, KeyState, drain_pending, map_event};
use super::lcd::LcdBuffer;
use super::{Panel, PanelError, ReleaseHook, ui};
use crate::core::config::{DEFAULT_COLS, DEFAULT_ROWS};
use crate::core::debounce::Button;
use crate::system::service;

pub struct TerminalPanel {
    terminal: Option<DefaultTerminal>,
    lcd: LcdBuffer,
    keys: KeyState,
}

impl TerminalPanel {
    pub fn new() -> Self {
        Self {
            terminal: None,
            lcd: LcdBuffer::new(DEFAULT_COLS, DEFAULT_ROWS),
            keys: KeyState::default(),
        }
    }

    fn draw(&mut self) -> Result<(), PanelError> {
        let lcd = &self.lcd;
        let terminal = self.terminal.as_mut().ok_or(PanelError::NotInitialized)?;
        terminal.draw(|frame| ui::draw_lcd(frame, lcd))?;
        Ok(())
    }

    fn pump(&mut self) {
        let mut redraw = false;
        for event in drain_pending() {
            match map_event(&event) {
                Some((KeyInput::Button(button), kind)) => self.keys.apply(button, kind),
                Some((KeyInput::Interrupt, _)) => service::interrupt(),
                Some((KeyInput::Redraw, _)) => redraw = true,
                None => {}
            }
        }
        if redraw && let Err(e) = self.draw() {
            warn!("Redraw after resize failed: {}", e);
        }
    }
}

impl Default for TerminalPanel {
    fn default() -> Self {
        Self::new()
    }
}

fn restore_terminal() {
    let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
    ratatui::restore();
}

impl Panel for TerminalPanel {
    fn initialize(&mut self, cols: u16, rows: u16) -> Result<(), PanelError> {
        self.terminal = Some(ratatui::init());
        // Harmlessly ignored by terminals without the protocol
        if let Err(e) = execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        ) {
            warn!("Keyboard enhancement unavailable: {}", e);
        }
        self.lcd = LcdBuffer::new(cols, rows);
        info!("Terminal panel initialized ({}x{})", cols, rows);
        self.draw()
    }

    fn clear(&mut self) -> Result<(), PanelError> {
        self.lcd.clear();
        self.draw()
    }

    fn message(&mut self, text: &str) -> Result<(), PanelError> {
        self.lcd.write(text);
        self.draw()
    }

    fn set_cursor(&mut self, col: u16, row: u16) -> Result<(), PanelError> {
        self.lcd.set_cursor(col, row);
        self.draw()
    }

    fn toggle_blink(&mut self) -> Result<(), PanelError> {
        self.lcd.toggle_blink();
        self.draw()
    }

    fn is_pressed(&mut self, button: Button) -> bool {
        self.pump();
        self.keys.is_down(button)
    }

    fn teardown(&mut self) -> Result<(), PanelError> {
        if self.terminal.take().is_some() {
            restore_terminal();
            info!("Terminal panel released");
        }
        Ok(())
    }

    fn release_hook(&self) -> ReleaseHook {
        Box::new(restore_terminal)
    }
}
