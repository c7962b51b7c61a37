//! # Transitions
//!
//! Every debounced button press becomes a `Transition`.
//! Left? That's `Transition::SwitchToContent`.
//! Select? That's `Transition::Activate`.
//!
//! The `update()` function applies a transition to the engine and returns the
//! `Effect` the runtime must carry out. No I/O here: rendering and running
//! handlers happen in the runtime.
//!
//! ```text
//! Engine + Transition  →  update()  →  Effect
//! ```

use log::debug;

use crate::core::debounce::Button;
use crate::core::menu::Command;
use crate::core::state::{Engine, MenuKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SwitchToContent,
    SwitchToCommand,
    CursorUp,
    CursorDown,
    Activate,
}

impl From<Button> for Transition {
    fn from(button: Button) -> Self {
        match button {
            Button::Select => Transition::Activate,
            Button::Left => Transition::SwitchToContent,
            Button::Right => Transition::SwitchToCommand,
            Button::Up => Transition::CursorUp,
            Button::Down => Transition::CursorDown,
        }
    }
}

/// Work the runtime performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do (transition on an empty menu).
    None,
    /// A menu became active: show its title, then its current item.
    ShowMenu { title: String, item: Option<String> },
    /// The cursor moved: show the item name.
    ShowItem(String),
    /// Run a handler, then re-show whatever the selection is afterwards.
    Invoke(Command),
}

pub fn update(engine: &mut Engine, transition: Transition) -> Effect {
    debug!("Transition {:?} on {:?} menu", transition, engine.active);
    match transition {
        Transition::SwitchToContent => switch_to(engine, MenuKind::Content),
        Transition::SwitchToCommand => switch_to(engine, MenuKind::Command),
        Transition::CursorUp => engine
            .active_menu_mut()
            .retreat()
            .map_or(Effect::None, |item| Effect::ShowItem(item.name.clone())),
        Transition::CursorDown => engine
            .active_menu_mut()
            .advance()
            .map_or(Effect::None, |item| Effect::ShowItem(item.name.clone())),
        Transition::Activate => engine
            .selection()
            .map_or(Effect::None, |item| Effect::Invoke(item.command.clone())),
    }
}

fn switch_to(engine: &mut Engine, kind: MenuKind) -> Effect {
    engine.active = kind;
    let menu = engine.active_menu();
    Effect::ShowMenu {
        title: menu.title().to_string(),
        item: menu.current().map(|item| item.name.clone()),
    }
}
