//! # Control Loop
//!
//! Glues the pure core to the devices. One poll cycle:
//!
//! ```text
//! panel levels ──> Debouncer ──> edges ──> update(engine) ──> Effect ──> perform
//!                                                              │
//!                                     show title / show item / run handler
//! ```
//!
//! The loop is a plain busy-poll with a fixed sleep. Handlers block it for
//! their whole duration, which is what keeps button presses from piling up
//! behind a running transfer.

use std::thread;
use std::time::Duration;

use log::{debug, info};

use crate::core::action::{Effect, Transition, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::Engine;
use crate::handlers::{self, Devices, Outcome, build_command_menu, scan_catalog};
use crate::panel::{self, PanelError};

const SPLASH_HOLD: Duration = Duration::from_secs(2);
const TITLE_HOLD: Duration = Duration::from_secs(1);

pub struct Runtime<'a> {
    engine: Engine,
    devices: Devices<'a>,
    config: &'a ResolvedConfig,
}

fn splash() -> String {
    format!(" NetDIMM Panel\n   Ver. {}", env!("CARGO_PKG_VERSION"))
}

impl<'a> Runtime<'a> {
    /// Bring the panel up, scan the catalog and land on the content menu.
    pub fn start(devices: Devices<'a>, config: &'a ResolvedConfig) -> Result<Self, PanelError> {
        let Devices {
            panel: display,
            transfer,
            system,
            inventory,
        } = devices;
        display.initialize(config.cols, config.rows)?;
        panel::show_for(display, &splash(), SPLASH_HOLD);

        let content = scan_catalog(display, inventory, &config.rom_dir);
        let commands = build_command_menu(config, |path| path.is_file());
        info!(
            "Starting with {} content items, {} commands, {} targets",
            content.len(),
            commands.len(),
            config.targets.len()
        );

        let mut runtime = Self {
            engine: Engine::new(content, commands, config.targets.clone()),
            devices: Devices {
                panel: display,
                transfer,
                system,
                inventory,
            },
            config,
        };
        let effect = update(&mut runtime.engine, Transition::SwitchToContent);
        runtime.perform(effect);
        Ok(runtime)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// One poll cycle. Edges are handled in button order; a power action
    /// stops the cycle immediately.
    pub fn tick(&mut self) -> Outcome {
        let display = &mut *self.devices.panel;
        let edges = self.engine.debouncer.poll(|button| display.is_pressed(button));
        for button in edges {
            debug!("{} pressed", button);
            let effect = update(&mut self.engine, Transition::from(button));
            if self.perform(effect) == Outcome::Exit {
                return Outcome::Exit;
            }
        }
        Outcome::Continue
    }

    /// Poll until a handler asks to stop.
    pub fn run(&mut self) {
        info!("Control loop running, polling every {:?}", self.config.poll_interval);
        while self.tick() == Outcome::Continue {
            thread::sleep(self.config.poll_interval);
        }
        info!("Control loop finished");
    }

    /// Drop any open session and hand the display back.
    pub fn shutdown(self) -> Result<(), PanelError> {
        self.devices.transfer.disconnect();
        self.devices.panel.teardown()
    }

    fn perform(&mut self, effect: Effect) -> Outcome {
        match effect {
            Effect::None => {}
            Effect::ShowMenu { title, item } => {
                panel::show_for(self.devices.panel, &title, TITLE_HOLD);
                if let Some(item) = item {
                    panel::show(self.devices.panel, &item);
                }
            }
            Effect::ShowItem(name) => panel::show(self.devices.panel, &name),
            Effect::Invoke(command) => {
                let outcome =
                    handlers::invoke(&command, &mut self.engine, &mut self.devices, self.config);
                if outcome == Outcome::Exit {
                    return outcome;
                }
                // The handler may have replaced the menu under the cursor.
                if let Some(item) = self.engine.selection() {
                    panel::show(self.devices.panel, &item.name);
                }
            }
        }
        Outcome::Continue
    }
}
