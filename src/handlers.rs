//! # Action Handlers
//!
//! What each `Command` does when activated. Handlers run synchronously on the
//! control loop and talk to the outside world only through `Devices`.
//! Failures end up on the display and in the log; nothing is returned to the
//! loop except whether it should keep running.

use std::path::Path;
use std::time::Duration;

use log::{error, info, warn};

use crate::core::catalog::{Inventory, available_count, build_catalog};
use crate::core::config::ResolvedConfig;
use crate::core::menu::{Command, Menu, MenuItem};
use crate::core::state::Engine;
use crate::panel::{self, Panel};
use crate::system::{MountMode, PowerAction, SystemControl, SystemError};
use crate::transfer::{TransferClient, TransferError};

pub const COMMAND_TITLE: &str = "Commands";

const SECURITY_KEY: [u8; 8] = [0; 8];

// Blink positions: just past the status text on row 0.
const UPDATE_BLINK: (u16, u16) = (14, 0);
const DHCP_BLINK: (u16, u16) = (15, 0);
const SEND_BLINK: (u16, u16) = (10, 0);

const SHORT: Duration = Duration::from_secs(1);
const MEDIUM: Duration = Duration::from_secs(2);
const LONG: Duration = Duration::from_secs(5);

/// The capabilities handlers may touch.
pub struct Devices<'a> {
    pub panel: &'a mut dyn Panel,
    pub transfer: &'a mut dyn TransferClient,
    pub system: &'a mut dyn SystemControl,
    pub inventory: &'a dyn Inventory,
}

/// Whether the control loop keeps going after a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkMode {
    Dhcp,
    Static,
}

pub fn invoke(
    command: &Command,
    engine: &mut Engine,
    devices: &mut Devices<'_>,
    config: &ResolvedConfig,
) -> Outcome {
    info!("Invoking {:?}", command);
    match command {
        Command::NoContent => panel::show_for(devices.panel, "You need games!", LONG),
        Command::Transfer(path) => dispatch_transfer(path, engine, devices, config),
        Command::CycleTarget => cycle_target(engine, devices),
        Command::CheckUpdate => check_update(devices, config),
        Command::RefreshCatalog => {
            let menu = scan_catalog(devices.panel, devices.inventory, &config.rom_dir);
            engine.replace_content(menu);
        }
        Command::Shutdown => return power(PowerAction::PowerOff, devices),
        Command::Restart => return power(PowerAction::Reboot, devices),
        Command::Ping => ping(engine, devices),
        Command::EnableDhcp => enable_network(NetworkMode::Dhcp, devices, config),
        Command::EnableStatic => enable_network(NetworkMode::Static, devices, config),
    }
    Outcome::Continue
}

/// Build the content menu from the inventory, reporting progress on the
/// display.
pub fn scan_catalog(panel: &mut dyn Panel, inventory: &dyn Inventory, rom_dir: &Path) -> Menu {
    panel::show(panel, "Scanning...");
    let entries = inventory.entries();
    let menu = build_catalog(&entries, rom_dir, |path| path.is_file());
    let found = available_count(&menu);
    panel::render(panel, &format!("\n{found} Games"), SHORT, false);
    menu
}

/// The fixed command list, plus the network modes whose profile exists.
pub fn build_command_menu<F>(config: &ResolvedConfig, exists: F) -> Menu
where
    F: Fn(&Path) -> bool,
{
    let mut menu = Menu::new(
        COMMAND_TITLE,
        vec![
            MenuItem::new("Change Target", Command::CycleTarget),
            MenuItem::new("Download Update", Command::CheckUpdate),
            MenuItem::new("Refresh Games\nList", Command::RefreshCatalog),
            MenuItem::new("Shutdown", Command::Shutdown),
            MenuItem::new("Restart", Command::Restart),
            MenuItem::new("Ping Netdimm", Command::Ping),
        ],
    );
    if exists(&config.dhcp_profile) {
        menu.push(MenuItem::new("Enable DHCP", Command::EnableDhcp));
    }
    if exists(&config.static_profile) {
        menu.push(MenuItem::new("Enable Static", Command::EnableStatic));
    }
    menu
}

fn cycle_target(engine: &mut Engine, devices: &mut Devices<'_>) {
    match engine.cycle_target() {
        Some(address) => {
            info!("Target is now {}", address);
            panel::show_for(devices.panel, address, SHORT);
        }
        None => {
            warn!("No targets configured");
            panel::show_for(devices.panel, "No Targets", SHORT);
        }
    }
}

fn dispatch_transfer(
    path: &Path,
    engine: &Engine,
    devices: &mut Devices<'_>,
    config: &ResolvedConfig,
) {
    panel::show(devices.panel, "Connecting...");

    let Some(target) = engine.current_target() else {
        warn!("No target to send {} to", path.display());
        panel::show_for(devices.panel, "Error:\nConnect Failed", SHORT);
        return;
    };
    if let Err(e) = devices.transfer.connect(target, config.port) {
        warn!("Connecting to {}:{} failed: {}", target, config.port, e);
        panel::show_for(devices.panel, "Error:\nConnect Failed", SHORT);
        return;
    }

    panel::show(devices.panel, "Sending...");
    panel::toggle_busy(devices.panel, Some(SEND_BLINK));
    let result = send_payload(devices.transfer, path, config.time_limit_ms);
    devices.transfer.disconnect();
    panel::toggle_busy(devices.panel, None);

    match result {
        Ok(()) => {
            info!("Sent {} to {} via {}", path.display(), target, devices.transfer.name());
            panel::show_for(devices.panel, "Transfer\nComplete!", LONG);
        }
        Err(e) => {
            error!("Transfer of {} to {} failed: {}", path.display(), target, e);
            panel::show_for(devices.panel, "Error:\nTransfer Failed", SHORT);
        }
    }
}

/// The load sequence on an open session. Stops at the first failure.
fn send_payload(
    transfer: &mut dyn TransferClient,
    path: &Path,
    time_limit_ms: u32,
) -> Result<(), TransferError> {
    transfer.set_host_mode(0, 1)?;
    transfer.set_security_key(&SECURITY_KEY)?;
    transfer.upload_file(path)?;
    transfer.restart_host()?;
    transfer.set_time_limit(time_limit_ms)?;
    Ok(())
}

fn check_update(devices: &mut Devices<'_>, config: &ResolvedConfig) {
    panel::show(devices.panel, "Downloading...");
    panel::toggle_busy(devices.panel, Some(UPDATE_BLINK));
    let result = with_writable_root(devices.system, config, |system| {
        system.pull_update(&config.update_dir)
    });
    panel::toggle_busy(devices.panel, None);

    let message = match result {
        Ok(output) => {
            info!("Update pull: {}", output.trim());
            summarize_update(&output, config.cols, config.rows)
        }
        Err(e) => {
            warn!("Update failed: {}", e);
            "Update Error:\nCheck Internet".to_string()
        }
    };
    panel::show_for(devices.panel, &message, MEDIUM);
}

/// Reduce update output to what fits on the display.
fn summarize_update(output: &str, cols: u16, rows: u16) -> String {
    let output = output.trim();
    if output.is_empty() || output == "Already up-to-date." || output == "Already up to date." {
        return "No Update Found".to_string();
    }
    textwrap::wrap(output, usize::from(cols.max(1)))
        .into_iter()
        .take(usize::from(rows))
        .collect::<Vec<_>>()
        .join("\n")
}

fn enable_network(mode: NetworkMode, devices: &mut Devices<'_>, config: &ResolvedConfig) {
    let (profile, label) = match mode {
        NetworkMode::Dhcp => (&config.dhcp_profile, "DHCP"),
        NetworkMode::Static => (&config.static_profile, "Static"),
    };

    let installed = with_writable_root(devices.system, config, |system| {
        system.install_network_profile(profile, &config.active_profile)
    });
    if let Err(e) = installed {
        warn!("Installing {} profile failed: {}", label, e);
    }

    // DHCP can take a while to lease an address.
    let busy = mode == NetworkMode::Dhcp;
    if busy {
        panel::show(devices.panel, "Obtaining IP...");
        panel::toggle_busy(devices.panel, Some(DHCP_BLINK));
    }
    if let Err(e) = devices.system.restart_interface(&config.interface) {
        warn!("Restarting {} failed: {}", config.interface, e);
    }
    let address = devices.system.local_address().unwrap_or_else(|e| {
        warn!("Resolving local address failed: {}", e);
        "No Address".to_string()
    });
    if busy {
        panel::toggle_busy(devices.panel, None);
    }

    info!("{} enabled, address {}", label, address);
    panel::show_for(devices.panel, &format!("Enabled {label}:\n{address}"), MEDIUM);
}

fn power(action: PowerAction, devices: &mut Devices<'_>) -> Outcome {
    let text = match action {
        PowerAction::PowerOff => "Shutting\nDown",
        PowerAction::Reboot => "Restarting",
    };
    panel::show_for(devices.panel, text, LONG);
    match devices.system.power(action) {
        Ok(()) => info!("Issued {:?}", action),
        Err(e) => error!("{:?} failed: {}", action, e),
    }
    Outcome::Exit
}

fn ping(engine: &Engine, devices: &mut Devices<'_>) {
    let Some(target) = engine.current_target() else {
        warn!("No target to ping");
        panel::show_for(devices.panel, "No Targets", SHORT);
        return;
    };
    panel::show(devices.panel, &format!("Pinging\n{target}"));
    let text = if devices.system.ping(target) {
        "Netdimm is\nreachable!"
    } else {
        "Netdimm is\nunreachable!"
    };
    info!("Ping {}: {}", target, text.replace('\n', " "));
    panel::show_for(devices.panel, text, SHORT);
}

/// Run `action` with the root filesystem writable, if so configured.
/// Remount failures are logged; the action still runs.
fn with_writable_root<T, F>(
    system: &mut dyn SystemControl,
    config: &ResolvedConfig,
    action: F,
) -> Result<T, SystemError>
where
    F: FnOnce(&mut dyn SystemControl) -> Result<T, SystemError>,
{
    if config.remount_root
        && let Err(e) = system.remount_root(MountMode::ReadWrite)
    {
        warn!("Remounting / read-write failed: {}", e);
    }
    let result = action(system);
    if config.remount_root
        && let Err(e) = system.remount_root(MountMode::ReadOnly)
    {
        warn!("Remounting / read-only failed: {}", e);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::InventoryEntry;
    use crate::core::menu::NO_CONTENT_LABEL;
    use crate::core::state::MenuKind;
    use crate::test_support::{
        FakePanel, FakeSystem, FakeTransfer, PanelCall, TransferCall, test_config,
    };
    use std::path::PathBuf;

    fn engine(targets: &[&str]) -> Engine {
        let config = test_config();
        Engine::new(
            Menu::new("Games List", vec![MenuItem::no_content()]),
            build_command_menu(&config, |_| false),
            targets.iter().map(|t| t.to_string()).collect(),
        )
    }

    struct Rig {
        panel: FakePanel,
        transfer: FakeTransfer,
        system: FakeSystem,
        inventory: Vec<InventoryEntry>,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                panel: FakePanel::new(),
                transfer: FakeTransfer::new(),
                system: FakeSystem::new(),
                inventory: Vec::new(),
            }
        }

        fn run(&mut self, command: Command, engine: &mut Engine, config: &ResolvedConfig) -> Outcome {
            let mut devices = Devices {
                panel: &mut self.panel,
                transfer: &mut self.transfer,
                system: &mut self.system,
                inventory: &self.inventory,
            };
            invoke(&command, engine, &mut devices, config)
        }
    }

    #[test]
    fn test_transfer_connect_failure_aborts() {
        let mut rig = Rig::new();
        rig.transfer = FakeTransfer::refusing();
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        let outcome = rig.run(Command::Transfer(PathBuf::from("/roms/a.bin")), &mut engine, &config);

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(
            rig.transfer.calls,
            vec![TransferCall::Connect("10.0.0.2".to_string(), 10703)]
        );
        assert_eq!(rig.panel.messages(), vec!["Connecting...", "Error:\nConnect Failed"]);
        assert_eq!(rig.panel.calls.last(), Some(&PanelCall::Hold(SHORT)));
    }

    #[test]
    fn test_transfer_sends_full_sequence() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2", "10.0.0.3"]);
        engine.cycle_target();
        let config = test_config();
        let path = PathBuf::from("/roms/a.bin");

        rig.run(Command::Transfer(path.clone()), &mut engine, &config);

        assert_eq!(
            rig.transfer.calls,
            vec![
                TransferCall::Connect("10.0.0.3".to_string(), 10703),
                TransferCall::SetHostMode(0, 1),
                TransferCall::SetSecurityKey(vec![0; 8]),
                TransferCall::UploadFile(path),
                TransferCall::RestartHost,
                TransferCall::SetTimeLimit(600_000),
                TransferCall::Disconnect,
            ]
        );
        assert_eq!(
            rig.panel.messages(),
            vec!["Connecting...", "Sending...", "Transfer\nComplete!"]
        );
        assert!(rig.panel.calls.contains(&PanelCall::SetCursor(10, 0)));
        assert_eq!(rig.panel.blink_toggles(), 2);
    }

    #[test]
    fn test_transfer_failure_after_connect_disconnects() {
        let mut rig = Rig::new();
        rig.transfer.fail_upload = true;
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::Transfer(PathBuf::from("/roms/a.bin")), &mut engine, &config);

        assert_eq!(rig.transfer.calls.last(), Some(&TransferCall::Disconnect));
        assert!(!rig.transfer.calls.contains(&TransferCall::RestartHost));
        assert_eq!(rig.panel.last_message(), Some("Error:\nTransfer Failed"));
        assert_eq!(rig.panel.blink_toggles(), 2);
    }

    #[test]
    fn test_cycle_target_twice_returns_home() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2", "10.0.0.3"]);
        let config = test_config();

        rig.run(Command::CycleTarget, &mut engine, &config);
        assert_eq!(engine.target_index, 1);
        rig.run(Command::CycleTarget, &mut engine, &config);
        assert_eq!(engine.target_index, 0);
        assert_eq!(rig.panel.messages(), vec!["10.0.0.3", "10.0.0.2"]);
    }

    #[test]
    fn test_no_content_shows_hint_only() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::NoContent, &mut engine, &config);

        assert_eq!(rig.panel.messages(), vec!["You need games!"]);
        assert_eq!(rig.panel.calls.last(), Some(&PanelCall::Hold(LONG)));
        assert!(rig.transfer.calls.is_empty());
    }

    #[test]
    fn test_update_already_current_collapses() {
        let mut rig = Rig::new();
        rig.system.update = Ok("Already up-to-date.\n".to_string());
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::CheckUpdate, &mut engine, &config);

        assert_eq!(rig.panel.messages(), vec!["Downloading...", "No Update Found"]);
        assert!(rig.panel.calls.contains(&PanelCall::SetCursor(14, 0)));
        assert_eq!(rig.panel.blink_toggles(), 2);
    }

    #[test]
    fn test_update_failure_message() {
        let mut rig = Rig::new();
        rig.system.update = Err("could not resolve host".to_string());
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::CheckUpdate, &mut engine, &config);

        assert_eq!(rig.panel.last_message(), Some("Update Error:\nCheck Internet"));
    }

    #[test]
    fn test_update_remounts_around_pull() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2"]);
        let config = ResolvedConfig {
            remount_root: true,
            ..test_config()
        };

        rig.run(Command::CheckUpdate, &mut engine, &config);

        assert_eq!(rig.system.calls, vec!["remount rw", "pull .", "remount ro"]);
    }

    #[test]
    fn test_summarize_update_wraps_to_display() {
        let text = summarize_update("Updating files from origin\nFast-forward\n", 16, 2);
        assert_eq!(text, "Updating files\nfrom origin");
        for line in text.lines() {
            assert!(line.chars().count() <= 16);
        }
    }

    #[test]
    fn test_enable_dhcp_shows_address() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::EnableDhcp, &mut engine, &config);

        assert_eq!(
            rig.system.calls,
            vec![
                "install netctl/ethernet-dhcp /etc/netctl/eth0",
                "restart eth0",
                "address",
            ]
        );
        assert_eq!(
            rig.panel.messages(),
            vec!["Obtaining IP...", "Enabled DHCP:\n10.0.0.1"]
        );
        assert!(rig.panel.calls.contains(&PanelCall::SetCursor(15, 0)));
    }

    #[test]
    fn test_enable_static_survives_address_failure() {
        let mut rig = Rig::new();
        rig.system.address = None;
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        let outcome = rig.run(Command::EnableStatic, &mut engine, &config);

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(rig.panel.messages(), vec!["Enabled Static:\nNo Address"]);
        assert_eq!(rig.panel.blink_toggles(), 0);
    }

    #[test]
    fn test_power_actions_exit() {
        let mut rig = Rig::new();
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        assert_eq!(rig.run(Command::Shutdown, &mut engine, &config), Outcome::Exit);
        assert_eq!(rig.run(Command::Restart, &mut engine, &config), Outcome::Exit);
        assert_eq!(rig.system.calls, vec!["power PowerOff", "power Reboot"]);
        assert_eq!(rig.panel.messages(), vec!["Shutting\nDown", "Restarting"]);
    }

    #[test]
    fn test_ping_reports_reachability() {
        let mut rig = Rig::new();
        rig.system.reachable = false;
        let mut engine = engine(&["10.0.0.2"]);
        let config = test_config();

        rig.run(Command::Ping, &mut engine, &config);

        assert_eq!(
            rig.panel.messages(),
            vec!["Pinging\n10.0.0.2", "Netdimm is\nunreachable!"]
        );
    }

    #[test]
    fn test_refresh_replaces_content_menu() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.bin"), b"").unwrap();
        let mut rig = Rig::new();
        rig.inventory = vec![
            InventoryEntry::new("Game A", "a.bin"),
            InventoryEntry::new("Game B", "b.bin"),
        ];
        let mut engine = engine(&["10.0.0.2"]);
        let config = ResolvedConfig {
            rom_dir: dir.path().to_path_buf(),
            ..test_config()
        };
        assert_eq!(engine.content.items()[0].name, NO_CONTENT_LABEL);

        rig.run(Command::RefreshCatalog, &mut engine, &config);

        assert_eq!(engine.content.len(), 1);
        assert_eq!(engine.content.items()[0].name, "Game B");
        assert_eq!(engine.active, MenuKind::Content);
        assert_eq!(rig.panel.messages(), vec!["Scanning...", "\n1 Games"]);
        // The count is appended, not drawn on a fresh screen.
        assert_eq!(rig.panel.calls.iter().filter(|c| **c == PanelCall::Clear).count(), 1);
    }

    #[test]
    fn test_command_menu_network_items_depend_on_profiles() {
        let config = test_config();
        let bare = build_command_menu(&config, |_| false);
        assert_eq!(bare.len(), 6);
        assert_eq!(bare.title(), COMMAND_TITLE);

        let full = build_command_menu(&config, |_| true);
        let names: Vec<&str> = full.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(&names[6..], &["Enable DHCP", "Enable Static"]);

        let static_only = build_command_menu(&config, |p| p == config.static_profile.as_path());
        assert_eq!(static_only.items().last().map(|i| i.command.clone()), Some(Command::EnableStatic));
        assert_eq!(static_only.len(), 7);
    }
}
