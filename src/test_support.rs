//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::ResolvedConfig;
use crate::core::debounce::Button;
use crate::panel::{Panel, PanelError, ReleaseHook};
use crate::system::{MountMode, PowerAction, SystemControl, SystemError};
use crate::transfer::{TransferClient, TransferError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCall {
    Clear,
    Message(String),
    SetCursor(u16, u16),
    ToggleBlink,
    Hold(Duration),
}

/// Records every display call. Button levels are scripted per button and
/// consumed one per `is_pressed` query; an exhausted script reads released.
/// `fail_initialize` makes bring-up fail as a missing display would.
#[derive(Default)]
pub struct FakePanel {
    pub calls: Vec<PanelCall>,
    pub levels: HashMap<Button, VecDeque<bool>>,
    pub initialized: Option<(u16, u16)>,
    pub torn_down: bool,
    pub fail_initialize: bool,
}

impl FakePanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next levels `button` reports, one per poll.
    pub fn script(&mut self, button: Button, levels: &[bool]) {
        self.levels
            .entry(button)
            .or_default()
            .extend(levels.iter().copied());
    }

    /// Text written to the display, in order.
    pub fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PanelCall::Message(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages().last().copied()
    }

    pub fn blink_toggles(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| **call == PanelCall::ToggleBlink)
            .count()
    }
}

impl Panel for FakePanel {
    fn initialize(&mut self, cols: u16, rows: u16) -> Result<(), PanelError> {
        if self.fail_initialize {
            return Err(PanelError::Io(std::io::Error::other("no display")));
        }
        self.initialized = Some((cols, rows));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), PanelError> {
        self.calls.push(PanelCall::Clear);
        Ok(())
    }

    fn message(&mut self, text: &str) -> Result<(), PanelError> {
        self.calls.push(PanelCall::Message(text.to_string()));
        Ok(())
    }

    fn set_cursor(&mut self, col: u16, row: u16) -> Result<(), PanelError> {
        self.calls.push(PanelCall::SetCursor(col, row));
        Ok(())
    }

    fn toggle_blink(&mut self) -> Result<(), PanelError> {
        self.calls.push(PanelCall::ToggleBlink);
        Ok(())
    }

    fn is_pressed(&mut self, button: Button) -> bool {
        self.levels
            .get_mut(&button)
            .and_then(VecDeque::pop_front)
            .unwrap_or(false)
    }

    fn hold(&mut self, duration: Duration) {
        self.calls.push(PanelCall::Hold(duration));
    }

    fn teardown(&mut self) -> Result<(), PanelError> {
        self.torn_down = true;
        Ok(())
    }

    fn release_hook(&self) -> ReleaseHook {
        Box::new(|| {})
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferCall {
    Connect(String, u16),
    Disconnect,
    SetHostMode(u8, u8),
    SetSecurityKey(Vec<u8>),
    UploadFile(PathBuf),
    RestartHost,
    SetTimeLimit(u32),
}

/// Records the protocol sequence. `fail_connect` refuses every session;
/// `fail_upload` breaks the session mid-transfer.
#[derive(Default)]
pub struct FakeTransfer {
    pub calls: Vec<TransferCall>,
    pub fail_connect: bool,
    pub fail_upload: bool,
}

impl FakeTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refusing() -> Self {
        Self {
            fail_connect: true,
            ..Self::default()
        }
    }
}

impl TransferClient for FakeTransfer {
    fn name(&self) -> &str {
        "fake"
    }

    fn connect(&mut self, address: &str, port: u16) -> Result<(), TransferError> {
        self.calls.push(TransferCall::Connect(address.to_string(), port));
        if self.fail_connect {
            return Err(TransferError::Connect("refused".to_string()));
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.calls.push(TransferCall::Disconnect);
    }

    fn set_host_mode(&mut self, mode: u8, flag: u8) -> Result<(), TransferError> {
        self.calls.push(TransferCall::SetHostMode(mode, flag));
        Ok(())
    }

    fn set_security_key(&mut self, key: &[u8]) -> Result<(), TransferError> {
        self.calls.push(TransferCall::SetSecurityKey(key.to_vec()));
        Ok(())
    }

    fn upload_file(&mut self, path: &Path) -> Result<(), TransferError> {
        self.calls.push(TransferCall::UploadFile(path.to_path_buf()));
        if self.fail_upload {
            return Err(TransferError::Protocol("upload rejected".to_string()));
        }
        Ok(())
    }

    fn restart_host(&mut self) -> Result<(), TransferError> {
        self.calls.push(TransferCall::RestartHost);
        Ok(())
    }

    fn set_time_limit(&mut self, millis: u32) -> Result<(), TransferError> {
        self.calls.push(TransferCall::SetTimeLimit(millis));
        Ok(())
    }
}

/// Records OS actions as short strings and answers from canned values.
pub struct FakeSystem {
    pub calls: Vec<String>,
    pub address: Option<String>,
    pub update: Result<String, String>,
    pub reachable: bool,
}

impl FakeSystem {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            address: Some("10.0.0.1".to_string()),
            update: Ok("Already up to date.\n".to_string()),
            reachable: true,
        }
    }
}

impl SystemControl for FakeSystem {
    fn remount_root(&mut self, mode: MountMode) -> Result<(), SystemError> {
        self.calls.push(format!("remount {mode}"));
        Ok(())
    }

    fn install_network_profile(
        &mut self,
        profile: &Path,
        active: &Path,
    ) -> Result<(), SystemError> {
        self.calls
            .push(format!("install {} {}", profile.display(), active.display()));
        Ok(())
    }

    fn restart_interface(&mut self, interface: &str) -> Result<(), SystemError> {
        self.calls.push(format!("restart {interface}"));
        Ok(())
    }

    fn local_address(&mut self) -> Result<String, SystemError> {
        self.calls.push("address".to_string());
        self.address
            .clone()
            .ok_or_else(|| SystemError::NoAddress("test-host".to_string()))
    }

    fn pull_update(&mut self, dir: &Path) -> Result<String, SystemError> {
        self.calls.push(format!("pull {}", dir.display()));
        self.update.clone().map_err(|detail| SystemError::CommandFailed {
            command: "git pull".to_string(),
            detail,
        })
    }

    fn power(&mut self, action: PowerAction) -> Result<(), SystemError> {
        self.calls.push(format!("power {action:?}"));
        Ok(())
    }

    fn ping(&mut self, address: &str) -> bool {
        self.calls.push(format!("ping {address}"));
        self.reachable
    }
}

/// Defaults with a single-digit poll interval and no root remounting.
pub fn test_config() -> ResolvedConfig {
    ResolvedConfig {
        remount_root: false,
        poll_interval: Duration::from_millis(1),
        ..ResolvedConfig::default()
    }
}
