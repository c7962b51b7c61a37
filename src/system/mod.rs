//! # System Control
//!
//! OS-level side effects the command menu triggers, behind one trait so the
//! handlers can be exercised without touching the host.
//!
//! ```text
//! SystemControl
//! ├── remount_root(mode)                  // rw around writes to a ro root
//! ├── install_network_profile(from, to)
//! ├── restart_interface(iface)
//! ├── local_address()
//! ├── pull_update(dir)
//! ├── power(action)
//! └── ping(address)
//! ```
//!
//! `service` holds the process-lifecycle pieces (signals, readiness) that
//! are not menu actions.

pub mod service;
pub mod shell;

use std::fmt;
use std::path::Path;

pub use shell::ShellSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountMode {
    ReadWrite,
    ReadOnly,
}

impl fmt::Display for MountMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MountMode::ReadWrite => write!(f, "rw"),
            MountMode::ReadOnly => write!(f, "ro"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    PowerOff,
    Reboot,
}

#[derive(Debug)]
pub enum SystemError {
    Io(std::io::Error),
    /// An external command ran but reported failure.
    CommandFailed { command: String, detail: String },
    Os(nix::errno::Errno),
    /// The host name did not resolve to any address.
    NoAddress(String),
}

impl fmt::Display for SystemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SystemError::Io(e) => write!(f, "I/O error: {e}"),
            SystemError::CommandFailed { command, detail } => {
                write!(f, "`{command}` failed: {detail}")
            }
            SystemError::Os(e) => write!(f, "system call failed: {e}"),
            SystemError::NoAddress(host) => write!(f, "no address for {host}"),
        }
    }
}

impl std::error::Error for SystemError {}

impl From<std::io::Error> for SystemError {
    fn from(e: std::io::Error) -> Self {
        SystemError::Io(e)
    }
}

impl From<nix::errno::Errno> for SystemError {
    fn from(e: nix::errno::Errno) -> Self {
        SystemError::Os(e)
    }
}

pub trait SystemControl {
    fn remount_root(&mut self, mode: MountMode) -> Result<(), SystemError>;

    /// Copy a network profile into the interface's active slot.
    fn install_network_profile(&mut self, profile: &Path, active: &Path)
    -> Result<(), SystemError>;

    /// Take the interface down and bring it back up with the active profile.
    fn restart_interface(&mut self, interface: &str) -> Result<(), SystemError>;

    fn local_address(&mut self) -> Result<String, SystemError>;

    /// Pull the latest version of `dir`. Returns the tool's report.
    fn pull_update(&mut self, dir: &Path) -> Result<String, SystemError>;

    fn power(&mut self, action: PowerAction) -> Result<(), SystemError>;

    /// One reachability check. Any failure counts as unreachable.
    fn ping(&mut self, address: &str) -> bool;
}
