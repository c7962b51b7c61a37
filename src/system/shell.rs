//! `SystemControl` for a Linux host: `mount(2)` through nix, everything else
//! through the usual command-line tools.

use std::fs;
use std::net::{IpAddr, ToSocketAddrs};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use log::{debug, info, warn};
use nix::mount::{MsFlags, mount};

use super::{MountMode, PowerAction, SystemControl, SystemError};

pub struct ShellSystem {
    dry_run: bool,
}

impl ShellSystem {
    pub fn new(dry_run: bool) -> Self {
        if dry_run {
            info!("System control in dry-run mode: commands are logged, not run");
        }
        Self { dry_run }
    }

    /// Run a command to completion. In dry-run mode nothing runs and an
    /// empty success is reported.
    fn run(&self, program: &str, args: &[&str], dir: Option<&Path>) -> Result<String, SystemError> {
        let command = describe(program, args);
        if self.dry_run {
            info!("[dry-run] {}", command);
            return Ok(String::new());
        }
        debug!("Running {}", command);

        let mut cmd = Command::new(program);
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }
        let output = cmd.output()?;
        check(&command, output)
    }
}

fn describe(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

fn check(command: &str, output: Output) -> Result<String, SystemError> {
    if output.status.success() {
        return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = match stderr.trim() {
        "" => output.status.to_string(),
        msg => msg.to_string(),
    };
    Err(SystemError::CommandFailed {
        command: command.to_string(),
        detail,
    })
}

/// Pick the address to show: IPv4 over IPv6, anything over loopback.
fn preferred_address(addrs: impl IntoIterator<Item = IpAddr>) -> Option<IpAddr> {
    addrs
        .into_iter()
        .min_by_key(|ip| (ip.is_loopback(), !ip.is_ipv4()))
}

impl SystemControl for ShellSystem {
    fn remount_root(&mut self, mode: MountMode) -> Result<(), SystemError> {
        if self.dry_run {
            info!("[dry-run] remount / {}", mode);
            return Ok(());
        }
        let mut flags = MsFlags::MS_REMOUNT;
        if mode == MountMode::ReadOnly {
            flags |= MsFlags::MS_RDONLY;
        }
        mount(None::<&str>, "/", None::<&str>, flags, None::<&str>)?;
        debug!("Remounted / {}", mode);
        Ok(())
    }

    fn install_network_profile(
        &mut self,
        profile: &Path,
        active: &Path,
    ) -> Result<(), SystemError> {
        if self.dry_run {
            info!("[dry-run] cp {} {}", profile.display(), active.display());
            return Ok(());
        }
        fs::copy(profile, active)?;
        info!("Installed {} as {}", profile.display(), active.display());
        Ok(())
    }

    fn restart_interface(&mut self, interface: &str) -> Result<(), SystemError> {
        // A failed link-down is not fatal: netctl brings it up regardless.
        if let Err(e) = self.run("ip", &["link", "set", interface, "down"], None) {
            warn!("{}", e);
        }
        self.run("netctl", &["restart", interface], None)?;
        Ok(())
    }

    fn local_address(&mut self) -> Result<String, SystemError> {
        let host = nix::unistd::gethostname()?
            .to_string_lossy()
            .into_owned();
        let addrs = (host.as_str(), 0)
            .to_socket_addrs()?
            .map(|sa| sa.ip());
        preferred_address(addrs)
            .map(|ip| ip.to_string())
            .ok_or(SystemError::NoAddress(host))
    }

    fn pull_update(&mut self, dir: &Path) -> Result<String, SystemError> {
        self.run("git", &["pull"], Some(dir))
    }

    fn power(&mut self, action: PowerAction) -> Result<(), SystemError> {
        let flag = match action {
            PowerAction::PowerOff => "-h",
            PowerAction::Reboot => "-r",
        };
        self.run("shutdown", &[flag, "now"], None)?;
        Ok(())
    }

    fn ping(&mut self, address: &str) -> bool {
        match self.run("ping", &["-c", "1", address], None) {
            Ok(_) => true,
            Err(e) => {
                debug!("Ping {} failed: {}", address, e);
                false
            }
        }
    }
}
