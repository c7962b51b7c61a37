//! Process lifecycle: termination signals and supervisor readiness.
//!
//! SIGTERM and SIGINT are blocked in every thread and collected by one
//! watcher thread with `sigwait`, so teardown never runs inside a signal
//! handler and never races the control loop's own drawing.

use std::env;
use std::io;
use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixDatagram};
use std::process;
use std::thread;

use log::{debug, error, info, warn};
use nix::sys::signal::{self, SigSet, Signal};
use nix::unistd::Pid;

use crate::panel::ReleaseHook;

fn termination_signals() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGTERM);
    set.add(Signal::SIGINT);
    set
}

/// Block SIGTERM/SIGINT on the calling thread. Call from `main` before any
/// other thread is spawned so they all inherit the mask.
pub fn block_termination_signals() -> io::Result<()> {
    termination_signals()
        .thread_block()
        .map_err(io::Error::from)
}

/// Wait for a termination signal on a dedicated thread, then release the
/// display and exit the process.
pub fn spawn_signal_watcher(release: ReleaseHook) -> io::Result<()> {
    thread::Builder::new()
        .name("signal-watcher".into())
        .spawn(move || {
            let set = termination_signals();
            match set.wait() {
                Ok(sig) => info!("Received {}, shutting down", sig),
                Err(e) => error!("sigwait failed: {}, shutting down", e),
            }
            release();
            process::exit(0);
        })?;
    Ok(())
}

/// Deliver SIGINT to this process, as a terminal would for Ctrl+C.
pub fn interrupt() {
    if let Err(e) = signal::kill(Pid::this(), Signal::SIGINT) {
        warn!("Failed to raise SIGINT: {}", e);
    }
}

/// Tell the service manager startup finished. Does nothing when not
/// supervised.
pub fn notify_ready() {
    let Ok(socket) = env::var("NOTIFY_SOCKET") else {
        debug!("NOTIFY_SOCKET unset, skipping readiness notification");
        return;
    };
    match notify(&socket, "READY=1") {
        Ok(()) => info!("Readiness sent to {}", socket),
        Err(e) => warn!("Readiness notification to {} failed: {}", socket, e),
    }
}

fn notify(socket: &str, state: &str) -> io::Result<()> {
    let addr = match socket.strip_prefix('@') {
        Some(name) => SocketAddr::from_abstract_name(name)?,
        None => SocketAddr::from_pathname(socket)?,
    };
    let sock = UnixDatagram::unbound()?;
    sock.send_to_addr(state.as_bytes(), &addr)?;
    Ok(())
}
