//! Transfer client that opens a real TCP session to the target and logs each
//! protocol primitive instead of encoding it.
//!
//! Connection failures are genuine, so the panel's error paths behave as they
//! would against hardware. Swap in a protocol backend to actually load
//! payloads.

use std::fs;
use std::net::{Shutdown, TcpStream};
use std::path::Path;

use log::{debug, info};

use crate::transfer::{TransferClient, TransferError};

#[derive(Default)]
pub struct LoggingClient {
    session: Option<TcpStream>,
}

impl LoggingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn peer(&self) -> Result<String, TransferError> {
        let stream = self.session.as_ref().ok_or(TransferError::NotConnected)?;
        Ok(stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string()))
    }
}

impl TransferClient for LoggingClient {
    fn name(&self) -> &str {
        "logging"
    }

    fn connect(&mut self, address: &str, port: u16) -> Result<(), TransferError> {
        self.disconnect();
        let stream = TcpStream::connect((address, port))
            .map_err(|e| TransferError::Connect(format!("{address}:{port}: {e}")))?;
        info!("Session opened to {}:{}", address, port);
        self.session = Some(stream);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(stream) = self.session.take() {
            let _ = stream.shutdown(Shutdown::Both);
            info!("Session closed");
        }
    }

    fn set_host_mode(&mut self, mode: u8, flag: u8) -> Result<(), TransferError> {
        let peer = self.peer()?;
        info!("[{}] set host mode {} {}", peer, mode, flag);
        Ok(())
    }

    fn set_security_key(&mut self, key: &[u8]) -> Result<(), TransferError> {
        let peer = self.peer()?;
        info!("[{}] set security key ({} bytes)", peer, key.len());
        Ok(())
    }

    fn upload_file(&mut self, path: &Path) -> Result<(), TransferError> {
        let peer = self.peer()?;
        let size = fs::metadata(path)?.len();
        info!("[{}] upload {} ({} bytes)", peer, path.display(), size);
        Ok(())
    }

    fn restart_host(&mut self) -> Result<(), TransferError> {
        let peer = self.peer()?;
        info!("[{}] restart host", peer);
        Ok(())
    }

    fn set_time_limit(&mut self, millis: u32) -> Result<(), TransferError> {
        let peer = self.peer()?;
        debug!("[{}] set time limit {} ms", peer, millis);
        Ok(())
    }
}
