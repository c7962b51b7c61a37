use std::fmt;
use std::path::Path;

/// Errors that can occur talking to a transfer target.
/// Variants say where the session broke, for the log and the display.
#[derive(Debug)]
pub enum TransferError {
    /// Could not establish a session (unreachable, refused, bad address).
    Connect(String),
    /// The session broke mid-operation.
    Io(std::io::Error),
    /// A primitive was issued without an open session.
    NotConnected,
    /// The target rejected or failed a primitive.
    Protocol(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::Connect(msg) => write!(f, "connect failed: {msg}"),
            TransferError::Io(e) => write!(f, "transfer I/O error: {e}"),
            TransferError::NotConnected => write!(f, "no open session"),
            TransferError::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for TransferError {}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        TransferError::Io(e)
    }
}

/// Session-oriented payload transfer to a remote target.
///
/// The wire encoding of each primitive belongs to the implementation; the
/// panel only sequences them.
pub trait TransferClient {
    /// Returns the name of the client, for logging.
    fn name(&self) -> &str;

    fn connect(&mut self, address: &str, port: u16) -> Result<(), TransferError>;

    /// Close the session. Safe to call without one.
    fn disconnect(&mut self);

    fn set_host_mode(&mut self, mode: u8, flag: u8) -> Result<(), TransferError>;

    fn set_security_key(&mut self, key: &[u8]) -> Result<(), TransferError>;

    fn upload_file(&mut self, path: &Path) -> Result<(), TransferError>;

    fn restart_host(&mut self) -> Result<(), TransferError>;

    fn set_time_limit(&mut self, millis: u32) -> Result<(), TransferError>;
}
