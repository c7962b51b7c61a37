pub mod client;
pub mod logging;

pub use client::{TransferClient, TransferError};
pub use logging::LoggingClient;
