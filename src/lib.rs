//! netdimm-panel library exports for the binary and integration tests

pub mod core;
pub mod handlers;
pub mod panel;
pub mod runtime;
pub mod system;
pub mod transfer;

#[cfg(test)]
pub mod test_support;
