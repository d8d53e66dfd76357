// ADB module - the device bridge the acquisition operations are built on.
// Two interchangeable backends: the adb_client crate talking to the daemon directly,
// or the platform-tools `adb` binary.

pub mod backend;
pub mod error;
pub mod rust_impl;
pub mod shell;
pub mod types;

#[cfg(test)]
pub(crate) mod fake;

// Re-export the main types for easy access
pub use backend::{AdbBackend, BackendKind};
pub use error::{BridgeError, BridgeResult};
pub use rust_impl::RustAdb;
pub use shell::AdbShell;
pub use types::{Bridge, Device, ShellOutput};
