use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// The error type for everything that talks to the ADB daemon or the device behind it.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("ADB daemon request '{request}' failed: {source}")]
    Daemon {
        request: String,
        source: adb_client::RustADBError,
    },

    #[error("Could not open device '{serial}': {source}")]
    DeviceUnavailable {
        serial: String,
        source: adb_client::RustADBError,
    },

    #[error("Shell command '{command}' failed: {source}")]
    ShellCommandFailed {
        command: String,
        source: adb_client::RustADBError,
    },

    #[error("Pulling '{remote}' failed: {source}")]
    PullFailed {
        remote: String,
        source: adb_client::RustADBError,
    },

    #[error("'{endpoint}' is not a usable IPv4 socket address")]
    InvalidEndpoint { endpoint: String },

    #[error("'adb' binary not found in PATH. Install Android Platform Tools or run with --impl=rust.")]
    AdbBinaryMissing,

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Could not write local image {path:?}: {source}")]
    LocalFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("The shell backend needs a tokio runtime to drive 'adb'")]
    NoRuntime,

    #[error("ADB server handle is poisoned after a panic in another caller")]
    LockPoisoned,

    #[error("Imaging worker did not complete: {source}")]
    Worker {
        #[from]
        source: tokio::task::JoinError,
    },
}

impl BridgeError {
    /// True when the daemon itself could not be reached, as opposed to a device-side failure.
    pub fn is_daemon_unreachable(&self) -> bool {
        match self {
            BridgeError::Daemon { source, .. } => {
                let text = source.to_string();
                text.contains("Connection refused") || text.contains("os error 111")
            }
            BridgeError::AdbBinaryMissing => true,
            _ => false,
        }
    }
}
