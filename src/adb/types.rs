// Core bridge types and the contract every backend implements
use super::error::BridgeResult;
use serde::Serialize;
use std::path::Path;

/// State string the daemon reports for a device that accepts commands.
pub const ONLINE_STATE: &str = "device";

/// Fragments a device shell prints when a command did not do what was asked.
const FAILURE_MARKERS: &[&str] = &[
    "Permission denied",
    "not found",
    "No such file or directory",
    "Read-only file system",
    "No space left on device",
    "error:",
];

#[derive(Debug, PartialEq, Eq, Serialize, Clone)]
pub struct Device {
    pub serial: String,
    pub state: String,
}

impl Device {
    pub fn new(serial: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            serial: serial.into(),
            state: state.into(),
        }
    }

    pub fn is_online(&self) -> bool {
        self.state == ONLINE_STATE
    }
}

/// Everything a device shell command printed, plus its exit code when the transport reports one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ShellOutput {
    pub text: String,
    pub exit_code: Option<i32>,
}

impl ShellOutput {
    pub fn new(text: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self {
            text: text.into(),
            exit_code,
        }
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Non-zero exit, or a shell diagnostic somewhere in the captured text.
    pub fn looks_failed(&self) -> bool {
        if matches!(self.exit_code, Some(code) if code != 0) {
            return true;
        }
        FAILURE_MARKERS
            .iter()
            .any(|marker| self.text.contains(marker))
    }

    /// The last `count` non-empty lines, joined with newlines.
    pub fn tail(&self, count: usize) -> String {
        let lines: Vec<&str> = self
            .text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let start = lines.len().saturating_sub(count);
        lines[start..].join("\n")
    }
}

/// Blocking calls into the device bridge. Callers on the async side wrap these in
/// `tokio::task::spawn_blocking`.
pub trait Bridge: Send + Sync {
    /// Make sure a daemon is listening on the local control port.
    fn start_server(&self) -> BridgeResult<()>;

    /// Ask the daemon to attach a network device; returns the daemon's reply.
    fn connect(&self, address: &str, port: u16) -> BridgeResult<String>;

    fn list_devices(&self) -> BridgeResult<Vec<Device>>;

    fn shell(&self, device: &Device, command: &str) -> BridgeResult<ShellOutput>;

    /// Copy `remote_path` to `local_path`, replacing any existing file. Returns bytes written.
    fn pull(&self, device: &Device, remote_path: &str, local_path: &Path) -> BridgeResult<u64>;

    fn name(&self) -> &'static str;
}
