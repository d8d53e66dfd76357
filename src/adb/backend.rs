use super::error::BridgeResult;
use super::rust_impl::RustAdb;
use super::shell::AdbShell;
use super::types::{Bridge, Device, ShellOutput};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Which bridge implementation the process talks through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    #[default]
    Rust,
    Shell,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rust" => Ok(BackendKind::Rust),
            "shell" => Ok(BackendKind::Shell),
            other => Err(format!("Unknown impl '{other}', expected 'rust' or 'shell'")),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Rust => write!(f, "rust"),
            BackendKind::Shell => write!(f, "shell"),
        }
    }
}

pub enum AdbBackend {
    Shell(AdbShell),
    Rust(RustAdb),
}

impl AdbBackend {
    pub fn new(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Rust => AdbBackend::Rust(RustAdb::default()),
            BackendKind::Shell => AdbBackend::Shell(AdbShell),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            AdbBackend::Shell(_) => BackendKind::Shell,
            AdbBackend::Rust(_) => BackendKind::Rust,
        }
    }
}

impl Bridge for AdbBackend {
    fn start_server(&self) -> BridgeResult<()> {
        match self {
            AdbBackend::Shell(s) => s.start_server(),
            AdbBackend::Rust(r) => r.start_server(),
        }
    }

    fn connect(&self, address: &str, port: u16) -> BridgeResult<String> {
        match self {
            AdbBackend::Shell(s) => s.connect(address, port),
            AdbBackend::Rust(r) => r.connect(address, port),
        }
    }

    fn list_devices(&self) -> BridgeResult<Vec<Device>> {
        match self {
            AdbBackend::Shell(s) => s.list_devices(),
            AdbBackend::Rust(r) => r.list_devices(),
        }
    }

    fn shell(&self, device: &Device, command: &str) -> BridgeResult<ShellOutput> {
        match self {
            AdbBackend::Shell(s) => s.shell(device, command),
            AdbBackend::Rust(r) => r.shell(device, command),
        }
    }

    fn pull(&self, device: &Device, remote_path: &str, local_path: &Path) -> BridgeResult<u64> {
        match self {
            AdbBackend::Shell(s) => s.pull(device, remote_path, local_path),
            AdbBackend::Rust(r) => r.pull(device, remote_path, local_path),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            AdbBackend::Shell(s) => s.name(),
            AdbBackend::Rust(r) => r.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_kind_parses_known_names() {
        assert_eq!("rust".parse::<BackendKind>(), Ok(BackendKind::Rust));
        assert_eq!("shell".parse::<BackendKind>(), Ok(BackendKind::Shell));
        assert!("usb".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::default(), BackendKind::Rust);
    }

    #[test]
    fn backend_reports_its_kind() {
        assert_eq!(AdbBackend::new(BackendKind::Shell).kind(), BackendKind::Shell);
        assert_eq!(AdbBackend::new(BackendKind::Rust).name(), "rust");
    }
}
