// https://crates.io/crates/adb_client
use super::error::{BridgeError, BridgeResult};
use super::types::{Bridge, Device, ShellOutput};
use adb_client::{ADBDeviceExt, ADBServer, ADBServerDevice};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Loopback control port the daemon listens on.
pub const DEFAULT_SERVER_PORT: u16 = 5037;

/// Talks to the ADB daemon directly through `adb_client`, no platform-tools binary needed.
pub struct RustAdb {
    server: Mutex<ADBServer>,
    server_address: SocketAddrV4,
}

impl Default for RustAdb {
    fn default() -> Self {
        Self::with_address(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_SERVER_PORT))
    }
}

impl RustAdb {
    pub fn with_address(server_address: SocketAddrV4) -> Self {
        Self {
            server: Mutex::new(ADBServer::new(server_address)),
            server_address,
        }
    }

    pub fn server_address(&self) -> SocketAddrV4 {
        self.server_address
    }

    fn lock(&self) -> BridgeResult<MutexGuard<'_, ADBServer>> {
        self.server.lock().map_err(|_| BridgeError::LockPoisoned)
    }

    // The server lock is only held while the device transport is opened; the returned
    // device owns its own connection so long shell commands do not block other callers.
    fn open_device(&self, device: &Device) -> BridgeResult<ADBServerDevice> {
        let mut server = self.lock()?;
        server
            .get_device_by_name(&device.serial)
            .map_err(|source| BridgeError::DeviceUnavailable {
                serial: device.serial.clone(),
                source,
            })
    }
}

/// Parse `address:port` as an IPv4 socket address, the only endpoint form the daemon accepts here.
pub fn parse_endpoint(address: &str, port: u16) -> BridgeResult<SocketAddrV4> {
    let endpoint = format!("{address}:{port}");
    endpoint
        .parse::<SocketAddrV4>()
        .map_err(|_| BridgeError::InvalidEndpoint { endpoint })
}

impl Bridge for RustAdb {
    fn start_server(&self) -> BridgeResult<()> {
        // Any request starts the daemon on demand; `version` is the cheapest one.
        let mut server = self.lock()?;
        let version = server.version().map_err(|source| BridgeError::Daemon {
            request: "version".into(),
            source,
        })?;
        log::debug!("RustAdb: daemon at {} reports {:?}", self.server_address, version);
        Ok(())
    }

    fn connect(&self, address: &str, port: u16) -> BridgeResult<String> {
        let endpoint = parse_endpoint(address, port)?;
        log::debug!("RustAdb: connect {endpoint}");
        let mut server = self.lock()?;
        server
            .connect_device(endpoint)
            .map_err(|source| BridgeError::Daemon {
                request: format!("connect {endpoint}"),
                source,
            })?;
        Ok(format!("connected to {endpoint}"))
    }

    fn list_devices(&self) -> BridgeResult<Vec<Device>> {
        let mut server = self.lock()?;
        let devices = server.devices().map_err(|source| BridgeError::Daemon {
            request: "devices".into(),
            source,
        })?;
        let mapped: Vec<Device> = devices
            .into_iter()
            .map(|d| Device::new(d.identifier, d.state.to_string()))
            .collect();
        log::debug!("RustAdb: {} device(s) listed", mapped.len());
        Ok(mapped)
    }

    fn shell(&self, device: &Device, command: &str) -> BridgeResult<ShellOutput> {
        let mut dev = self.open_device(device)?;
        let mut out: Vec<u8> = Vec::new();
        log::debug!("RustAdb: [{}] shell {}", device.serial, command);
        // The daemon hands the joined command to the device shell, so pipes and quoting
        // behave as they would at an interactive prompt.
        dev.shell_command(&[command], &mut out)
            .map_err(|source| BridgeError::ShellCommandFailed {
                command: command.to_string(),
                source,
            })?;
        Ok(ShellOutput::new(String::from_utf8_lossy(&out), None))
    }

    fn pull(&self, device: &Device, remote_path: &str, local_path: &Path) -> BridgeResult<u64> {
        let mut dev = self.open_device(device)?;
        let local_error = |source| BridgeError::LocalFile {
            path: local_path.to_path_buf(),
            source,
        };
        let file = File::create(local_path).map_err(local_error)?;
        let mut writer = BufWriter::new(file);
        log::debug!(
            "RustAdb: [{}] pull {} -> {}",
            device.serial,
            remote_path,
            local_path.display()
        );
        dev.pull(&remote_path, &mut writer)
            .map_err(|source| BridgeError::PullFailed {
                remote: remote_path.to_string(),
                source,
            })?;
        writer.flush().map_err(local_error)?;
        let file = writer
            .into_inner()
            .map_err(|e| local_error(e.into_error()))?;
        Ok(file.metadata().map_err(local_error)?.len())
    }

    fn name(&self) -> &'static str {
        "rust"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_accepts_dotted_quad() {
        let endpoint = parse_endpoint("192.168.1.20", 5555).unwrap();
        assert_eq!(endpoint, SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 5555));
    }

    #[test]
    fn endpoint_rejects_out_of_range_octets() {
        // Syntactically valid for the form validator, but not a real address.
        let err = parse_endpoint("999.999.999.999", 5555).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidEndpoint { ref endpoint } if endpoint == "999.999.999.999:5555"));
    }

    #[test]
    fn default_targets_loopback_control_port() {
        let adb = RustAdb::default();
        assert_eq!(
            adb.server_address(),
            SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEFAULT_SERVER_PORT)
        );
        assert_eq!(adb.name(), "rust");
    }
}
