use crate::adb::{Bridge, BridgeResult, Device, ShellOutput};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub type SharedBridge = Arc<dyn Bridge>;

/// The one connected device every operation targets, plus the bridge that reaches it.
///
/// Opened by Connect and closed on re-connect or exit. Cloning is cheap and yields a
/// read-only view, which is what an in-flight imaging worker holds. The handle is not
/// notified when the device drops off the bridge; the next call fails instead.
#[derive(Clone)]
pub struct Session {
    bridge: SharedBridge,
    device: Device,
    endpoint: String,
    opened_at: Instant,
}

impl Session {
    pub fn open(bridge: SharedBridge, device: Device, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        log::info!(
            "Session opened: {} via {} (requested {})",
            device.serial,
            bridge.name(),
            endpoint
        );
        Self {
            bridge,
            device,
            endpoint,
            opened_at: Instant::now(),
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn serial(&self) -> &str {
        &self.device.serial
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn age(&self) -> Duration {
        self.opened_at.elapsed()
    }

    pub fn shell(&self, command: &str) -> BridgeResult<ShellOutput> {
        self.bridge.shell(&self.device, command)
    }

    pub fn pull(&self, remote_path: &str, local_path: &Path) -> BridgeResult<u64> {
        self.bridge.pull(&self.device, remote_path, local_path)
    }

    pub fn close(self) {
        log::info!(
            "Session closed: {} after {}s",
            self.device.serial,
            self.age().as_secs()
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("device", &self.device)
            .field("endpoint", &self.endpoint)
            .field("bridge", &self.bridge.name())
            .finish()
    }
}
