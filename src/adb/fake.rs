// Scripted in-memory bridge for exercising operations without a daemon
use super::error::{BridgeError, BridgeResult};
use super::types::{Bridge, Device, ShellOutput};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    StartServer,
    Connect(String, u16),
    ListDevices,
    Shell(String, String),
    Pull(String, String),
}

#[derive(Default)]
pub struct FakeBridge {
    pub devices: Mutex<Vec<Device>>,
    /// Devices that show up once `connect` has been called.
    pub attach_on_connect: Mutex<Vec<Device>>,
    pub connect_fails: bool,
    pub daemon_down: bool,
    pub replies: Mutex<HashMap<String, ShellOutput>>,
    pub shell_delay: Option<Duration>,
    pub remote_files: Mutex<HashMap<String, Vec<u8>>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeBridge {
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(devices),
            ..Self::default()
        }
    }

    pub fn reply(self, command: &str, text: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), ShellOutput::new(text, Some(0)));
        self
    }

    pub fn remote_file(self, path: &str, bytes: &[u8]) -> Self {
        self.remote_files
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn shell_commands(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Shell(_, command) => Some(command),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn refused(request: &str) -> BridgeError {
        BridgeError::CommandFailed {
            command: request.to_string(),
            status: "exit status: 1".into(),
            stderr: "Connection refused".into(),
        }
    }
}

impl Bridge for FakeBridge {
    fn start_server(&self) -> BridgeResult<()> {
        self.record(Call::StartServer);
        if self.daemon_down {
            return Err(Self::refused("start-server"));
        }
        Ok(())
    }

    fn connect(&self, address: &str, port: u16) -> BridgeResult<String> {
        self.record(Call::Connect(address.to_string(), port));
        if self.connect_fails || self.daemon_down {
            return Err(Self::refused("connect"));
        }
        let attached: Vec<Device> = self.attach_on_connect.lock().unwrap().drain(..).collect();
        self.devices.lock().unwrap().extend(attached);
        Ok(format!("connected to {address}:{port}"))
    }

    fn list_devices(&self) -> BridgeResult<Vec<Device>> {
        self.record(Call::ListDevices);
        if self.daemon_down {
            return Err(Self::refused("devices"));
        }
        Ok(self.devices.lock().unwrap().clone())
    }

    fn shell(&self, device: &Device, command: &str) -> BridgeResult<ShellOutput> {
        self.record(Call::Shell(device.serial.clone(), command.to_string()));
        if let Some(delay) = self.shell_delay {
            std::thread::sleep(delay);
        }
        let reply = self.replies.lock().unwrap().get(command).cloned();
        Ok(reply.unwrap_or_else(|| ShellOutput::new(format!("/system/bin/sh: {command}: not found\n"), Some(127))))
    }

    fn pull(&self, device: &Device, remote_path: &str, local_path: &Path) -> BridgeResult<u64> {
        self.record(Call::Pull(device.serial.clone(), remote_path.to_string()));
        let bytes = self
            .remote_files
            .lock()
            .unwrap()
            .get(remote_path)
            .cloned()
            .ok_or_else(|| BridgeError::CommandFailed {
                command: format!("pull {remote_path}"),
                status: "exit status: 1".into(),
                stderr: format!("remote object '{remote_path}' does not exist"),
            })?;
        std::fs::write(local_path, &bytes).map_err(|source| BridgeError::LocalFile {
            path: local_path.to_path_buf(),
            source,
        })?;
        Ok(bytes.len() as u64)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
