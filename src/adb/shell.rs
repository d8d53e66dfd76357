use super::error::{BridgeError, BridgeResult};
use super::types::{Bridge, Device, ShellOutput};
use std::path::Path;
use std::process::Output;
use tokio::process::Command;
use tokio::runtime::Handle;

/// Drives the `adb` platform-tools binary; the daemon it talks to is the one on the default port.
///
/// Bridge calls arrive on the blocking pool, so each `adb` child is awaited there through the
/// runtime handle.
#[derive(Debug, Default)]
pub struct AdbShell;

impl AdbShell {
    fn ensure_adb_available() -> BridgeResult<()> {
        match std::process::Command::new("adb").arg("version").output() {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(BridgeError::CommandFailed {
                command: "adb version".into(),
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BridgeError::AdbBinaryMissing),
            Err(e) => Err(e.into()),
        }
    }

    async fn output(args: &[&str]) -> std::io::Result<Output> {
        Command::new("adb").args(args).kill_on_drop(true).output().await
    }

    fn run(args: &[&str]) -> BridgeResult<Output> {
        Self::ensure_adb_available()?;
        let handle = Handle::try_current().map_err(|_| BridgeError::NoRuntime)?;
        log::debug!("AdbShell: adb {}", args.join(" "));
        Ok(handle.block_on(Self::output(args))?)
    }

    fn run_checked(args: &[&str]) -> BridgeResult<Output> {
        let output = Self::run(args)?;
        if !output.status.success() {
            return Err(BridgeError::CommandFailed {
                command: format!("adb {}", args.join(" ")),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }

    /// Parse `adb devices -l` output. Every listed entry is kept along with its state.
    pub fn parse_devices(output: &str) -> Vec<Device> {
        output
            .lines()
            .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let serial = parts.next()?;
                let state = parts.next()?;
                Some(Device::new(serial, state))
            })
            .collect()
    }

    /// `adb connect` exits 0 even when the device refused, so its reply text decides.
    pub fn connect_refused(reply: &str) -> bool {
        let reply = reply.to_ascii_lowercase();
        reply.contains("connection refused")
            || reply.contains("failed to connect")
            || reply.contains("cannot connect")
            || reply.contains("unable to connect")
    }

    /// `adb connect` output as the daemon's reply, or a refusal error even on a zero exit.
    pub fn connect_reply(
        endpoint: &str,
        stdout: &[u8],
        stderr: &[u8],
        status: &str,
    ) -> BridgeResult<String> {
        let reply = format!(
            "{}{}",
            String::from_utf8_lossy(stdout),
            String::from_utf8_lossy(stderr)
        )
        .trim()
        .to_string();
        if Self::connect_refused(&reply) {
            return Err(BridgeError::CommandFailed {
                command: format!("adb connect {endpoint}"),
                status: status.to_string(),
                stderr: reply,
            });
        }
        Ok(reply)
    }

    /// Device shell output: stdout then stderr, with the exit code `adb` passed through.
    pub fn shell_output(stdout: &[u8], stderr: &[u8], exit_code: Option<i32>) -> ShellOutput {
        let mut text = String::from_utf8_lossy(stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(stderr));
        ShellOutput::new(text, exit_code)
    }
}

impl Bridge for AdbShell {
    fn start_server(&self) -> BridgeResult<()> {
        Self::run_checked(&["start-server"])?;
        Ok(())
    }

    fn connect(&self, address: &str, port: u16) -> BridgeResult<String> {
        let endpoint = format!("{address}:{port}");
        let output = Self::run_checked(&["connect", &endpoint])?;
        Self::connect_reply(
            &endpoint,
            &output.stdout,
            &output.stderr,
            &output.status.to_string(),
        )
    }

    fn list_devices(&self) -> BridgeResult<Vec<Device>> {
        let output = Self::run_checked(&["devices", "-l"])?;
        Ok(Self::parse_devices(&String::from_utf8_lossy(&output.stdout)))
    }

    fn shell(&self, device: &Device, command: &str) -> BridgeResult<ShellOutput> {
        // A non-zero exit is the command's own result, not a transport failure.
        let output = Self::run(&["-s", &device.serial, "shell", command])?;
        Ok(Self::shell_output(
            &output.stdout,
            &output.stderr,
            output.status.code(),
        ))
    }

    fn pull(&self, device: &Device, remote_path: &str, local_path: &Path) -> BridgeResult<u64> {
        let local = local_path.to_string_lossy();
        Self::run_checked(&["-s", &device.serial, "pull", remote_path, &local])?;
        let metadata = std::fs::metadata(local_path).map_err(|source| BridgeError::LocalFile {
            path: local_path.to_path_buf(),
            source,
        })?;
        Ok(metadata.len())
    }

    fn name(&self) -> &'static str {
        "shell"
    }
}
