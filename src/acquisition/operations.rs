// Device operations: connect, read identifying properties, create the image, pull it
use super::config::AcquisitionPaths;
use super::session::{Session, SharedBridge};
use super::validate::{parse_port, valid_address};
use crate::adb::{BridgeError, BridgeResult, Device, ShellOutput};
use serde::Serialize;
use std::path::PathBuf;

pub const INVALID_ADDRESS: &str = "Invalid IP address. Please enter a valid IP address.";
pub const INVALID_PORT: &str = "Invalid port number. Please enter a valid port number.";
pub const NO_DEVICE_FOUND: &str = "No device found. Please check the IP address and port.";

pub const BRAND_COMMAND: &str = "getprop ro.product.brand";
pub const MODEL_COMMAND: &str = "getprop ro.product.model";
pub const OS_VERSION_COMMAND: &str = "getprop ro.system_ext.build.version.release";
/// The IMEI sits in fixed columns of the parcel dump; dots and whitespace are stripped.
pub const HARDWARE_ID_COMMAND: &str =
    "service call iphonesubinfo 1 | cut -c 52-66 | tr -d '.[:space:]'";

#[derive(Debug)]
pub enum ConnectOutcome {
    InvalidAddress,
    InvalidPort,
    NoDevice {
        connect_error: Option<BridgeError>,
    },
    Connected {
        session: Session,
        connect_error: Option<BridgeError>,
    },
}

impl ConnectOutcome {
    /// Display lines for the output pane, in order.
    pub fn messages(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let connect_error = match self {
            ConnectOutcome::InvalidAddress => return vec![INVALID_ADDRESS.to_string()],
            ConnectOutcome::InvalidPort => return vec![INVALID_PORT.to_string()],
            ConnectOutcome::NoDevice { connect_error } => connect_error,
            ConnectOutcome::Connected { connect_error, .. } => connect_error,
        };
        if let Some(e) = connect_error {
            lines.push(format!("Bridge connect failed: {e}"));
        }
        match self {
            ConnectOutcome::Connected { session, .. } => {
                lines.push(format!("Connected to {}", session.serial()))
            }
            _ => lines.push(NO_DEVICE_FOUND.to_string()),
        }
        lines
    }

    pub fn into_session(self) -> Option<Session> {
        match self {
            ConnectOutcome::Connected { session, .. } => Some(session),
            _ => None,
        }
    }
}

/// Validate the form fields, ask the daemon to attach the endpoint, then take the first
/// device it lists.
///
/// A refused connect is reported but does not stop enumeration, so a device already on the
/// bridge (e.g. over USB) is still picked up. An unreachable daemon reads as an empty list.
pub fn connect(bridge: &SharedBridge, address: &str, port: &str) -> ConnectOutcome {
    if !valid_address(address) {
        return ConnectOutcome::InvalidAddress;
    }
    let Some(port) = parse_port(port) else {
        return ConnectOutcome::InvalidPort;
    };

    let connect_error = match bridge.connect(address, port) {
        Ok(reply) => {
            log::debug!("connect {address}:{port}: {reply}");
            None
        }
        Err(e) => {
            log::warn!("connect {address}:{port} failed: {e}");
            Some(e)
        }
    };

    let devices = bridge.list_devices().unwrap_or_else(|e| {
        log::warn!("Device enumeration failed, treating as empty: {e}");
        Vec::new()
    });
    log::debug!("Enumerated devices: {:?}", devices);

    match first_listed(devices) {
        Some(device) => ConnectOutcome::Connected {
            session: Session::open(bridge.clone(), device, format!("{address}:{port}")),
            connect_error,
        },
        None => ConnectOutcome::NoDevice { connect_error },
    }
}

// The first entry is taken whatever its state; a device that is not ready fails at the
// bridge on the next operation.
fn first_listed(devices: Vec<Device>) -> Option<Device> {
    let device = devices.into_iter().next()?;
    if !device.is_online() {
        log::warn!(
            "Selected {} is in state '{}', commands will likely fail",
            device.serial,
            device.state
        );
    }
    Some(device)
}

/// Identifying properties of the connected device. A field whose command failed holds the
/// error text instead of a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceProperties {
    pub brand: String,
    pub model: String,
    pub os_version: String,
    pub hardware_id: String,
}

impl DeviceProperties {
    pub fn render(&self) -> String {
        format!(
            "Device Brand: {}\nDevice Model: {}\nAndroid Version: {}\nIMEI: {}\n",
            capitalize(&self.brand),
            self.model,
            self.os_version,
            self.hardware_id
        )
    }
}

/// First character upper-cased, the rest lower-cased.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn field(session: &Session, command: &str) -> String {
    match session.shell(command) {
        Ok(out) => out.trimmed().to_string(),
        Err(e) => {
            log::warn!("'{command}' failed on {}: {e}", session.serial());
            e.to_string()
        }
    }
}

/// Four independent property reads, in a fixed order.
pub fn read_properties(session: &Session) -> DeviceProperties {
    DeviceProperties {
        brand: field(session, BRAND_COMMAND),
        model: field(session, MODEL_COMMAND),
        os_version: field(session, OS_VERSION_COMMAND),
        hardware_id: field(session, HARDWARE_ID_COMMAND),
    }
}

/// Copy the block device to the staging path on the device. Blocks for the whole copy.
pub fn create_image(session: &Session, paths: &AcquisitionPaths) -> BridgeResult<ShellOutput> {
    let command = paths.imaging_command();
    log::info!("Imaging {} on {}", paths.block_device, session.serial());
    let output = session.shell(&command)?;
    log::info!(
        "Imaging command returned on {} ({} bytes of output)",
        session.serial(),
        output.text.len()
    );
    Ok(output)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferReport {
    pub local_path: PathBuf,
    pub bytes: u64,
}

/// Pull the staged image into the working directory, replacing any earlier copy.
pub fn transfer_image(session: &Session, paths: &AcquisitionPaths) -> BridgeResult<TransferReport> {
    let local_path = paths.resolve_local_image()?;
    log::info!(
        "Transferring {} from {} to {}",
        paths.remote_image,
        session.serial(),
        local_path.display()
    );
    let bytes = session.pull(&paths.remote_image, &local_path)?;
    Ok(TransferReport { local_path, bytes })
}
