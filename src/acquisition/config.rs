//! Fixed device-side and workstation-side locations used by the imaging operations

use std::path::PathBuf;

/// Raw block device holding the watch's user data. Model-specific: other watches expose
/// userdata on a different dm-N node.
pub const DEFAULT_BLOCK_DEVICE: &str = "/dev/block/dm-4";
/// Where the image is staged on the device's own storage before transfer.
pub const DEFAULT_REMOTE_IMAGE: &str = "/sdcard/userdata.img";
/// Local filename, resolved against the working directory at transfer time.
pub const DEFAULT_LOCAL_IMAGE: &str = "image.img";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionPaths {
    pub block_device: String,
    pub remote_image: String,
    /// Relative paths are joined onto the current directory; absolute ones are used as-is.
    pub local_image: PathBuf,
}

impl Default for AcquisitionPaths {
    fn default() -> Self {
        Self {
            block_device: DEFAULT_BLOCK_DEVICE.to_string(),
            remote_image: DEFAULT_REMOTE_IMAGE.to_string(),
            local_image: PathBuf::from(DEFAULT_LOCAL_IMAGE),
        }
    }
}

impl AcquisitionPaths {
    /// Shell command that reads the block device through a second `dd` into the staging file.
    /// Needs root on the device.
    pub fn imaging_command(&self) -> String {
        format!(
            "su -c \"dd if={} | dd of={}\"",
            self.block_device, self.remote_image
        )
    }

    pub fn resolve_local_image(&self) -> std::io::Result<PathBuf> {
        Ok(std::env::current_dir()?.join(&self.local_image))
    }
}
