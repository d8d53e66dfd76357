pub mod acquisition;
pub mod adb;
pub mod args;
pub mod interaction;

pub use acquisition::{AcquisitionPaths, Session};
pub use adb::{AdbBackend, BackendKind, Bridge};
