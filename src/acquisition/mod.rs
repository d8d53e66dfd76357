// Acquisition module
// Validation of the connection form, the device session, the four device operations,
// and the runner that keeps imaging off the interaction loop.

pub mod config;
pub mod operations;
pub mod runner;
pub mod session;
pub mod validate;

pub use config::AcquisitionPaths;
pub use operations::{
    ConnectOutcome, DeviceProperties, TransferReport, connect, create_image, read_properties,
    transfer_image,
};
pub use runner::{ImagingOutcome, ImagingRunner, ImagingState, RunnerError};
pub use session::{Session, SharedBridge};
pub use validate::{valid_address, valid_port};
