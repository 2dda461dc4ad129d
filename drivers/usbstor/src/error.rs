use core::fmt;
use kernel_api::status::DriverStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbStorError {
    /// The I/O manager could not allocate the device object.
    NodeCreationFailed(DriverStatus),
    /// The stack below refused the attach.
    DeviceRemoved,
}

impl UsbStorError {
    pub fn status(&self) -> DriverStatus {
        match self {
            UsbStorError::NodeCreationFailed(status) => *status,
            UsbStorError::DeviceRemoved => DriverStatus::DeviceRemoved,
        }
    }
}

impl fmt::Display for UsbStorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsbStorError::NodeCreationFailed(status) => {
                write!(f, "device node creation failed ({})", status)
            }
            UsbStorError::DeviceRemoved => f.write_str("lower device stack refused attach"),
        }
    }
}

impl core::error::Error for UsbStorError {}

impl From<UsbStorError> for DriverStatus {
    fn from(e: UsbStorError) -> Self {
        e.status()
    }
}
