//! Error types for the USBtiny transport

use thiserror::Error;

/// Result type for USBtiny operations
pub type Result<T> = std::result::Result<T, UsbtinyError>;

/// Errors that can occur when opening or talking to a USBtiny adapter
#[derive(Debug, Error)]
pub enum UsbtinyError {
    /// No adapter with the USBtiny VID/PID is connected
    #[error("USBtiny programmer not connected (VID:1781 PID:0C9F)")]
    DeviceNotFound,

    /// The device could not be opened
    #[error("Failed to open USBtiny: {0}")]
    OpenFailed(String),

    /// The interface could not be claimed
    #[error("Failed to claim interface: {0}")]
    ClaimFailed(String),

    /// A control transfer failed
    #[error("USB control transfer failed: {0}")]
    TransferFailed(String),
}

impl From<nusb::Error> for UsbtinyError {
    fn from(e: nusb::Error) -> Self {
        UsbtinyError::TransferFailed(e.to_string())
    }
}
