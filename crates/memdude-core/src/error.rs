//! Error types for memdude-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Bridge errors
    /// A vendor control request to the bridge adapter failed
    Transport,
    /// The bridge returned fewer reply bytes than the request demands
    ShortReply {
        /// Number of reply bytes the command requires
        expected: usize,
        /// Number of reply bytes actually returned
        got: usize,
    },

    // Chip errors
    /// The write-in-progress bit did not clear within the poll budget
    Timeout,
    /// The single-command chip erase was requested for a part without it
    EraseNotSupported,

    // Operation errors
    /// Address or length is beyond the end of the part
    AddressOutOfBounds,
    /// Read-back after programming did not match the source data
    Verify {
        /// Address of the first mismatching byte
        addr: u32,
        /// The byte that was written
        expected: u8,
        /// The byte that was read back
        found: u8,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "bridge control request failed"),
            Self::ShortReply { expected, got } => {
                write!(f, "short reply from bridge: expected {} bytes, got {}", expected, got)
            }
            Self::Timeout => write!(f, "chip did not become ready within the poll budget"),
            Self::EraseNotSupported => {
                write!(f, "chip erase command not supported by this part")
            }
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::Verify {
                addr,
                expected,
                found,
            } => {
                write!(
                    f,
                    "verify failed at 0x{:08X}: wrote 0x{:02X}, read back 0x{:02X}",
                    addr, expected, found
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
