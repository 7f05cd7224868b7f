//! memdude-usbtiny - USBtinyISP bridge transport
//!
//! Implements [`memdude_core::bridge::BridgeTransport`] for the
//! USBtinyISP adapter family. The adapter exposes its whole command set
//! as vendor IN control transfers, so the transport is a single request
//! primitive; command encoding lives in `memdude-core`.

mod device;
mod error;
pub mod protocol;

pub use device::Usbtiny;
pub use error::{Result, UsbtinyError};
