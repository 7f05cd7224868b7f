//! USBtiny USB identifiers and transfer parameters
//!
//! The request codes themselves are part of the bridge wire contract and
//! live in `memdude_core::bridge::requests`.

use std::time::Duration;

/// USB vendor ID of the USBtinyISP
pub const USBTINY_USB_VENDOR: u16 = 0x1781;
/// USB product ID of the USBtinyISP
pub const USBTINY_USB_PRODUCT: u16 = 0x0C9F;

/// Timeout for a single control transfer
pub const USB_TIMEOUT: Duration = Duration::from_millis(500);
