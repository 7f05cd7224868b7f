//! USBtiny device implementation
//!
//! Finds and opens the adapter over `nusb` and maps the bridge's
//! request primitive onto vendor IN control transfers. Every bridge
//! command, including the ones that carry no reply, is a control IN
//! request; the reply length is simply zero in that case.

use nusb::transfer::{ControlIn, ControlType, Recipient};
use nusb::{Interface, MaybeFuture};

use memdude_core::bridge::BridgeTransport;
use memdude_core::error::{Error as CoreError, Result as CoreResult};

use crate::error::{Result, UsbtinyError};
use crate::protocol::{USBTINY_USB_PRODUCT, USBTINY_USB_VENDOR, USB_TIMEOUT};

/// An opened USBtinyISP adapter
pub struct Usbtiny {
    interface: Interface,
}

impl Usbtiny {
    /// Open the first USBtiny adapter found
    pub fn open() -> Result<Self> {
        Self::open_nth(0)
    }

    /// Open the nth USBtiny adapter (0-indexed)
    ///
    /// Useful when multiple adapters are connected.
    pub fn open_nth(index: usize) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| UsbtinyError::OpenFailed(e.to_string()))?
            .filter(|d| {
                d.vendor_id() == USBTINY_USB_VENDOR && d.product_id() == USBTINY_USB_PRODUCT
            })
            .collect();

        if devices.is_empty() {
            return Err(UsbtinyError::DeviceNotFound);
        }

        let device_info = devices.get(index).ok_or(UsbtinyError::DeviceNotFound)?;

        log::info!(
            "Opening USBtiny at bus {} address {}",
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| UsbtinyError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| UsbtinyError::ClaimFailed(e.to_string()))?;

        Ok(Self { interface })
    }

    /// Number of USBtiny adapters currently connected
    pub fn count_devices() -> Result<usize> {
        let count = nusb::list_devices()
            .wait()
            .map_err(|e| UsbtinyError::OpenFailed(e.to_string()))?
            .filter(|d| {
                d.vendor_id() == USBTINY_USB_VENDOR && d.product_id() == USBTINY_USB_PRODUCT
            })
            .count();
        Ok(count)
    }
}

impl BridgeTransport for Usbtiny {
    fn vendor_request(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        reply: &mut [u8],
    ) -> CoreResult<usize> {
        log::trace!(
            "usbtiny: request 0x{:02X} value 0x{:04X} index 0x{:04X} reply {}",
            request,
            value,
            index,
            reply.len()
        );

        let data = self
            .interface
            .control_in(
                ControlIn {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    length: reply.len() as u16,
                },
                USB_TIMEOUT,
            )
            .wait()
            .map_err(|e| {
                log::error!("usbtiny: control request 0x{:02X} failed: {}", request, e);
                CoreError::Transport
            })?;

        let len = data.len().min(reply.len());
        reply[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }
}
