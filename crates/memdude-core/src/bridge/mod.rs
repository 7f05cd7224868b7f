//! Bridge adapter protocol
//!
//! The USBtinyISP-style bridge exposes a vendor command set over USB
//! control transfers: GPIO bit manipulation, chip power switching and SPI
//! byte transfers. This module defines the transport seam
//! ([`BridgeTransport`]) that backends implement, and the [`Bridge`]
//! command encoder built on top of it.

use crate::error::{Error, Result};

/// Vendor control request codes understood by the bridge firmware
///
/// The numeric values are a wire contract with the adapter and must not
/// change. Several requests (bulk flash/eeprom access, the 4-byte SPI
/// transfer) exist in the firmware but are not needed for 25-series
/// parts; they are kept here so the command table stays complete.
pub mod requests {
    /// Echo test
    pub const ECHO: u8 = 0;
    /// Read the output port pins
    pub const PORT_READ: u8 = 1;
    /// Write a byte to the output port
    pub const PORT_WRITE: u8 = 2;
    /// Clear a single port bit, value = bit number (0..7)
    pub const BIT_CLEAR: u8 = 3;
    /// Set a single port bit, value = bit number (0..7)
    pub const BIT_SET: u8 = 4;
    /// Apply power and enable buffers, value = SCK period, index = reset level
    pub const POWER_UP: u8 = 5;
    /// Remove power from the chip, disable buffers
    pub const POWER_DOWN: u8 = 6;
    /// 4-byte SPI transfer, value = c1c0, index = c3c2
    pub const SPI: u8 = 7;
    /// Set poll bytes for write, value = p1p2
    pub const POLL_BYTES: u8 = 8;
    /// Bulk flash read, index = address
    pub const FLASH_READ: u8 = 9;
    /// Bulk flash write, index = address, value = timeout
    pub const FLASH_WRITE: u8 = 10;
    /// Bulk eeprom read, index = address
    pub const EEPROM_READ: u8 = 11;
    /// Bulk eeprom write, index = address, value = timeout
    pub const EEPROM_WRITE: u8 = 12;
    /// Set port direction, value = direction register value
    pub const DDR_WRITE: u8 = 13;
    /// Single byte SPI transfer, value = the byte
    pub const SPI_SINGLE: u8 = 14;

    /// Reset line held low during power-up
    pub const RESET_LOW: u16 = 0;
    /// Reset line held high during power-up
    pub const RESET_HIGH: u16 = 1;

    /// Minimum SCK period accepted by the firmware
    pub const SCK_MIN: u8 = 1;
    /// Maximum SCK period accepted by the firmware
    pub const SCK_MAX: u8 = 250;
    /// Default SCK period
    pub const SCK_DEFAULT: u8 = 10;
}

/// Transport seam between the bridge protocol and the USB stack
///
/// A transport issues one vendor control request and returns however many
/// reply bytes the device produced (up to `reply.len()`). Commands that
/// carry no reply pass an empty buffer. Implementations live in the
/// backend crates; an in-memory emulator is enough for tests.
pub trait BridgeTransport {
    /// Issue a vendor control request and read the reply into `reply`
    ///
    /// Returns the number of reply bytes received. Any transport-level
    /// failure (device gone, transfer error) must be reported as an
    /// error, never as a truncated success.
    fn vendor_request(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        reply: &mut [u8],
    ) -> Result<usize>;
}

// Blanket impl for boxed transports to allow trait objects
#[cfg(feature = "alloc")]
impl BridgeTransport for alloc::boxed::Box<dyn BridgeTransport + Send> {
    fn vendor_request(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        reply: &mut [u8],
    ) -> Result<usize> {
        (**self).vendor_request(request, value, index, reply)
    }
}

/// Bridge command encoder
///
/// Owns a transport and encodes the individual bridge commands on it.
/// Power state lives in the adapter itself; `power_off` can be issued at
/// any time, powered or not, and is the designated cleanup command after
/// a failure.
pub struct Bridge<T: BridgeTransport> {
    pub(crate) transport: T,
    sck_period: u8,
}

impl<T: BridgeTransport> Bridge<T> {
    /// Create a bridge over the given transport with the default SCK period
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            sck_period: requests::SCK_DEFAULT,
        }
    }

    /// Override the SCK period used by `power_on`
    ///
    /// The value is clamped to the range the firmware accepts.
    pub fn with_sck_period(mut self, period: u8) -> Self {
        self.sck_period = period.clamp(requests::SCK_MIN, requests::SCK_MAX);
        self
    }

    /// Apply chip power and enable the bus buffers
    ///
    /// The reset line is driven high, which in this wiring doubles as the
    /// deasserted chip-select level.
    pub fn power_on(&mut self) -> Result<()> {
        log::debug!("bridge: power on, sck period {}", self.sck_period);
        self.transport.vendor_request(
            requests::POWER_UP,
            self.sck_period as u16,
            requests::RESET_HIGH,
            &mut [],
        )?;
        Ok(())
    }

    /// Remove chip power and disable the bus buffers
    ///
    /// Idempotent; valid at any time, including after a failed transfer.
    pub fn power_off(&mut self) -> Result<()> {
        log::debug!("bridge: power off");
        self.transport
            .vendor_request(requests::POWER_DOWN, 0, 0, &mut [])?;
        Ok(())
    }

    /// Drive an auxiliary output bit high
    pub fn set_pin(&mut self, bit: u8) -> Result<()> {
        debug_assert!(bit < 8);
        self.transport
            .vendor_request(requests::BIT_SET, bit as u16, 0, &mut [])?;
        Ok(())
    }

    /// Drive an auxiliary output bit low
    pub fn clear_pin(&mut self, bit: u8) -> Result<()> {
        debug_assert!(bit < 8);
        self.transport
            .vendor_request(requests::BIT_CLEAR, bit as u16, 0, &mut [])?;
        Ok(())
    }

    /// Transfer one SPI byte and return the byte clocked back
    pub fn spi_byte(&mut self, value: u8) -> Result<u8> {
        let mut reply = [0u8; 1];
        let got = self
            .transport
            .vendor_request(requests::SPI_SINGLE, value as u16, 0, &mut reply)?;
        if got != 1 {
            return Err(Error::ShortReply { expected: 1, got });
        }
        Ok(reply[0])
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    /// Records every control request and answers SPI transfers from a
    /// scripted reply queue.
    struct ScriptedTransport {
        requests: Vec<(u8, u16, u16)>,
        spi_replies: Vec<u8>,
        fail: bool,
    }

    impl ScriptedTransport {
        fn new() -> Self {
            Self {
                requests: Vec::new(),
                spi_replies: Vec::new(),
                fail: false,
            }
        }
    }

    impl BridgeTransport for ScriptedTransport {
        fn vendor_request(
            &mut self,
            request: u8,
            value: u16,
            index: u16,
            reply: &mut [u8],
        ) -> Result<usize> {
            if self.fail {
                return Err(Error::Transport);
            }
            self.requests.push((request, value, index));
            if request == requests::SPI_SINGLE && !reply.is_empty() {
                if let Some(b) = self.spi_replies.pop() {
                    reply[0] = b;
                    return Ok(1);
                }
                return Ok(0);
            }
            Ok(0)
        }
    }

    #[test]
    fn power_on_encodes_sck_and_reset_level() {
        let mut bridge = Bridge::new(ScriptedTransport::new());
        bridge.power_on().unwrap();
        assert_eq!(
            bridge.transport.requests,
            [(requests::POWER_UP, requests::SCK_DEFAULT as u16, requests::RESET_HIGH)]
        );
    }

    #[test]
    fn sck_period_is_clamped_to_firmware_range() {
        let mut bridge = Bridge::new(ScriptedTransport::new()).with_sck_period(0);
        bridge.power_on().unwrap();
        assert_eq!(bridge.transport.requests[0].1, requests::SCK_MIN as u16);

        let mut bridge = Bridge::new(ScriptedTransport::new()).with_sck_period(255);
        bridge.power_on().unwrap();
        assert_eq!(bridge.transport.requests[0].1, requests::SCK_MAX as u16);
    }

    #[test]
    fn pin_commands_carry_the_bit_number() {
        let mut bridge = Bridge::new(ScriptedTransport::new());
        bridge.clear_pin(4).unwrap();
        bridge.set_pin(4).unwrap();
        bridge.power_off().unwrap();
        assert_eq!(
            bridge.transport.requests,
            [
                (requests::BIT_CLEAR, 4, 0),
                (requests::BIT_SET, 4, 0),
                (requests::POWER_DOWN, 0, 0),
            ]
        );
    }

    #[test]
    fn spi_byte_returns_the_clocked_reply() {
        let mut transport = ScriptedTransport::new();
        transport.spi_replies.push(0xA5);
        let mut bridge = Bridge::new(transport);
        assert_eq!(bridge.spi_byte(0x05).unwrap(), 0xA5);
        assert_eq!(bridge.transport.requests, [(requests::SPI_SINGLE, 0x05, 0)]);
    }

    #[test]
    fn spi_byte_rejects_a_short_reply() {
        let mut bridge = Bridge::new(ScriptedTransport::new());
        assert_eq!(
            bridge.spi_byte(0x00),
            Err(Error::ShortReply { expected: 1, got: 0 })
        );
    }

    #[test]
    fn transport_failures_propagate() {
        let mut transport = ScriptedTransport::new();
        transport.fail = true;
        let mut bridge = Bridge::new(transport);
        assert_eq!(bridge.power_on(), Err(Error::Transport));
        assert_eq!(bridge.power_off(), Err(Error::Transport));
    }
}
