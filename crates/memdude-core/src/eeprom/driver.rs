//! EEPROM driver
//!
//! Implements the 25-series SPI command set on top of the bridge command
//! encoder: chip-select sequencing, status polling, write enable, page
//! write, sequential read and chip erase.
//!
//! Chip select is active low and shares the bridge's reset line (bit 4 in
//! the reference wiring). Every public operation deselects the chip
//! before returning, on success and on error alike.

use crate::bridge::{Bridge, BridgeTransport};
use crate::eeprom::address::AddressWidth;
use crate::eeprom::opcodes;
use crate::error::{Error, Result};

/// Output bit wired to chip select on the reference adapter
pub const DEFAULT_CS_BIT: u8 = 4;

/// Default number of status polls before `wait_ready` gives up
///
/// A page write completes in a few milliseconds; even over a slow USB
/// link the budget is orders of magnitude above any healthy part.
pub const DEFAULT_POLL_BUDGET: u32 = 100_000;

/// Driver for one 25-series EEPROM behind a bridge adapter
///
/// Exactly one driver session may be active against one adapter at a
/// time; the bridge has a single chip-select line and no provision for
/// multiplexing.
pub struct EepromDriver<T: BridgeTransport> {
    pub(crate) bridge: Bridge<T>,
    cs_bit: u8,
    address_width: AddressWidth,
    poll_budget: u32,
}

impl<T: BridgeTransport> EepromDriver<T> {
    /// Create a driver with the default chip-select wiring and poll budget
    pub fn new(transport: T, address_width: AddressWidth) -> Self {
        Self {
            bridge: Bridge::new(transport),
            cs_bit: DEFAULT_CS_BIT,
            address_width,
            poll_budget: DEFAULT_POLL_BUDGET,
        }
    }

    /// Override the output bit used as chip select
    pub fn with_cs_bit(mut self, bit: u8) -> Self {
        debug_assert!(bit < 8);
        self.cs_bit = bit;
        self
    }

    /// Override the `wait_ready` poll budget
    pub fn with_poll_budget(mut self, polls: u32) -> Self {
        self.poll_budget = polls;
        self
    }

    /// Override the SCK period used when powering on
    pub fn with_sck_period(mut self, period: u8) -> Self {
        self.bridge = self.bridge.with_sck_period(period);
        self
    }

    /// Apply chip power and enable the bus buffers
    pub fn power_on(&mut self) -> Result<()> {
        self.bridge.power_on()
    }

    /// Remove chip power; safe to call at any time, including after errors
    pub fn power_off(&mut self) -> Result<()> {
        self.bridge.power_off()
    }

    /// Run `f` with the chip selected, deselecting again on every path
    fn with_selected<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        self.bridge.clear_pin(self.cs_bit)?;
        let result = f(self);
        let deselect = self.bridge.set_pin(self.cs_bit);
        let value = result?;
        deselect?;
        Ok(value)
    }

    /// Clock out the address for an array access command
    fn send_address(&mut self, addr: u32) -> Result<()> {
        debug_assert!(addr < self.address_width.max_size());
        let mut buf = [0u8; 3];
        let n = self.address_width.bytes() as usize;
        self.address_width.encode(addr, &mut buf[..n]);
        for &b in &buf[..n] {
            self.bridge.spi_byte(b)?;
        }
        Ok(())
    }

    /// Read the status register
    ///
    /// Bit 0 is write-in-progress, bit 1 the write enable latch.
    pub fn read_status(&mut self) -> Result<u8> {
        self.with_selected(|drv| {
            drv.bridge.spi_byte(opcodes::RDSR)?;
            drv.bridge.spi_byte(0)
        })
    }

    /// Set the write enable latch; required before every write or erase
    pub fn write_enable(&mut self) -> Result<()> {
        self.with_selected(|drv| {
            drv.bridge.spi_byte(opcodes::WREN)?;
            Ok(())
        })
    }

    /// Erase the whole array with the single-command erase
    ///
    /// Only the 512K/1M parts implement this; for the rest the caller
    /// synthesizes an erase by programming 0xFF pages.
    pub fn chip_erase(&mut self) -> Result<()> {
        self.write_enable()?;
        self.with_selected(|drv| {
            drv.bridge.spi_byte(opcodes::CE)?;
            Ok(())
        })?;
        self.wait_ready()
    }

    /// Program one block of bytes starting at `addr`
    ///
    /// The block must not cross a page boundary; the chip would wrap
    /// around inside the page instead of spilling into the next one. The
    /// split into safe blocks is the job of [`crate::eeprom::ops`].
    pub fn write_block(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        log::trace!("write block: 0x{:08X} + {} bytes", addr, data.len());
        self.write_enable()?;
        self.with_selected(|drv| {
            drv.bridge.spi_byte(opcodes::WRITE)?;
            drv.send_address(addr)?;
            for &b in data {
                drv.bridge.spi_byte(b)?;
            }
            Ok(())
        })?;
        self.wait_ready()
    }

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// Reads are sequential across the whole array, so any length is
    /// valid here; callers chunk for progress reporting, not correctness.
    pub fn read_block(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        log::trace!("read block: 0x{:08X} + {} bytes", addr, buf.len());
        self.with_selected(|drv| {
            drv.bridge.spi_byte(opcodes::READ)?;
            drv.send_address(addr)?;
            for slot in buf.iter_mut() {
                *slot = drv.bridge.spi_byte(0)?;
            }
            Ok(())
        })
    }

    /// Poll the status register until the write-in-progress bit clears
    ///
    /// Bounded by the poll budget; an unresponsive part yields
    /// [`Error::Timeout`] instead of hanging the session.
    pub fn wait_ready(&mut self) -> Result<()> {
        for _ in 0..self.poll_budget {
            if self.read_status()? & opcodes::SR_WIP == 0 {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }
}
