//! memdude-dummy - In-memory bridge and EEPROM emulator
//!
//! This crate provides a dummy bridge transport that emulates a
//! USBtiny-style adapter with one 25-series EEPROM behind it. It's
//! useful for exercising the full programming pipeline without hardware:
//! power gating, chip-select edges, the write-enable latch, the
//! write-in-progress status bit and - crucially - the in-page write
//! wraparound that makes bad page splitting visible as corrupted data.

use memdude_core::bridge::{requests, BridgeTransport};
use memdude_core::eeprom::driver::DEFAULT_CS_BIT;
use memdude_core::eeprom::opcodes;
use memdude_core::Result;

/// Configuration for the emulated part
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Array size in bytes
    pub size: usize,
    /// Page-write granularity in bytes
    pub page_size: usize,
    /// How many status polls report busy after a write or erase
    pub busy_polls: u32,
}

impl Default for DummyConfig {
    fn default() -> Self {
        // 25lc256 geometry
        Self {
            size: 32 * 1024,
            page_size: 64,
            busy_polls: 2,
        }
    }
}

/// Emulated bridge adapter with one EEPROM wired to it
pub struct DummyBridge {
    config: DummyConfig,
    memory: Vec<u8>,
    addr_bytes: usize,
    powered: bool,
    cs_low: bool,
    wel: bool,
    busy: u32,
    txn: Vec<u8>,
}

impl DummyBridge {
    /// Create an emulator with the given part geometry, erased to 0xFF
    pub fn new(config: DummyConfig) -> Self {
        let memory = vec![0xFF; config.size];
        let addr_bytes = if config.size > 64 * 1024 { 3 } else { 2 };
        Self {
            config,
            memory,
            addr_bytes,
            powered: false,
            cs_low: false,
            wel: false,
            busy: 0,
            txn: Vec::new(),
        }
    }

    /// Create an emulator with default geometry (25lc256)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create an emulator with pre-filled contents
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut bridge = Self::new(config);
        let len = initial_data.len().min(bridge.memory.len());
        bridge.memory[..len].copy_from_slice(&initial_data[..len]);
        bridge
    }

    /// Get a reference to the emulated array contents
    pub fn data(&self) -> &[u8] {
        &self.memory
    }

    /// Get a mutable reference to the emulated array contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    fn txn_addr(&self) -> usize {
        self.txn[1..1 + self.addr_bytes]
            .iter()
            .fold(0usize, |acc, &b| (acc << 8) | b as usize)
    }

    /// Reply for the SPI byte that was just clocked in
    fn spi_reply(&mut self) -> u8 {
        let pos = self.txn.len() - 1;
        match self.txn[0] {
            opcodes::RDSR if pos >= 1 => {
                let mut status = 0u8;
                if self.busy > 0 {
                    status |= opcodes::SR_WIP;
                    self.busy -= 1;
                }
                if self.wel {
                    status |= opcodes::SR_WEL;
                }
                status
            }
            opcodes::READ if pos > self.addr_bytes => {
                // Sequential read wraps around the whole array.
                let offset = pos - 1 - self.addr_bytes;
                self.memory[(self.txn_addr() + offset) % self.memory.len()]
            }
            _ => 0,
        }
    }

    /// Commit the transaction delimited by the chip-select rising edge
    fn commit(&mut self) {
        match self.txn.first() {
            Some(&opcodes::WREN) => self.wel = true,
            Some(&opcodes::WRDI) => self.wel = false,
            Some(&opcodes::WRITE) if self.txn.len() > 1 + self.addr_bytes => {
                if self.wel {
                    let addr = self.txn_addr();
                    let page = self.config.page_size;
                    let page_base = addr - addr % page;
                    let data = self.txn[1 + self.addr_bytes..].to_vec();
                    log::trace!("dummy: write 0x{:06X} + {} bytes", addr, data.len());
                    // The real part wraps inside the addressed page.
                    let mem_len = self.memory.len();
                    for (i, &b) in data.iter().enumerate() {
                        let slot = page_base + (addr % page + i) % page;
                        self.memory[slot % mem_len] = b;
                    }
                    self.busy = self.config.busy_polls;
                    self.wel = false;
                }
            }
            Some(&opcodes::CE) => {
                if self.wel {
                    log::trace!("dummy: chip erase");
                    self.memory.fill(0xFF);
                    self.busy = self.config.busy_polls;
                    self.wel = false;
                }
            }
            _ => {}
        }
        self.txn.clear();
    }
}

impl BridgeTransport for DummyBridge {
    fn vendor_request(
        &mut self,
        request: u8,
        value: u16,
        index: u16,
        reply: &mut [u8],
    ) -> Result<usize> {
        let _ = index;
        match request {
            requests::POWER_UP => {
                self.powered = true;
                Ok(0)
            }
            requests::POWER_DOWN => {
                self.powered = false;
                self.cs_low = false;
                self.txn.clear();
                Ok(0)
            }
            requests::BIT_CLEAR if value == DEFAULT_CS_BIT as u16 => {
                self.cs_low = true;
                Ok(0)
            }
            requests::BIT_SET if value == DEFAULT_CS_BIT as u16 => {
                if self.cs_low && self.powered {
                    self.commit();
                }
                self.cs_low = false;
                self.txn.clear();
                Ok(0)
            }
            requests::SPI_SINGLE => {
                let out = if self.powered && self.cs_low {
                    self.txn.push(value as u8);
                    self.spi_reply()
                } else {
                    // Unpowered or deselected chip floats the bus.
                    0xFF
                };
                if reply.is_empty() {
                    return Ok(0);
                }
                reply[0] = out;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memdude_core::eeprom::{self, EepromDriver, NoProgress};
    use memdude_core::profile::ProfileCatalog;

    #[test]
    fn full_pipeline_programs_and_reads_back() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.find("25lc256").unwrap();
        let mut drv = EepromDriver::new(DummyBridge::new_default(), profile.address_width);

        drv.power_on().unwrap();
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
        eeprom::program(&mut drv, profile, 100, &data, true, &mut NoProgress).unwrap();

        let mut buf = vec![0u8; data.len()];
        eeprom::read(&mut drv, profile, 100, &mut buf, &mut NoProgress).unwrap();
        drv.power_off().unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn synthesized_erase_clears_the_array() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.find("25lc256").unwrap();
        let initial = vec![0x42u8; 32 * 1024];
        let mut drv = EepromDriver::new(
            DummyBridge::with_data(DummyConfig::default(), &initial),
            profile.address_width,
        );

        drv.power_on().unwrap();
        eeprom::erase(&mut drv, profile, &mut NoProgress).unwrap();

        let mut buf = vec![0u8; profile.total_size as usize];
        eeprom::read(&mut drv, profile, 0, &mut buf, &mut NoProgress).unwrap();
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn writes_are_ignored_while_unpowered() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.find("25lc256").unwrap();
        let mut drv = EepromDriver::new(DummyBridge::new_default(), profile.address_width)
            .with_poll_budget(8);

        // No power_on: the write goes nowhere and verify sees 0xFF.
        let err = eeprom::program(&mut drv, profile, 0, &[0x00u8; 16], true, &mut NoProgress);
        assert!(err.is_err());
    }
}
