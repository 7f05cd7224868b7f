//! 25-series SPI EEPROM opcodes
//!
//! This module defines the SPI instruction set shared by the 25LCxxx /
//! 25AAxxx EEPROM families.

// ============================================================================
// Write control
// ============================================================================

/// Write Enable - required before any write or erase operation
pub const WREN: u8 = 0x06;
/// Write Disable - clears the write enable latch
pub const WRDI: u8 = 0x04;

// ============================================================================
// Status register operations
// ============================================================================

/// Read Status Register
pub const RDSR: u8 = 0x05;
/// Write Status Register
pub const WRSR: u8 = 0x01;

// ============================================================================
// Array access
// ============================================================================

/// Read data, sequential across the whole array
pub const READ: u8 = 0x03;
/// Page program - writes must stay inside one page
pub const WRITE: u8 = 0x02;

// ============================================================================
// Erase (largest parts only)
// ============================================================================

/// Chip Erase - only the 512K/1M parts implement this
pub const CE: u8 = 0xC7;
/// Page Erase
pub const PE: u8 = 0x42;
/// Sector Erase
pub const SE: u8 = 0xD8;

// ============================================================================
// Status register bit definitions
// ============================================================================

/// Status register: Write In Progress
pub const SR_WIP: u8 = 0x01;
/// Status register: Write Enable Latch
pub const SR_WEL: u8 = 0x02;
/// Status register: Block Protect bit 0
pub const SR_BP0: u8 = 0x04;
/// Status register: Block Protect bit 1
pub const SR_BP1: u8 = 0x08;
/// Status register: Write Protect Enable
pub const SR_WPEN: u8 = 0x80;
