//! Device profiles for the supported EEPROM parts
//!
//! A profile is the static description the driver and the programming
//! operations are parameterized with: array size, page-write granularity,
//! on-wire address width and whether the part implements the
//! single-command chip erase.

use alloc::string::String;

use crate::eeprom::address::AddressWidth;

#[cfg(feature = "std")]
mod catalog;

#[cfg(feature = "std")]
pub use catalog::{CatalogError, ProfileCatalog, Size};

/// Static descriptor of one EEPROM part
///
/// Immutable; looked up by name at session start and passed by reference
/// into the driver and the programming operations. `total_size` is always
/// a multiple of `page_size` (enforced when the catalog is built).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    /// Part name as used on the command line (e.g. "25lc256")
    pub name: String,
    /// Identification byte reported by the part family
    pub id_byte: u8,
    /// Total array size in bytes
    pub total_size: u32,
    /// Page-write granularity in bytes
    pub page_size: u32,
    /// On-wire address width for READ/WRITE commands
    pub address_width: AddressWidth,
    /// Whether the part implements the 0xC7 chip erase
    pub chip_erase: bool,
}

impl DeviceProfile {
    /// Check that `len` bytes starting at `addr` fit inside the array
    pub fn is_valid_range(&self, addr: u32, len: usize) -> bool {
        (addr as u64) + (len as u64) <= self.total_size as u64
    }

    /// Number of pages in the array
    pub fn page_count(&self) -> u32 {
        self.total_size / self.page_size
    }
}
