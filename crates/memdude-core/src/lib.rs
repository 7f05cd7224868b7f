//! memdude-core - Core library for SPI EEPROM programming
//!
//! This crate provides the bridge-command protocol, the 25-series EEPROM
//! driver and the page-aware programming algorithms used by the `memdude`
//! programmer. It is designed to be `no_std` compatible so the protocol
//! layer can also be reused in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc` and the
//!   RON profile catalog)
//! - `alloc` - Enable heap allocation for the HEX decoder and the
//!   programming operations
//!
//! # Example
//!
//! ```ignore
//! use memdude_core::bridge::BridgeTransport;
//! use memdude_core::eeprom::EepromDriver;
//! use memdude_core::profile::ProfileCatalog;
//!
//! fn erase_chip<T: BridgeTransport>(transport: T) -> memdude_core::Result<()> {
//!     let catalog = ProfileCatalog::builtin();
//!     let profile = catalog.find("25lc1024").unwrap();
//!     let mut drv = EepromDriver::new(transport, profile.address_width);
//!     drv.power_on()?;
//!     let result = memdude_core::eeprom::erase(&mut drv, profile, &mut memdude_core::eeprom::NoProgress);
//!     drv.power_off()?;
//!     result
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bridge;
pub mod eeprom;
pub mod error;
#[cfg(feature = "alloc")]
pub mod hex;
#[cfg(feature = "alloc")]
pub mod profile;

pub use error::{Error, Result};
