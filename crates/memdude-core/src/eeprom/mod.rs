//! 25-series EEPROM driver and programming operations

pub mod address;
pub mod driver;
pub mod opcodes;
#[cfg(feature = "alloc")]
pub mod ops;

pub use address::AddressWidth;
pub use driver::EepromDriver;
#[cfg(feature = "alloc")]
pub use ops::{erase, page_chunks, program, read, NoProgress, Progress};
