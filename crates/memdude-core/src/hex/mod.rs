//! Intel-HEX decoder
//!
//! Decodes the line-oriented, checksum-framed record format into
//! address/payload chunks for the programming pipeline. One decoder
//! instance covers one pass over a file: the extended-address base
//! accumulates across records and an end-of-file record finishes the
//! pass, after which remaining lines are ignored.
//!
//! Record layout after the leading `:`, as hex digit pairs:
//! `count, offset_hi, offset_lo, type, payload[count], checksum`.

use alloc::vec::Vec;
use core::fmt;

/// Errors for malformed HEX input
///
/// All of these are fatal for the file being decoded; the session layer
/// attaches the offending line number when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HexError {
    /// Line does not begin with `:`
    MissingStartCode,
    /// A character outside `[0-9A-Fa-f]` in the record body
    InvalidHexDigit(char),
    /// The record body has an odd number of hex digits
    OddDigitCount,
    /// Fewer bytes than the header and declared payload require
    TruncatedRecord {
        /// Bytes the record declares
        needed: usize,
        /// Bytes actually present
        got: usize,
    },
    /// Stored checksum does not match the computed one
    ChecksumMismatch {
        /// Checksum byte stored in the record
        stored: u8,
        /// Checksum computed over the record
        computed: u8,
    },
    /// An address-extension record with a payload that is not 2 bytes
    BadExtensionLength {
        /// The record type (2 or 4)
        record_type: u8,
        /// The payload length found
        length: usize,
    },
    /// A record type outside the defined 0..=5 range
    UnknownRecordType(u8),
    /// A data record reaching beyond the target memory size
    ExceedsMemory {
        /// Absolute address of the record
        address: u32,
        /// Payload length
        length: usize,
    },
}

impl fmt::Display for HexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingStartCode => write!(f, "line does not begin with ':'"),
            Self::InvalidHexDigit(c) => write!(f, "invalid hex digit {:?}", c),
            Self::OddDigitCount => write!(f, "odd number of hex digits"),
            Self::TruncatedRecord { needed, got } => {
                write!(f, "truncated record: {} bytes declared, {} present", needed, got)
            }
            Self::ChecksumMismatch { stored, computed } => {
                write!(f, "invalid checksum {:02X} != {:02X}", stored, computed)
            }
            Self::BadExtensionLength { record_type, length } => {
                write!(
                    f,
                    "type {} address record must carry 2 bytes, found {}",
                    record_type, length
                )
            }
            Self::UnknownRecordType(t) => write!(f, "unknown record type {}", t),
            Self::ExceedsMemory { address, length } => {
                write!(
                    f,
                    "data at 0x{:08X} + {} bytes exceeds memory size",
                    address, length
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HexError {}

/// One decoded data record: absolute start address plus payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteChunk {
    /// Absolute device address of the first payload byte
    pub address: u32,
    /// Payload bytes
    pub data: Vec<u8>,
}

/// Intel-HEX record checksum: two's complement of the 8-bit byte sum
pub fn checksum(bytes: &[u8]) -> u8 {
    let sum = bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    (!sum).wrapping_add(1)
}

/// Stateful decoder for one pass over a HEX file
pub struct HexDecoder {
    base: u32,
    memory_size: u32,
    finished: bool,
}

impl HexDecoder {
    /// Create a decoder targeting a part of `memory_size` bytes
    pub fn new(memory_size: u32) -> Self {
        Self {
            base: 0,
            memory_size,
            finished: false,
        }
    }

    /// Whether an end-of-file record has been seen
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Decode one input line
    ///
    /// Returns `Ok(Some(chunk))` for a data record, `Ok(None)` for
    /// control records and for anything after end-of-file. Trailing
    /// line-ending characters are tolerated; everything else is strict.
    pub fn decode_line(&mut self, line: &str) -> Result<Option<ByteChunk>, HexError> {
        if self.finished {
            return Ok(None);
        }

        let body = line
            .trim_end_matches(['\r', '\n'])
            .strip_prefix(':')
            .ok_or(HexError::MissingStartCode)?;
        let bytes = decode_hex(body)?;

        if bytes.len() < 5 {
            return Err(HexError::TruncatedRecord {
                needed: 5,
                got: bytes.len(),
            });
        }
        let count = bytes[0] as usize;
        if bytes.len() < count + 5 {
            return Err(HexError::TruncatedRecord {
                needed: count + 5,
                got: bytes.len(),
            });
        }

        let offset = u16::from_be_bytes([bytes[1], bytes[2]]);
        let record_type = bytes[3];
        let payload = &bytes[4..4 + count];
        let stored = bytes[4 + count];
        let computed = checksum(&bytes[..4 + count]);
        if stored != computed {
            return Err(HexError::ChecksumMismatch { stored, computed });
        }

        match record_type {
            0 => {
                let address = self.base as u64 + offset as u64;
                if address + count as u64 > self.memory_size as u64 {
                    // Records are written whole; a record that only
                    // partially fits is rejected rather than clipped.
                    return Err(HexError::ExceedsMemory {
                        address: address.min(u32::MAX as u64) as u32,
                        length: count,
                    });
                }
                Ok(Some(ByteChunk {
                    address: address as u32,
                    data: payload.to_vec(),
                }))
            }
            1 => {
                self.finished = true;
                Ok(None)
            }
            2 => {
                self.base = extension_value(record_type, payload)? << 4;
                Ok(None)
            }
            // Start segment address (CS:IP), consumed without effect.
            3 => Ok(None),
            4 => {
                self.base = extension_value(record_type, payload)? << 16;
                Ok(None)
            }
            // Start linear address (EIP), also ignored.
            5 => Ok(None),
            other => Err(HexError::UnknownRecordType(other)),
        }
    }
}

fn extension_value(record_type: u8, payload: &[u8]) -> Result<u32, HexError> {
    if payload.len() != 2 {
        return Err(HexError::BadExtensionLength {
            record_type,
            length: payload.len(),
        });
    }
    Ok(((payload[0] as u32) << 8) | payload[1] as u32)
}

fn decode_hex(s: &str) -> Result<Vec<u8>, HexError> {
    if let Some(bad) = s.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(HexError::InvalidHexDigit(bad));
    }
    if s.len() % 2 != 0 {
        return Err(HexError::OddDigitCount);
    }
    s.as_bytes().chunks(2).map(|pair| {
        let hi = hex_val(pair[0])?;
        let lo = hex_val(pair[1])?;
        Ok((hi << 4) | lo)
    }).collect()
}

fn hex_val(c: u8) -> Result<u8, HexError> {
    (c as char)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or(HexError::InvalidHexDigit(c as char))
}
