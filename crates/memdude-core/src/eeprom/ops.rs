//! High-level programming operations
//!
//! The functions here implement the memory-programming algorithm on top
//! of [`EepromDriver`]: splitting arbitrary ranges into page-safe write
//! bursts, read-back verification, chunked reads and erase (either the
//! single chip-erase command or a synthesized 0xFF fill).

use alloc::vec;

use core::ops::Range;

use crate::bridge::BridgeTransport;
use crate::eeprom::driver::EepromDriver;
use crate::error::{Error, Result};
use crate::profile::DeviceProfile;

/// The erased value for EEPROM memory
const ERASED_VALUE: u8 = 0xFF;

/// Callback for progress reporting during long operations
///
/// The CLI implements this with progress bars; library users that don't
/// care pass [`NoProgress`].
pub trait Progress {
    /// Called when a write phase starts
    fn writing(&mut self, total_bytes: usize) {
        let _ = total_bytes;
    }
    /// Called after each write burst
    fn write_progress(&mut self, bytes_written: usize) {
        let _ = bytes_written;
    }
    /// Called when a verify phase starts
    fn verifying(&mut self, total_bytes: usize) {
        let _ = total_bytes;
    }
    /// Called after each verified chunk
    fn verify_progress(&mut self, bytes_verified: usize) {
        let _ = bytes_verified;
    }
    /// Called when a read phase starts
    fn reading(&mut self, total_bytes: usize) {
        let _ = total_bytes;
    }
    /// Called after each read chunk
    fn read_progress(&mut self, bytes_read: usize) {
        let _ = bytes_read;
    }
    /// Called when an erase phase starts
    fn erasing(&mut self, total_bytes: usize) {
        let _ = total_bytes;
    }
    /// Called as the erase covers the array
    fn erase_progress(&mut self, bytes_erased: usize) {
        let _ = bytes_erased;
    }
    /// Called when the operation is complete
    fn complete(&mut self) {}
}

/// A no-op progress reporter
pub struct NoProgress;

impl Progress for NoProgress {}

/// Split a byte range into page-safe write bursts
///
/// Yields `(address, source_range)` pairs: an unaligned prefix up to the
/// next page boundary first (if any), then full pages, then the shorter
/// remainder. Concatenating the ranges reproduces the input range, and no
/// burst crosses a page boundary - the property a 25-series part needs,
/// since an in-page write wraps around inside the page rather than
/// carrying into the next one.
pub fn page_chunks(addr: u32, len: usize, page_size: usize) -> PageChunks {
    debug_assert!(page_size > 0);
    PageChunks {
        addr,
        page_size,
        consumed: 0,
        len,
    }
}

/// Iterator produced by [`page_chunks`]
pub struct PageChunks {
    addr: u32,
    page_size: usize,
    consumed: usize,
    len: usize,
}

impl Iterator for PageChunks {
    type Item = (u32, Range<usize>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.consumed >= self.len {
            return None;
        }
        let space = self.page_size - (self.addr as usize % self.page_size);
        let take = space.min(self.len - self.consumed);
        let item = (self.addr, self.consumed..self.consumed + take);
        self.addr += take as u32;
        self.consumed += take;
        Some(item)
    }
}

/// Program `data` starting at `addr`, optionally verifying by read-back
///
/// Writes are issued page by page via [`EepromDriver::write_block`]. With
/// `verify` set, every burst is read back at its original address and
/// compared byte for byte; the first mismatch aborts with
/// [`Error::Verify`]. Nothing is retried.
pub fn program<T: BridgeTransport, P: Progress>(
    drv: &mut EepromDriver<T>,
    profile: &DeviceProfile,
    addr: u32,
    data: &[u8],
    verify: bool,
    progress: &mut P,
) -> Result<()> {
    if !profile.is_valid_range(addr, data.len()) {
        return Err(Error::AddressOutOfBounds);
    }

    let page_size = profile.page_size as usize;

    progress.writing(data.len());
    let mut written = 0;
    for (chunk_addr, range) in page_chunks(addr, data.len(), page_size) {
        drv.write_block(chunk_addr, &data[range.clone()])?;
        written += range.len();
        progress.write_progress(written);
    }

    if verify {
        progress.verifying(data.len());
        let mut buf = vec![0u8; page_size];
        let mut verified = 0;
        for (chunk_addr, range) in page_chunks(addr, data.len(), page_size) {
            let expected = &data[range.clone()];
            let readback = &mut buf[..expected.len()];
            drv.read_block(chunk_addr, readback)?;
            if let Some(i) = readback
                .iter()
                .zip(expected.iter())
                .position(|(got, want)| got != want)
            {
                return Err(Error::Verify {
                    addr: chunk_addr + i as u32,
                    expected: expected[i],
                    found: readback[i],
                });
            }
            verified += expected.len();
            progress.verify_progress(verified);
        }
    }

    progress.complete();
    Ok(())
}

/// Read `buf.len()` bytes starting at `addr`
///
/// Issued in page-size chunks purely so progress reporting has a sensible
/// granularity; the part itself reads sequentially at any length.
pub fn read<T: BridgeTransport, P: Progress>(
    drv: &mut EepromDriver<T>,
    profile: &DeviceProfile,
    addr: u32,
    buf: &mut [u8],
    progress: &mut P,
) -> Result<()> {
    if !profile.is_valid_range(addr, buf.len()) {
        return Err(Error::AddressOutOfBounds);
    }

    let page_size = profile.page_size as usize;

    progress.reading(buf.len());
    let mut offset = 0;
    while offset < buf.len() {
        let chunk_len = page_size.min(buf.len() - offset);
        drv.read_block(addr + offset as u32, &mut buf[offset..offset + chunk_len])?;
        offset += chunk_len;
        progress.read_progress(offset);
    }

    progress.complete();
    Ok(())
}

/// Erase the whole array
///
/// Uses the single 0xC7 command when the part implements it; otherwise
/// the erase is synthesized by programming 0xFF pages across the array.
pub fn erase<T: BridgeTransport, P: Progress>(
    drv: &mut EepromDriver<T>,
    profile: &DeviceProfile,
    progress: &mut P,
) -> Result<()> {
    let total = profile.total_size as usize;
    progress.erasing(total);

    if profile.chip_erase {
        drv.chip_erase()?;
        progress.erase_progress(total);
    } else {
        log::debug!(
            "{}: no chip erase command, programming 0xFF pages",
            profile.name
        );
        let block = vec![ERASED_VALUE; profile.page_size as usize];
        let mut addr = 0usize;
        while addr < total {
            drv.write_block(addr as u32, &block)?;
            addr += block.len();
            progress.erase_progress(addr);
        }
    }

    progress.complete();
    Ok(())
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::bridge::requests;
    use crate::eeprom::address::AddressWidth;
    use crate::eeprom::opcodes;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;

    /// Bridge-level emulation of a 25-series part
    ///
    /// Decodes the control requests the way the adapter firmware and the
    /// chip would: chip-select edges delimit SPI transactions, WRITE
    /// wraps around inside the addressed page, READ wraps around the
    /// whole array. This makes incorrect page splitting visible as
    /// corrupted memory rather than passing silently.
    struct EmulatedPart {
        memory: Vec<u8>,
        page_size: usize,
        addr_bytes: usize,
        cs_low: bool,
        wel: bool,
        busy_polls: u32,
        txn: Vec<u8>,
        writes: Vec<(u32, usize)>,
        chip_erases: usize,
        /// Byte value substituted when reading this address (verify tests)
        corrupt_read: Option<(u32, u8)>,
    }

    impl EmulatedPart {
        fn new(size: usize, page_size: usize) -> Self {
            Self {
                memory: vec![0xFF; size],
                page_size,
                addr_bytes: 2,
                cs_low: false,
                wel: false,
                busy_polls: 0,
                txn: Vec::new(),
                writes: Vec::new(),
                chip_erases: 0,
                corrupt_read: None,
            }
        }

        fn txn_addr(&self) -> u32 {
            self.txn[1..1 + self.addr_bytes]
                .iter()
                .fold(0u32, |acc, &b| (acc << 8) | b as u32)
        }

        fn spi_reply(&mut self) -> u8 {
            let pos = self.txn.len() - 1;
            match self.txn[0] {
                opcodes::RDSR if pos >= 1 => {
                    let mut status = 0u8;
                    if self.busy_polls > 0 {
                        status |= opcodes::SR_WIP;
                        self.busy_polls -= 1;
                    }
                    if self.wel {
                        status |= opcodes::SR_WEL;
                    }
                    status
                }
                opcodes::READ if pos > self.addr_bytes => {
                    let offset = pos - 1 - self.addr_bytes;
                    let addr = (self.txn_addr() as usize + offset) % self.memory.len();
                    match self.corrupt_read {
                        Some((bad, value)) if addr as u32 == bad => value,
                        _ => self.memory[addr],
                    }
                }
                _ => 0,
            }
        }

        fn commit(&mut self) {
            match self.txn.first() {
                Some(&opcodes::WREN) => self.wel = true,
                Some(&opcodes::WRITE) if self.txn.len() > 1 + self.addr_bytes => {
                    if self.wel {
                        let addr = self.txn_addr() as usize;
                        let page_base = addr - addr % self.page_size;
                        let data = &self.txn[1 + self.addr_bytes..];
                        // In-page wraparound, as the real part behaves.
                        for (i, &b) in data.iter().enumerate() {
                            let slot = page_base + (addr % self.page_size + i) % self.page_size;
                            self.memory[slot] = b;
                        }
                        self.writes.push((addr as u32, data.len()));
                        self.busy_polls = 2;
                        self.wel = false;
                    }
                }
                Some(&opcodes::CE) => {
                    if self.wel {
                        self.memory.fill(0xFF);
                        self.chip_erases += 1;
                        self.busy_polls = 2;
                        self.wel = false;
                    }
                }
                _ => {}
            }
            self.txn.clear();
        }
    }

    impl BridgeTransport for EmulatedPart {
        fn vendor_request(
            &mut self,
            request: u8,
            value: u16,
            index: u16,
            reply: &mut [u8],
        ) -> crate::Result<usize> {
            let _ = index;
            match request {
                requests::BIT_CLEAR => {
                    self.cs_low = true;
                    Ok(0)
                }
                requests::BIT_SET => {
                    if self.cs_low {
                        self.commit();
                    }
                    self.cs_low = false;
                    Ok(0)
                }
                requests::SPI_SINGLE => {
                    if !self.cs_low {
                        return Ok(if reply.is_empty() { 0 } else { 1 });
                    }
                    self.txn.push(value as u8);
                    let out = self.spi_reply();
                    if reply.is_empty() {
                        return Ok(0);
                    }
                    reply[0] = out;
                    Ok(1)
                }
                requests::POWER_UP | requests::POWER_DOWN => Ok(0),
                _ => Err(Error::Transport),
            }
        }
    }

    fn test_profile(total_size: u32, page_size: u32, chip_erase: bool) -> DeviceProfile {
        DeviceProfile {
            name: "testpart".to_string(),
            id_byte: 0xFF,
            total_size,
            page_size,
            address_width: AddressWidth::TwoByte,
            chip_erase,
        }
    }

    fn test_driver(part: EmulatedPart) -> EepromDriver<EmulatedPart> {
        EepromDriver::new(part, AddressWidth::TwoByte)
    }

    fn part_of(drv: &EepromDriver<EmulatedPart>) -> &EmulatedPart {
        // Test-only view into the emulated part behind the driver.
        &drv.bridge.transport
    }

    // ------------------------------------------------------------------
    // page_chunks
    // ------------------------------------------------------------------

    #[test]
    fn chunks_concatenate_to_the_input_and_respect_boundaries() {
        for &(addr, len, page) in &[
            (0u32, 100usize, 16usize),
            (5, 100, 16),
            (15, 1, 16),
            (15, 2, 16),
            (31, 97, 32),
            (7, 0, 16),
        ] {
            let chunks: Vec<_> = page_chunks(addr, len, page).collect();

            let total: usize = chunks.iter().map(|(_, r)| r.len()).sum();
            assert_eq!(total, len);

            let mut expected_start = 0usize;
            for (i, (chunk_addr, range)) in chunks.iter().enumerate() {
                assert_eq!(range.start, expected_start);
                expected_start = range.end;
                if i > 0 {
                    assert_eq!(*chunk_addr as usize % page, 0);
                }
                // No burst crosses a page boundary.
                let first_page = *chunk_addr as usize / page;
                let last_page = (*chunk_addr as usize + range.len() - 1) / page;
                assert_eq!(first_page, last_page);
                assert_eq!(*chunk_addr as usize, addr as usize + range.start);
            }
        }
    }

    #[test]
    fn one_full_page_at_an_aligned_address_is_one_chunk() {
        let chunks: Vec<_> = page_chunks(64, 64, 64).collect();
        assert_eq!(chunks, [(64, 0..64)]);
    }

    #[test]
    fn unaligned_prefix_splits_off_before_full_pages() {
        // One byte before a boundary: prefix, then the rest in pages.
        let chunks: Vec<_> = page_chunks(63, 65, 64).collect();
        assert_eq!(chunks, [(63, 0..1), (64, 1..65)]);

        let chunks: Vec<_> = page_chunks(63, 66, 64).collect();
        assert_eq!(chunks, [(63, 0..1), (64, 1..65), (128, 65..66)]);
    }

    #[test]
    fn range_shorter_than_the_remaining_page_space_is_a_single_chunk() {
        let chunks: Vec<_> = page_chunks(10, 4, 64).collect();
        assert_eq!(chunks, [(10, 0..4)]);
    }

    // ------------------------------------------------------------------
    // program / read
    // ------------------------------------------------------------------

    #[test]
    fn programming_across_pages_lands_at_the_right_addresses() {
        let profile = test_profile(256, 16, false);
        let mut drv = test_driver(EmulatedPart::new(256, 16));

        // 40 bytes starting mid-page: would wrap inside the page if the
        // split were wrong.
        let data: Vec<u8> = (0u8..40).collect();
        program(&mut drv, &profile, 10, &data, true, &mut NoProgress).unwrap();

        let part = part_of(&drv);
        assert_eq!(&part.memory[10..50], &data[..]);
        assert_eq!(part.memory[9], 0xFF);
        assert_eq!(part.memory[50], 0xFF);
        // Burst lengths: 6 to the boundary, then 16+16, then 2.
        assert_eq!(part.writes, [(10, 6), (16, 16), (32, 16), (48, 2)]);
    }

    #[test]
    fn program_rejects_ranges_beyond_the_part() {
        let profile = test_profile(256, 16, false);
        let mut drv = test_driver(EmulatedPart::new(256, 16));
        assert_eq!(
            program(&mut drv, &profile, 250, &[0u8; 7], false, &mut NoProgress),
            Err(Error::AddressOutOfBounds)
        );
        assert!(part_of(&drv).writes.is_empty());
    }

    #[test]
    fn read_round_trips_what_was_programmed() {
        let profile = test_profile(256, 16, false);
        let mut drv = test_driver(EmulatedPart::new(256, 16));

        let data: Vec<u8> = (0..77).map(|i| (i * 3) as u8).collect();
        program(&mut drv, &profile, 33, &data, false, &mut NoProgress).unwrap();

        let mut buf = vec![0u8; 77];
        read(&mut drv, &profile, 33, &mut buf, &mut NoProgress).unwrap();
        assert_eq!(buf, data);
    }

    #[test]
    fn verify_mismatch_aborts_with_the_offending_address() {
        let profile = test_profile(256, 16, false);
        let mut part = EmulatedPart::new(256, 16);
        part.corrupt_read = Some((21, 0x00));
        let mut drv = test_driver(part);

        let data = [0x5Au8; 32];
        let err = program(&mut drv, &profile, 8, &data, true, &mut NoProgress).unwrap_err();
        assert_eq!(
            err,
            Error::Verify {
                addr: 21,
                expected: 0x5A,
                found: 0x00,
            }
        );
    }

    // ------------------------------------------------------------------
    // erase
    // ------------------------------------------------------------------

    #[test]
    fn erase_uses_the_chip_command_when_available() {
        let profile = test_profile(256, 16, true);
        let mut drv = test_driver(EmulatedPart::new(256, 16));
        program(&mut drv, &profile, 0, &[0u8; 64], false, &mut NoProgress).unwrap();

        erase(&mut drv, &profile, &mut NoProgress).unwrap();

        let part = part_of(&drv);
        assert_eq!(part.chip_erases, 1);
        assert!(part.memory.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn erase_is_synthesized_with_full_pages_when_unsupported() {
        let profile = test_profile(256, 16, false);
        let mut drv = test_driver(EmulatedPart::new(256, 16));
        program(&mut drv, &profile, 0, &[0u8; 256], false, &mut NoProgress).unwrap();
        let writes_before = part_of(&drv).writes.len();

        erase(&mut drv, &profile, &mut NoProgress).unwrap();

        let part = part_of(&drv);
        assert_eq!(part.chip_erases, 0);
        assert!(part.memory.iter().all(|&b| b == 0xFF));
        // One aligned page-sized write per page, never the erase opcode.
        let fill_writes = &part.writes[writes_before..];
        assert_eq!(fill_writes.len(), 16);
        assert!(fill_writes
            .iter()
            .enumerate()
            .all(|(i, &(addr, len))| addr == i as u32 * 16 && len == 16));
    }
}
