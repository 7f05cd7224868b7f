//! Read command implementation

use std::fs;
use std::path::Path;

use memdude_core::eeprom;
use memdude_core::profile::DeviceProfile;

use super::{ProgressBars, Session};

/// Run the read command
pub fn run_read(
    session: &mut Session,
    profile: &DeviceProfile,
    addr: u32,
    count: Option<u32>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let count = count.unwrap_or_else(|| profile.total_size.saturating_sub(addr));

    if !profile.is_valid_range(addr, count as usize) {
        return Err(format!(
            "Read range 0x{:08X} + {} bytes is outside the {}-byte device",
            addr, count, profile.total_size
        )
        .into());
    }

    println!(
        "Reading {} bytes from 0x{:08X} into {}",
        count,
        addr,
        output.display()
    );

    let mut buf = vec![0u8; count as usize];
    let mut progress = ProgressBars::new();
    eeprom::read(session.driver(), profile, addr, &mut buf, &mut progress)?;

    fs::write(output, &buf)?;
    println!("Wrote {} bytes to {}", buf.len(), output.display());
    Ok(())
}
