//! Write command implementation

use std::fs;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use memdude_core::eeprom::{self, NoProgress};
use memdude_core::hex::HexDecoder;
use memdude_core::profile::DeviceProfile;

use super::{ProgressBars, Session};
use crate::cli::ImageFormat;

/// Run the write command
pub fn run_write(
    session: &mut Session,
    profile: &DeviceProfile,
    input: &Path,
    format: Option<ImageFormat>,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = format.unwrap_or_else(|| detect_format(input));

    println!(
        "Programming {} ({} bytes, {}-byte pages)",
        profile.name, profile.total_size, profile.page_size
    );

    match format {
        ImageFormat::Hex => write_hex(session, profile, input, verify),
        ImageFormat::Bin => write_binary(session, profile, input, verify),
    }
}

/// Default the image format by file extension
fn detect_format(input: &Path) -> ImageFormat {
    match input.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("hex") => ImageFormat::Hex,
        _ => ImageFormat::Bin,
    }
}

/// Program from Intel-HEX records
///
/// Records are programmed as they decode; a sparse image only touches
/// the pages its records cover. The progress spinner tracks the last
/// address written.
fn write_hex(
    session: &mut Session,
    profile: &DeviceProfile,
    input: &Path,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let mut decoder = HexDecoder::new(profile.total_size);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let mut total = 0usize;
    for (lineno, line) in text.lines().enumerate() {
        if decoder.is_finished() {
            break;
        }
        let chunk = decoder
            .decode_line(line)
            .map_err(|e| format!("{}:{}: {}", input.display(), lineno + 1, e))?;
        if let Some(chunk) = chunk {
            eeprom::program(
                session.driver(),
                profile,
                chunk.address,
                &chunk.data,
                verify,
                &mut NoProgress,
            )?;
            total += chunk.data.len();
            pb.set_message(format!("0x{:08X}", chunk.address + chunk.data.len() as u32));
        }
    }

    if !decoder.is_finished() {
        log::warn!("{}: no end-of-file record", input.display());
    }

    pb.finish_with_message(format!("Programmed {} bytes", total));
    if verify {
        println!("Verification passed");
    }
    Ok(())
}

/// Program a flat binary image starting at address 0
fn write_binary(
    session: &mut Session,
    profile: &DeviceProfile,
    input: &Path,
    verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;

    if data.len() > profile.total_size as usize {
        return Err(format!(
            "File size ({} bytes) exceeds device size ({} bytes)",
            data.len(),
            profile.total_size
        )
        .into());
    }

    println!("Read {} bytes from {}", data.len(), input.display());

    let mut progress = ProgressBars::new();
    eeprom::program(session.driver(), profile, 0, &data, verify, &mut progress)?;

    println!("Programmed {} bytes", data.len());
    if verify {
        println!("Verification passed");
    }
    Ok(())
}
