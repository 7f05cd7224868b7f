//! Erase command implementation

use memdude_core::eeprom;
use memdude_core::profile::DeviceProfile;

use super::{ProgressBars, Session};

/// Run the erase command
pub fn run_erase(
    session: &mut Session,
    profile: &DeviceProfile,
) -> Result<(), Box<dyn std::error::Error>> {
    if profile.chip_erase {
        println!("Erasing {} with the chip erase command", profile.name);
    } else {
        println!(
            "{} has no chip erase command, writing 0xFF pages",
            profile.name
        );
    }

    let mut progress = ProgressBars::new();
    eeprom::erase(session.driver(), profile, &mut progress)?;

    println!("Erased {} bytes", profile.total_size);
    Ok(())
}
