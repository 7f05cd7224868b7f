//! Command implementations

pub mod erase;
pub mod read;
pub mod write;

use indicatif::{ProgressBar, ProgressStyle};
use memdude_core::bridge::BridgeTransport;
use memdude_core::eeprom::{EepromDriver, Progress};
use memdude_core::profile::{DeviceProfile, ProfileCatalog};

/// A powered driver session against one part
///
/// Powers the bridge on when opened and back off when dropped, so the
/// device is never left powered on any exit path - early returns, `?`
/// propagation and panics included.
pub struct Session {
    drv: EepromDriver<Box<dyn BridgeTransport + Send>>,
}

impl Session {
    /// Open the named backend and power the chip up
    pub fn open(
        programmer: &str,
        profile: &DeviceProfile,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = crate::programmers::open_bridge(programmer, profile)?;
        let mut drv = EepromDriver::new(transport, profile.address_width);
        if let Err(e) = drv.power_on() {
            let _ = drv.power_off();
            return Err(e.into());
        }
        Ok(Self { drv })
    }

    /// The driver for this session
    pub fn driver(&mut self) -> &mut EepromDriver<Box<dyn BridgeTransport + Send>> {
        &mut self.drv
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Err(e) = self.drv.power_off() {
            log::warn!("failed to power off the bridge: {}", e);
        }
    }
}

/// Print the device catalog
pub fn list_devices(catalog: &ProfileCatalog) {
    println!("Supported devices:");
    for profile in catalog.iter() {
        let erase = if profile.chip_erase {
            "chip erase"
        } else {
            "0xFF-fill erase"
        };
        println!(
            "  {:10} {:7} bytes, {:3}-byte pages, {}-byte address, {}",
            profile.name,
            profile.total_size,
            profile.page_size,
            profile.address_width.bytes(),
            erase
        );
    }
}

/// Progress reporter using indicatif progress bars
pub(crate) struct ProgressBars {
    current: Option<ProgressBar>,
}

impl ProgressBars {
    pub(crate) fn new() -> Self {
        Self { current: None }
    }

    fn create_bar(&mut self, total: u64, phase: &str) {
        self.finish();
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{bytes}}/{{total_bytes}} ({{bytes_per_sec}}, {{eta}}) {}",
                    phase
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.current = Some(pb);
    }

    fn set_position(&self, pos: u64) {
        if let Some(pb) = &self.current {
            pb.set_position(pos);
        }
    }

    fn finish(&mut self) {
        if let Some(pb) = self.current.take() {
            pb.finish();
        }
    }
}

impl Progress for ProgressBars {
    fn writing(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Writing");
    }

    fn write_progress(&mut self, bytes_written: usize) {
        self.set_position(bytes_written as u64);
    }

    fn verifying(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Verifying");
    }

    fn verify_progress(&mut self, bytes_verified: usize) {
        self.set_position(bytes_verified as u64);
    }

    fn reading(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Reading");
    }

    fn read_progress(&mut self, bytes_read: usize) {
        self.set_position(bytes_read as u64);
    }

    fn erasing(&mut self, total_bytes: usize) {
        self.create_bar(total_bytes as u64, "Erasing");
    }

    fn erase_progress(&mut self, bytes_erased: usize) {
        self.set_position(bytes_erased as u64);
    }

    fn complete(&mut self) {
        self.finish();
    }
}
