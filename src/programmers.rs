//! Bridge backend registration and dispatch

use memdude_core::bridge::BridgeTransport;
use memdude_core::profile::DeviceProfile;
use memdude_dummy::{DummyBridge, DummyConfig};
use memdude_usbtiny::Usbtiny;

/// Information about a bridge backend
pub struct ProgrammerInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends
pub fn available_programmers() -> Vec<ProgrammerInfo> {
    vec![
        ProgrammerInfo {
            name: "usbtiny",
            description: "USBtinyISP bridge adapter (VID:1781 PID:0C9F)",
        },
        ProgrammerInfo {
            name: "dummy",
            description: "In-memory EEPROM emulator for testing",
        },
    ]
}

/// Generate a short list of backend names for CLI help
pub fn programmer_names_short() -> String {
    let names: Vec<&str> = available_programmers().iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Open a bridge backend by name
///
/// The profile is only needed by the emulator, which sizes its array to
/// match the part the session claims to target.
pub fn open_bridge(
    name: &str,
    profile: &DeviceProfile,
) -> Result<Box<dyn BridgeTransport + Send>, Box<dyn std::error::Error>> {
    match name {
        "usbtiny" => Ok(Box::new(Usbtiny::open()?)),
        "dummy" => Ok(Box::new(DummyBridge::new(DummyConfig {
            size: profile.total_size as usize,
            page_size: profile.page_size as usize,
            ..DummyConfig::default()
        }))),
        other => Err(format!(
            "unknown programmer '{}' (available: {})",
            other,
            programmer_names_short()
        )
        .into()),
    }
}
