//! Profile catalog with built-in parts and RON overlay files
//!
//! The built-in catalog covers the 25LC family the original adapter
//! wiring targets. Additional or corrected parts can be supplied as RON
//! files, validated at load time.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use std::fs;
use std::io;
use std::path::Path;

use super::DeviceProfile;
use crate::eeprom::address::AddressWidth;

/// Error type for profile catalog operations
#[derive(Debug)]
pub enum CatalogError {
    /// I/O error reading a profile file
    Io(io::Error),
    /// RON parsing error
    Parse(ron::error::SpannedError),
    /// Validation error
    Validation(String),
}

impl From<io::Error> for CatalogError {
    fn from(e: io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<ron::error::SpannedError> for CatalogError {
    fn from(e: ron::error::SpannedError) -> Self {
        CatalogError::Parse(e)
    }
}

impl core::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "I/O error: {}", e),
            CatalogError::Parse(e) => write!(f, "Parse error: {}", e),
            CatalogError::Validation(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}

// ============================================================================
// RON deserialization types (intermediate format)
// ============================================================================

/// Size specification with human-readable units (for RON parsing)
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub enum Size {
    /// Size in bytes
    B(u32),
    /// Size in kibibytes (1024 bytes)
    KiB(u32),
}

impl Size {
    /// Convert to bytes
    pub fn to_bytes(self) -> u32 {
        match self {
            Size::B(n) => n,
            Size::KiB(n) => n * 1024,
        }
    }
}

/// One profile entry as it appears in a RON file
#[derive(Debug, serde::Deserialize)]
struct ProfileDef {
    name: String,
    id_byte: u8,
    size: Size,
    page_size: u32,
    address_width: u8,
    #[serde(default)]
    chip_erase: bool,
}

impl ProfileDef {
    fn validate(self) -> Result<DeviceProfile, CatalogError> {
        let total_size = self.size.to_bytes();

        if self.page_size == 0 {
            return Err(CatalogError::Validation(format!(
                "{}: page size must be nonzero",
                self.name
            )));
        }
        if !total_size.is_multiple_of(self.page_size) {
            return Err(CatalogError::Validation(format!(
                "{}: size {} is not a multiple of page size {}",
                self.name, total_size, self.page_size
            )));
        }

        let address_width = match self.address_width {
            2 => AddressWidth::TwoByte,
            3 => AddressWidth::ThreeByte,
            other => {
                return Err(CatalogError::Validation(format!(
                    "{}: address width must be 2 or 3 bytes, got {}",
                    self.name, other
                )));
            }
        };
        if total_size > address_width.max_size() {
            return Err(CatalogError::Validation(format!(
                "{}: {} bytes cannot be addressed with {} address bytes",
                self.name,
                total_size,
                address_width.bytes()
            )));
        }

        Ok(DeviceProfile {
            name: self.name,
            id_byte: self.id_byte,
            total_size,
            page_size: self.page_size,
            address_width,
            chip_erase: self.chip_erase,
        })
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Lookup table of device profiles, keyed by part name
#[derive(Debug, Default)]
pub struct ProfileCatalog {
    profiles: Vec<DeviceProfile>,
}

impl ProfileCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog: the eleven 25LC parts
    ///
    /// Only the two largest parts implement the chip erase command.
    pub fn builtin() -> Self {
        fn p(
            name: &str,
            id_byte: u8,
            total_size: u32,
            page_size: u32,
            chip_erase: bool,
            address_width: AddressWidth,
        ) -> DeviceProfile {
            DeviceProfile {
                name: name.to_string(),
                id_byte,
                total_size,
                page_size,
                address_width,
                chip_erase,
            }
        }

        use AddressWidth::{ThreeByte, TwoByte};
        let mut catalog = Self::new();
        catalog.profiles = alloc::vec![
            p("25lc1024", 0x29, 128 * 1024, 256, true, ThreeByte),
            p("25lc512", 0x29, 64 * 1024, 256, true, TwoByte),
            p("25lc256", 0xFF, 32 * 1024, 64, false, TwoByte),
            p("25lc128", 0xFF, 16 * 1024, 64, false, TwoByte),
            p("25lc640", 0xFF, 8 * 1024, 32, false, TwoByte),
            p("25lc320", 0xFF, 4 * 1024, 32, false, TwoByte),
            p("25lc160", 0xFF, 2 * 1024, 16, false, TwoByte),
            p("25lc080", 0xFF, 1024, 16, false, TwoByte),
            p("25lc040", 0xFF, 512, 16, false, TwoByte),
            p("25lc020", 0xFF, 256, 16, false, TwoByte),
            p("25lc010", 0xFF, 128, 16, false, TwoByte),
        ];
        catalog
    }

    /// Add a profile, replacing any existing entry with the same name
    pub fn add(&mut self, profile: DeviceProfile) {
        if let Some(existing) = self
            .profiles
            .iter_mut()
            .find(|p| p.name.eq_ignore_ascii_case(&profile.name))
        {
            *existing = profile;
        } else {
            self.profiles.push(profile);
        }
    }

    /// Parse profiles from RON text and add them to the catalog
    ///
    /// Returns the number of profiles added.
    pub fn load_str(&mut self, text: &str) -> Result<usize, CatalogError> {
        let defs: Vec<ProfileDef> = ron::from_str(text)?;
        let count = defs.len();
        for def in defs {
            self.add(def.validate()?);
        }
        Ok(count)
    }

    /// Load profiles from a RON file and add them to the catalog
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, CatalogError> {
        let text = fs::read_to_string(path.as_ref())?;
        let count = self.load_str(&text)?;
        log::debug!(
            "loaded {} profile(s) from {}",
            count,
            path.as_ref().display()
        );
        Ok(count)
    }

    /// Look up a profile by name, case-insensitively
    pub fn find(&self, name: &str) -> Option<&DeviceProfile> {
        self.profiles
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Iterate over all profiles
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.profiles.iter()
    }

    /// Number of profiles in the catalog
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_complete_and_consistent() {
        let catalog = ProfileCatalog::builtin();
        assert_eq!(catalog.len(), 11);

        for profile in catalog.iter() {
            assert!(profile.page_size > 0);
            assert_eq!(profile.total_size % profile.page_size, 0, "{}", profile.name);
            assert!(profile.total_size <= profile.address_width.max_size());
        }

        // Only the two largest parts support chip erase.
        let erasable: Vec<_> = catalog
            .iter()
            .filter(|p| p.chip_erase)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(erasable, ["25lc1024", "25lc512"]);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let catalog = ProfileCatalog::builtin();
        let profile = catalog.find("25LC640").expect("known part");
        assert_eq!(profile.total_size, 8 * 1024);
        assert_eq!(profile.page_size, 32);
        assert!(catalog.find("25lc999").is_none());
    }

    #[test]
    fn overlay_parses_and_replaces() {
        let mut catalog = ProfileCatalog::builtin();
        let added = catalog
            .load_str(
                r#"[
                    (name: "25aa1024", id_byte: 0x29, size: KiB(128), page_size: 256, address_width: 3, chip_erase: true),
                    (name: "25lc256", id_byte: 0xFF, size: KiB(32), page_size: 64, address_width: 2),
                ]"#,
            )
            .unwrap();
        assert_eq!(added, 2);
        // New part added, existing part replaced in place.
        assert_eq!(catalog.len(), 12);
        assert!(catalog.find("25aa1024").unwrap().chip_erase);
        assert!(!catalog.find("25lc256").unwrap().chip_erase);
    }

    #[test]
    fn validation_rejects_bad_geometry() {
        let mut catalog = ProfileCatalog::new();

        // Size not a multiple of the page size.
        let err = catalog
            .load_str(r#"[(name: "bad", id_byte: 0, size: B(100), page_size: 16, address_width: 2)]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        // Address width cannot span the array.
        let err = catalog
            .load_str(r#"[(name: "bad", id_byte: 0, size: KiB(128), page_size: 256, address_width: 2)]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        // Address width out of range.
        let err = catalog
            .load_str(r#"[(name: "bad", id_byte: 0, size: B(128), page_size: 16, address_width: 4)]"#)
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        assert!(catalog.is_empty());
    }
}
