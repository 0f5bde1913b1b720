//! Save-chip geometry inference
//!
//! Maps the status byte pattern to a chip kind and save size. Coverage is
//! reverse-engineered from observed cartridges, not a validated list, so an
//! unrecognized pattern is an error rather than a guess.

use std::fmt;

use crate::error::{Error, Result};
use crate::protocol::ERASE_BEFORE_WRITE_CHIPS;
use crate::response::StatusResponse;

// Known EEPROM chip identifiers and their fixed sizes.
const CHIP_EEPROM_SMALL: u8 = 0x01;
const CHIP_EEPROM_MEDIUM: u8 = 0x02;
const CHIP_EEPROM_LARGE: u8 = 0x12;

const EEPROM_SMALL_BYTES: u64 = 512;
const EEPROM_MEDIUM_BYTES: u64 = 8192;
const EEPROM_LARGE_BYTES: u64 = 65536;

/// Kind of save chip behind the cartridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    EepromSmall,
    EepromMedium,
    EepromLarge,
    Flash,
}

impl fmt::Display for SaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveKind::EepromSmall => write!(f, "EEPROM (4 kbit)"),
            SaveKind::EepromMedium => write!(f, "EEPROM (64 kbit)"),
            SaveKind::EepromLarge => write!(f, "EEPROM (512 kbit)"),
            SaveKind::Flash => write!(f, "flash"),
        }
    }
}

/// Resolved save geometry for the inserted cartridge.
///
/// Computed once per session from the status response and reused for every
/// transfer in that run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveGeometry {
    pub kind: SaveKind,
    pub size_bytes: u64,
    pub requires_erase_before_write: bool,
}

/// Resolve the save geometry from a status response.
///
/// A non-zero `override_size` replaces the detected size, letting an
/// operator correct a misdetection without touching kind or erase policy.
pub fn resolve(status: &StatusResponse, override_size: Option<u32>) -> Result<SaveGeometry> {
    if status.cartridge_missing() {
        return Err(Error::NoCartridge);
    }

    // Exponents between the largest plausible flash size and the 0xFF fill
    // pattern have never been observed on working hardware.
    if status.size_exponent > 0x20 && status.size_exponent < 0xFF {
        return Err(Error::UnsupportedChip {
            chip_id: status.chip_id,
            size_exponent: status.size_exponent,
        });
    }

    let (kind, size_bytes) = match status.chip_id {
        CHIP_EEPROM_SMALL => (SaveKind::EepromSmall, EEPROM_SMALL_BYTES),
        CHIP_EEPROM_MEDIUM => (SaveKind::EepromMedium, EEPROM_MEDIUM_BYTES),
        CHIP_EEPROM_LARGE => (SaveKind::EepromLarge, EEPROM_LARGE_BYTES),
        _ => (SaveKind::Flash, 1u64 << status.size_exponent),
    };

    let mut geometry = SaveGeometry {
        kind,
        size_bytes,
        requires_erase_before_write: ERASE_BEFORE_WRITE_CHIPS.contains(&status.chip_id),
    };

    match override_size {
        Some(size) if size != 0 => {
            log::info!(
                "Overriding detected save size {} with {} bytes",
                geometry.size_bytes,
                size
            );
            geometry.size_bytes = u64::from(size);
        }
        _ => {}
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::STATUS_LEN;

    fn status(chip_id: u8, size_exponent: u8) -> StatusResponse {
        let mut raw = [0u8; STATUS_LEN];
        raw[0] = chip_id;
        raw[4] = size_exponent;
        raw[5] = 0xAA;
        StatusResponse::decode(&raw)
    }

    #[test]
    fn test_eeprom_sizes() {
        let cases = [
            (0x01, SaveKind::EepromSmall, 512),
            (0x02, SaveKind::EepromMedium, 8192),
            (0x12, SaveKind::EepromLarge, 65536),
        ];
        for (chip_id, kind, size) in cases {
            let geom = resolve(&status(chip_id, 0x11), None).unwrap();
            assert_eq!(geom.kind, kind);
            assert_eq!(geom.size_bytes, size);
            assert!(!geom.requires_erase_before_write);
        }
    }

    #[test]
    fn test_flash_size_from_exponent() {
        for exp in [0x09, 0x11, 0x13, 0x20] {
            let geom = resolve(&status(0x23, exp), None).unwrap();
            assert_eq!(geom.kind, SaveKind::Flash);
            assert_eq!(geom.size_bytes, 1u64 << exp);
        }
    }

    #[test]
    fn test_unrecognized_exponent_rejected() {
        for exp in [0x21, 0x80, 0xFE] {
            match resolve(&status(0x23, exp), None) {
                Err(Error::UnsupportedChip { size_exponent, .. }) => {
                    assert_eq!(size_exponent, exp)
                }
                other => panic!("expected UnsupportedChip, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_erase_policy_set() {
        for chip_id in [0x93, 0x53, 0xA3] {
            let geom = resolve(&status(chip_id, 0x11), None).unwrap();
            assert!(geom.requires_erase_before_write);
        }
        for chip_id in [0x01, 0x02, 0x12, 0x13, 0x23] {
            let geom = resolve(&status(chip_id, 0x11), None).unwrap();
            assert!(!geom.requires_erase_before_write);
        }
    }

    #[test]
    fn test_override_replaces_size_only() {
        let geom = resolve(&status(0x93, 0x11), Some(4096)).unwrap();
        assert_eq!(geom.size_bytes, 4096);
        assert_eq!(geom.kind, SaveKind::Flash);
        assert!(geom.requires_erase_before_write);

        // a zero override is ignored
        let geom = resolve(&status(0x93, 0x11), Some(0)).unwrap();
        assert_eq!(geom.size_bytes, 1 << 0x11);
    }

    #[test]
    fn test_no_cartridge_checked_first() {
        let raw = [0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xAA, 0x30];
        let status = StatusResponse::decode(&raw);
        // the sentinel wins before any chip dispatch happens
        match resolve(&status, None) {
            Err(Error::NoCartridge) => {}
            other => panic!("expected NoCartridge, got {:?}", other),
        }
    }
}
