//! Decoded adapter responses
//!
//! Both response types are fixed-width reinterpretations of the raw buffers,
//! with the two sentinel patterns ("no cartridge", "unreadable header")
//! surfaced as explicit accessors instead of magic-byte comparisons at the
//! call sites.

use crate::protocol::{HEADER_LEN, STATUS_LEN};

/// Decoded 8-byte status response.
///
/// Observed layout (the middle bytes differ per game and are undecoded):
///
/// ```text
/// chip_id | flags | unknown[2] | size_exponent | marker | firmware (LE u16)
/// ```
///
/// `chip_id` doubles as the chip offset echoed into every save-data frame.
/// For flash chips the save size is `1 << size_exponent` bytes. `marker` is
/// expected to be 0xAA but the adapter is not strict about it, so neither
/// are we.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusResponse {
    pub chip_id: u8,
    pub flags: u8,
    pub unknown: [u8; 2],
    pub size_exponent: u8,
    pub marker: u8,
    pub firmware_version: u16,
    raw: [u8; STATUS_LEN],
}

impl StatusResponse {
    pub fn decode(raw: &[u8; STATUS_LEN]) -> Self {
        Self {
            chip_id: raw[0],
            flags: raw[1],
            unknown: [raw[2], raw[3]],
            size_exponent: raw[4],
            marker: raw[5],
            firmware_version: u16::from_le_bytes([raw[6], raw[7]]),
            raw: *raw,
        }
    }

    /// The `FF FF` sentinel in the first two bytes means no cartridge is
    /// inserted. It is a terminal result, not a chip identifier.
    pub fn cartridge_missing(&self) -> bool {
        self.chip_id == 0xFF && self.flags == 0xFF
    }

    /// Bit 0 of the flags byte signals EEPROM-busy.
    pub fn eeprom_busy(&self) -> bool {
        self.flags & 0x01 != 0
    }

    /// The raw response bytes, for diagnostic dumps.
    pub fn bytes(&self) -> &[u8; STATUS_LEN] {
        &self.raw
    }
}

/// The first 512 bytes of the cartridge ROM.
///
/// Contains the beginning of the NDS header: title, cartridge id and the
/// ROM-size exponent. A leading 0xFF marks the whole header unreadable,
/// which the accessors model as `None`.
#[derive(Clone)]
pub struct HeaderResponse {
    raw: [u8; HEADER_LEN],
}

impl HeaderResponse {
    pub fn decode(raw: [u8; HEADER_LEN]) -> Self {
        Self { raw }
    }

    pub fn is_unreadable(&self) -> bool {
        self.raw[0] == 0xFF
    }

    /// Game title, bytes 0-11, ASCII and not necessarily NUL-terminated.
    pub fn title(&self) -> Option<String> {
        if self.is_unreadable() {
            return None;
        }
        let title = self.raw[..12]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        Some(title)
    }

    /// Four-character cartridge identifier at bytes 12-15.
    pub fn card_id(&self) -> Option<String> {
        if self.is_unreadable() {
            return None;
        }
        let id = self.raw[12..16]
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        Some(id)
    }

    /// ROM-size exponent at offset 0x14.
    pub fn rom_size_exponent(&self) -> Option<u8> {
        if self.is_unreadable() {
            None
        } else {
            Some(self.raw[0x14])
        }
    }

    /// ROM size in MiB, as the vendor tool renders it.
    pub fn rom_size_mib(&self) -> Option<u32> {
        self.rom_size_exponent()
            .map(|exp| 2u32 << u32::from(exp).saturating_sub(4))
    }

    /// The raw header bytes, for diagnostic dumps.
    pub fn bytes(&self) -> &[u8; HEADER_LEN] {
        &self.raw
    }
}

impl std::fmt::Debug for HeaderResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderResponse")
            .field("title", &self.title())
            .field("card_id", &self.card_id())
            .field("rom_size_exponent", &self.rom_size_exponent())
            .finish()
    }
}
