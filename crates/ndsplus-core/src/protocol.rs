//! NDS Adapter+ command frames and protocol constants
//!
//! The adapter understands a single outbound frame shape: 10 bytes, opcode
//! first, a fixed 0xA5 tag second, a little-endian 32-bit address at bytes
//! 2-5, a mode byte at 6 and the chip offset at 7. Responses are fixed-size
//! buffers whose length depends on the command (8 for status, 4 for the
//! handshake reply, 512 for header/save reads).
//!
//! Everything in this module is a pure byte-level codec with no I/O, so the
//! exact wire encoding can be unit tested without a device.

use std::time::Duration;

/// Length of every outbound command frame.
pub const FRAME_LEN: usize = 10;

/// Fixed tag in byte 1 of every frame.
pub const FRAME_TAG: u8 = 0xA5;

/// Save data is read in 512-byte pages.
pub const READ_PAGE_LEN: usize = 512;

/// Save data is written (and erased) in 256-byte pages.
pub const WRITE_PAGE_LEN: usize = 256;

/// Length of the status response.
pub const STATUS_LEN: usize = 8;

/// Length of the (opaque) handshake reply.
pub const HANDSHAKE_REPLY_LEN: usize = 4;

/// Length of the ROM header response.
pub const HEADER_LEN: usize = 512;

// Command opcodes (byte 0 of the frame).
pub const OP_STATUS_QUERY: u8 = 0x9C;
pub const OP_HANDSHAKE_FIRST: u8 = 0x9F;
pub const OP_HANDSHAKE_SECOND: u8 = 0x90;
pub const OP_HEADER_REQUEST: u8 = 0x00;
pub const OP_READ_PAGE: u8 = 0x2C;
pub const OP_WRITE_PAGE: u8 = 0x7B;
/// Erase opcode for chip 0x93; every other erase-requiring chip uses 0x5E.
pub const OP_ERASE_PAGE_93: u8 = 0x5B;
pub const OP_ERASE_PAGE: u8 = 0x5E;

/// Mode byte for data commands (status query, save read/write/erase).
pub const MODE_DATA: u8 = 0x02;
/// Mode byte for handshake and header commands.
pub const MODE_HANDSHAKE: u8 = 0x00;

/// Timeout for the status/handshake/header legs.
pub const SETUP_TIMEOUT: Duration = Duration::from_millis(1000);

/// Timeout for save-data transfer legs.
pub const DATA_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Pause inserted after every transferred page. The adapter drops bulk
/// transfers when pages are streamed back to back; this delay is required
/// for stable operation, not cosmetic.
pub const INTER_CHUNK_PACING: Duration = Duration::from_millis(1);

/// Chip identifiers that need an erase command before every page write.
pub const ERASE_BEFORE_WRITE_CHIPS: [u8; 3] = [0x93, 0x53, 0xA3];

/// The two frames of the preparation handshake, sent in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStep {
    First,
    Second,
}

impl HandshakeStep {
    pub fn opcode(self) -> u8 {
        match self {
            HandshakeStep::First => OP_HANDSHAKE_FIRST,
            HandshakeStep::Second => OP_HANDSHAKE_SECOND,
        }
    }
}

/// A 10-byte command frame, as named fields rather than raw offsets.
///
/// `encode` packs the fields into the wire layout:
/// `opcode | tag | address (LE) | mode | chip_offset | 00 00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    pub opcode: u8,
    pub tag: u8,
    pub address: u32,
    pub mode: u8,
    pub chip_offset: u8,
}

impl CommandFrame {
    /// Status query: `9C A5 00 00 00 00 02 00 00 00`.
    pub fn status_query() -> Self {
        Self {
            opcode: OP_STATUS_QUERY,
            tag: FRAME_TAG,
            address: 0,
            mode: MODE_DATA,
            chip_offset: 0,
        }
    }

    /// One of the two handshake frames. The opcode is mirrored into the
    /// address low byte (wire byte 2), the only commands that do this.
    pub fn handshake(step: HandshakeStep) -> Self {
        let op = step.opcode();
        Self {
            opcode: op,
            tag: FRAME_TAG,
            address: op as u32,
            mode: MODE_HANDSHAKE,
            chip_offset: 0,
        }
    }

    /// Header request: `00 A5 00 00 00 00 00 00 00 00`.
    pub fn header_request() -> Self {
        Self {
            opcode: OP_HEADER_REQUEST,
            tag: FRAME_TAG,
            address: 0,
            mode: MODE_HANDSHAKE,
            chip_offset: 0,
        }
    }

    /// Read one 512-byte save page starting at `byte_pos`.
    ///
    /// `chip_offset` is the first status byte, echoed back as an addressing
    /// parameter in every save-data command.
    pub fn read_page(chip_offset: u8, byte_pos: u32) -> Self {
        Self {
            opcode: OP_READ_PAGE,
            tag: FRAME_TAG,
            address: byte_pos,
            mode: MODE_DATA,
            chip_offset,
        }
    }

    /// Write one 256-byte save page starting at `byte_pos`. The payload
    /// follows as a separate 256-byte bulk transfer.
    pub fn write_page(chip_offset: u8, byte_pos: u32) -> Self {
        Self {
            opcode: OP_WRITE_PAGE,
            tag: FRAME_TAG,
            address: byte_pos,
            mode: MODE_DATA,
            chip_offset,
        }
    }

    /// Erase the 256-byte page at `byte_pos`. Chip 0x93 uses its own erase
    /// opcode; the other erase-requiring chips share 0x5E.
    pub fn erase_page(chip_offset: u8, byte_pos: u32) -> Self {
        let opcode = if chip_offset == 0x93 {
            OP_ERASE_PAGE_93
        } else {
            OP_ERASE_PAGE
        };
        Self {
            opcode,
            tag: FRAME_TAG,
            address: byte_pos,
            mode: MODE_DATA,
            chip_offset,
        }
    }

    /// Pack the frame into its 10-byte wire form.
    pub fn encode(&self) -> [u8; FRAME_LEN] {
        let mut buf = [0u8; FRAME_LEN];
        buf[0] = self.opcode;
        buf[1] = self.tag;
        buf[2..6].copy_from_slice(&self.address.to_le_bytes());
        buf[6] = self.mode;
        buf[7] = self.chip_offset;
        // bytes 8-9 reserved, always zero
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_query_literal() {
        let frame = CommandFrame::status_query().encode();
        assert_eq!(frame, [0x9C, 0xA5, 0, 0, 0, 0, 0x02, 0, 0, 0]);
    }

    #[test]
    fn test_handshake_pair() {
        let first = CommandFrame::handshake(HandshakeStep::First).encode();
        let second = CommandFrame::handshake(HandshakeStep::Second).encode();
        assert_eq!(first, [0x9F, 0xA5, 0x9F, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(second, [0x90, 0xA5, 0x90, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_header_request_literal() {
        let frame = CommandFrame::header_request().encode();
        assert_eq!(frame, [0x00, 0xA5, 0, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_read_page_encoding() {
        let frame = CommandFrame::read_page(0x13, 0x0102_0304).encode();
        assert_eq!(frame[0], OP_READ_PAGE);
        assert_eq!(frame[1], FRAME_TAG);
        // address is little-endian at bytes 2-5
        assert_eq!(&frame[2..6], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(frame[6], MODE_DATA);
        assert_eq!(frame[7], 0x13);
        assert_eq!(&frame[8..], &[0, 0]);
    }

    #[test]
    fn test_write_page_encoding() {
        let frame = CommandFrame::write_page(0x01, 0x100).encode();
        assert_eq!(frame[0], OP_WRITE_PAGE);
        assert_eq!(&frame[2..6], &[0x00, 0x01, 0x00, 0x00]);
        assert_eq!(frame[7], 0x01);
    }

    #[test]
    fn test_erase_opcode_selection() {
        assert_eq!(CommandFrame::erase_page(0x93, 0).opcode, OP_ERASE_PAGE_93);
        assert_eq!(CommandFrame::erase_page(0x53, 0).opcode, OP_ERASE_PAGE);
        assert_eq!(CommandFrame::erase_page(0xA3, 0).opcode, OP_ERASE_PAGE);
    }

    #[test]
    fn test_erase_layout_matches_write() {
        let erase = CommandFrame::erase_page(0x53, 0x200).encode();
        let write = CommandFrame::write_page(0x53, 0x200).encode();
        assert_eq!(&erase[1..], &write[1..]);
    }
}
