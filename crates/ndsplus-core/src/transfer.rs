//! Chunked save-data transfers
//!
//! Backup reads in 512-byte pages, wipe and restore write in 256-byte pages.
//! Every page is followed by the fixed pacing delay; the adapter becomes
//! unstable when pages are streamed without it. All three operations abort
//! on the first failure with no retry and no resume, leaving whatever the
//! last completed page wrote.

use std::io::{Read, Write};
use std::thread;

use crate::error::{Error, Result, Stage};
use crate::geometry::SaveGeometry;
use crate::protocol::{
    CommandFrame, DATA_TIMEOUT, INTER_CHUNK_PACING, READ_PAGE_LEN, WRITE_PAGE_LEN,
};
use crate::response::StatusResponse;
use crate::session::AdapterSession;
use crate::transport::Transport;

/// Progress callback: `(bytes_done, bytes_total)`, monotonically
/// non-decreasing. Advisory output only, never a resumption checkpoint.
pub type Progress<'p> = &'p mut dyn FnMut(u64, u64);

/// Save-data transfer driver for a prepared session.
///
/// Carries the geometry resolved at session start and the status chip id,
/// which every save-data frame echoes back as its chip offset.
pub struct TransferEngine<'a, T: Transport> {
    session: &'a mut AdapterSession<T>,
    geometry: SaveGeometry,
    chip_offset: u8,
}

impl<'a, T: Transport> TransferEngine<'a, T> {
    /// Attach to a session that has completed its setup sequence.
    pub fn new(
        session: &'a mut AdapterSession<T>,
        status: &StatusResponse,
        geometry: SaveGeometry,
    ) -> Result<Self> {
        session.begin_transfers()?;
        Ok(Self {
            session,
            geometry,
            chip_offset: status.chip_id,
        })
    }

    /// Back up the save data into `sink`, one 512-byte page at a time.
    pub fn backup<W: Write>(&mut self, sink: &mut W, progress: Progress<'_>) -> Result<()> {
        let total = self.geometry.size_bytes;
        let mut page = [0u8; READ_PAGE_LEN];
        let mut byte_pos = 0u64;

        while byte_pos < total {
            let frame = CommandFrame::read_page(self.chip_offset, byte_pos as u32).encode();
            self.session.send(&frame, DATA_TIMEOUT, Stage::SaveRead)?;
            self.session
                .receive(&mut page, DATA_TIMEOUT, Stage::SaveRead)?;

            sink.write_all(&page).map_err(Error::Sink)?;

            byte_pos += READ_PAGE_LEN as u64;
            progress(byte_pos.min(total), total);
            thread::sleep(INTER_CHUNK_PACING);
        }

        log::info!("Backed up {} bytes", total);
        Ok(())
    }

    /// Overwrite the whole save region with zeros.
    pub fn wipe(&mut self, progress: Progress<'_>) -> Result<()> {
        let total = self.geometry.size_bytes;
        let zeros = [0u8; WRITE_PAGE_LEN];
        let mut byte_pos = 0u64;

        while byte_pos < total {
            self.write_page(byte_pos, &zeros)?;
            byte_pos += WRITE_PAGE_LEN as u64;
            progress(byte_pos.min(total), total);
            thread::sleep(INTER_CHUNK_PACING);
        }

        log::info!("Wiped {} bytes", total);
        Ok(())
    }

    /// Restore save data from `source`, one 256-byte page at a time.
    pub fn restore<R: Read>(&mut self, source: &mut R, progress: Progress<'_>) -> Result<()> {
        let total = self.geometry.size_bytes;
        let mut page = [0u8; WRITE_PAGE_LEN];
        let mut byte_pos = 0u64;

        while byte_pos < total {
            source.read_exact(&mut page).map_err(Error::Source)?;
            self.write_page(byte_pos, &page)?;
            byte_pos += WRITE_PAGE_LEN as u64;
            progress(byte_pos.min(total), total);
            thread::sleep(INTER_CHUNK_PACING);
        }

        log::info!("Restored {} bytes", total);
        Ok(())
    }

    /// Write one 256-byte page: optional erase precommand, then the write
    /// frame followed by the payload as a second bulk send.
    fn write_page(&mut self, byte_pos: u64, data: &[u8; WRITE_PAGE_LEN]) -> Result<()> {
        if self.geometry.requires_erase_before_write {
            let erase = CommandFrame::erase_page(self.chip_offset, byte_pos as u32).encode();
            // The device tolerates losing the erase ack; only the write
            // itself is fatal on failure.
            if let Err(fault) = self.session.send_unchecked(&erase, DATA_TIMEOUT) {
                log::warn!(
                    "Erase command for page 0x{:06X} went unanswered: {}",
                    byte_pos,
                    fault
                );
            }
        }

        let frame = CommandFrame::write_page(self.chip_offset, byte_pos as u32).encode();
        self.session.send(&frame, DATA_TIMEOUT, Stage::SaveWrite)?;
        self.session.send(data, DATA_TIMEOUT, Stage::SaveWrite)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::protocol::{
        HANDSHAKE_REPLY_LEN, HEADER_LEN, OP_ERASE_PAGE, OP_ERASE_PAGE_93, OP_HANDSHAKE_FIRST,
        OP_HANDSHAKE_SECOND, OP_HEADER_REQUEST, OP_READ_PAGE, OP_STATUS_QUERY, OP_WRITE_PAGE,
        STATUS_LEN,
    };
    use crate::transport::TransportFault;
    use std::time::Duration;

    /// What the fake adapter will answer on the next receive.
    enum Reply {
        Status,
        Handshake,
        Header,
        SavePage(u32),
    }

    /// Operations seen on the wire, for ordering assertions.
    #[derive(Debug, PartialEq, Eq)]
    enum WireOp {
        Erase { opcode: u8, byte_pos: u32 },
        Write { byte_pos: u32 },
    }

    /// In-memory adapter: answers the setup sequence and stores written
    /// pages so later reads echo them back.
    struct FakeAdapter {
        status: [u8; STATUS_LEN],
        memory: Vec<u8>,
        pending_reply: Option<Reply>,
        pending_write: Option<u32>,
        ops: Vec<WireOp>,
    }

    impl FakeAdapter {
        fn new(status: [u8; STATUS_LEN], size: usize) -> Self {
            Self {
                status,
                memory: vec![0u8; size],
                pending_reply: None,
                pending_write: None,
                ops: Vec::new(),
            }
        }
    }

    impl Transport for FakeAdapter {
        fn send(
            &mut self,
            bytes: &[u8],
            _timeout: Duration,
        ) -> std::result::Result<usize, TransportFault> {
            // A pending write command means this transfer is the payload.
            if let Some(byte_pos) = self.pending_write.take() {
                let start = byte_pos as usize;
                let end = start + bytes.len();
                self.memory[start..end].copy_from_slice(bytes);
                return Ok(bytes.len());
            }

            let byte_pos = u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]);
            match bytes[0] {
                OP_STATUS_QUERY => self.pending_reply = Some(Reply::Status),
                OP_HANDSHAKE_FIRST => {}
                OP_HANDSHAKE_SECOND => self.pending_reply = Some(Reply::Handshake),
                OP_HEADER_REQUEST => self.pending_reply = Some(Reply::Header),
                OP_READ_PAGE => self.pending_reply = Some(Reply::SavePage(byte_pos)),
                OP_WRITE_PAGE => {
                    self.pending_write = Some(byte_pos);
                    self.ops.push(WireOp::Write { byte_pos });
                }
                OP_ERASE_PAGE | OP_ERASE_PAGE_93 => self.ops.push(WireOp::Erase {
                    opcode: bytes[0],
                    byte_pos,
                }),
                other => {
                    return Err(TransportFault::Failed(format!(
                        "unexpected opcode 0x{:02X}",
                        other
                    )))
                }
            }
            Ok(bytes.len())
        }

        fn receive(
            &mut self,
            buf: &mut [u8],
            _timeout: Duration,
        ) -> std::result::Result<usize, TransportFault> {
            match self.pending_reply.take() {
                Some(Reply::Status) => buf.copy_from_slice(&self.status),
                Some(Reply::Handshake) => buf.copy_from_slice(&[0xC2, 0xFF, 0x01, 0xC0]),
                Some(Reply::Header) => buf.fill(0x00),
                Some(Reply::SavePage(byte_pos)) => {
                    let start = byte_pos as usize;
                    buf.copy_from_slice(&self.memory[start..start + buf.len()]);
                }
                None => return Err(TransportFault::Failed("nothing to answer".into())),
            }
            Ok(buf.len())
        }
    }

    /// Drive the full setup sequence and return session plus status.
    fn setup(
        adapter: FakeAdapter,
    ) -> (AdapterSession<FakeAdapter>, StatusResponse, SaveGeometry) {
        let mut session = AdapterSession::new(adapter);
        let status = session.query_status().unwrap();
        let reply = session.prepare().unwrap();
        assert_eq!(reply.len(), HANDSHAKE_REPLY_LEN);
        let header = session.read_header().unwrap();
        assert_eq!(header.bytes().len(), HEADER_LEN);
        let geom = geometry::resolve(&status, None).unwrap();
        (session, status, geom)
    }

    // Flash cartridge with a 1 KiB save (size exponent 0x0A).
    fn flash_status(chip_id: u8) -> [u8; STATUS_LEN] {
        [chip_id, 0x00, 0x20, 0x40, 0x0A, 0xAA, 0x30, 0x01]
    }

    #[test]
    fn test_backup_reads_memory_in_order() {
        let mut adapter = FakeAdapter::new(flash_status(0x23), 1024);
        for (i, b) in adapter.memory.iter_mut().enumerate() {
            *b = (i % 251) as u8;
        }
        let expected = adapter.memory.clone();

        let (mut session, status, geom) = setup(adapter);
        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();

        let mut image = Vec::new();
        let mut reported = Vec::new();
        engine
            .backup(&mut image, &mut |done, total| reported.push((done, total)))
            .unwrap();

        assert_eq!(image, expected);
        assert_eq!(reported, vec![(512, 1024), (1024, 1024)]);
    }

    #[test]
    fn test_restore_backup_round_trip() {
        let original: Vec<u8> = (0..1024u32).map(|i| (i * 7 % 256) as u8).collect();

        let adapter = FakeAdapter::new(flash_status(0x23), 1024);
        let (mut session, status, geom) = setup(adapter);
        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();

        let mut source = std::io::Cursor::new(original.clone());
        engine.restore(&mut source, &mut |_, _| {}).unwrap();

        let mut image = Vec::new();
        engine.backup(&mut image, &mut |_, _| {}).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_wipe_zeroes_memory() {
        let mut adapter = FakeAdapter::new(flash_status(0x23), 1024);
        adapter.memory.fill(0x5A);

        let (mut session, status, geom) = setup(adapter);
        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();
        engine.wipe(&mut |_, _| {}).unwrap();

        let mut image = Vec::new();
        engine.backup(&mut image, &mut |_, _| {}).unwrap();
        assert!(image.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_erase_precedes_every_write_for_chip_93() {
        let adapter = FakeAdapter::new(flash_status(0x93), 1024);
        let (mut session, status, geom) = setup(adapter);
        assert!(geom.requires_erase_before_write);

        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();
        engine.wipe(&mut |_, _| {}).unwrap();

        let ops = &session.transport_for_test().ops;
        assert_eq!(ops.len(), 8); // 4 pages, erase + write each
        for pair in ops.chunks(2) {
            let WireOp::Erase { opcode, byte_pos } = &pair[0] else {
                panic!("expected erase first, got {:?}", pair[0]);
            };
            assert_eq!(*opcode, OP_ERASE_PAGE_93);
            assert_eq!(pair[1], WireOp::Write { byte_pos: *byte_pos });
        }
    }

    #[test]
    fn test_no_erase_for_plain_chips() {
        let adapter = FakeAdapter::new(flash_status(0x23), 1024);
        let (mut session, status, geom) = setup(adapter);
        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();
        engine.wipe(&mut |_, _| {}).unwrap();

        let ops = &session.transport_for_test().ops;
        assert!(ops.iter().all(|op| matches!(op, WireOp::Write { .. })));
    }

    #[test]
    fn test_restore_short_source() {
        let adapter = FakeAdapter::new(flash_status(0x23), 1024);
        let (mut session, status, geom) = setup(adapter);
        let mut engine = TransferEngine::new(&mut session, &status, geom).unwrap();

        // 100 bytes for a 1024-byte save region
        let mut source = std::io::Cursor::new(vec![0xAAu8; 100]);
        match engine.restore(&mut source, &mut |_, _| {}) {
            Err(Error::Source(_)) => {}
            other => panic!("expected source error, got {:?}", other),
        }
    }

    #[test]
    fn test_engine_requires_completed_setup() {
        let adapter = FakeAdapter::new(flash_status(0x23), 1024);
        let mut session = AdapterSession::new(adapter);
        let status = session.query_status().unwrap();
        let geom = geometry::resolve(&status, None).unwrap();
        assert!(matches!(
            TransferEngine::new(&mut session, &status, geom),
            Err(Error::Session { .. })
        ));
    }
}
