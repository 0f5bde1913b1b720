//! Error types for the adapter protocol driver

use std::fmt;

use thiserror::Error;

use crate::session::SessionState;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Which half of a bulk exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Send,
    Receive,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "send"),
            Direction::Receive => write!(f, "receive"),
        }
    }
}

/// Protocol stage a transfer failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    StatusQuery,
    Handshake,
    HeaderRead,
    SaveRead,
    SaveWrite,
    SaveErase,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::StatusQuery => write!(f, "status query"),
            Stage::Handshake => write!(f, "handshake"),
            Stage::HeaderRead => write!(f, "header read"),
            Stage::SaveRead => write!(f, "savegame read"),
            Stage::SaveWrite => write!(f, "savegame write"),
            Stage::SaveErase => write!(f, "savegame erase"),
        }
    }
}

/// Errors surfaced by the protocol driver.
///
/// None of these are recoverable at the point they occur: there is no retry,
/// and a multi-chunk transfer that fails leaves the chunks before the
/// failure applied. The session moves to its terminal `Failed` state on any
/// transport error; the caller tears the transport down.
#[derive(Debug, Error)]
pub enum Error {
    /// A bulk transfer moved fewer bytes than required or failed outright.
    #[error("USB transfer failed ({direction} during {stage})")]
    Transport { direction: Direction, stage: Stage },

    /// The status sentinel (FF FF) reported an empty adapter.
    #[error("no cartridge is inserted")]
    NoCartridge,

    /// Status byte pattern outside the reverse-engineered coverage.
    #[error("unrecognized save chip (id 0x{chip_id:02X}, size exponent 0x{size_exponent:02X})")]
    UnsupportedChip { chip_id: u8, size_exponent: u8 },

    /// The backup sink rejected data.
    #[error("could not write backup data: {0}")]
    Sink(#[source] std::io::Error),

    /// The restore source ran dry or failed.
    #[error("could not read restore data: {0}")]
    Source(#[source] std::io::Error),

    /// A session call out of order, or on a failed session.
    #[error("{operation} is not valid in session state {state:?}")]
    Session {
        operation: &'static str,
        state: SessionState,
    },
}
