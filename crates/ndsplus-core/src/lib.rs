//! ndsplus-core - NDS Adapter+ protocol driver
//!
//! This crate implements the reverse-engineered command protocol of the
//! NDS Adapter+, a USB device that exposes the save-data region of an
//! inserted cartridge over two bulk endpoints. The adapter has no
//! documented protocol; everything here reproduces the fixed command set
//! observed from the vendor tool.
//!
//! # Architecture
//!
//! - [`protocol`] - the 10-byte command frames and protocol constants
//! - [`response`] - decoded status and ROM-header responses
//! - [`geometry`] - save-chip kind and size inference from the status bytes
//! - [`session`] - the per-run handshake state machine over a [`transport::Transport`]
//! - [`transfer`] - chunked, rate-limited backup / wipe / restore
//!
//! The crate is transport-agnostic: USB specifics live behind the
//! [`transport::Transport`] trait so the protocol logic can be exercised
//! against an in-memory fake.
//!
//! # Example
//!
//! ```no_run
//! use ndsplus_core::session::AdapterSession;
//! use ndsplus_core::transfer::TransferEngine;
//! use ndsplus_core::geometry;
//! # use ndsplus_core::transport::{Transport, TransportFault};
//! # struct Usb;
//! # impl Transport for Usb {
//! #     fn send(&mut self, _: &[u8], _: std::time::Duration) -> Result<usize, TransportFault> {
//! #         unimplemented!()
//! #     }
//! #     fn receive(&mut self, _: &mut [u8], _: std::time::Duration) -> Result<usize, TransportFault> {
//! #         unimplemented!()
//! #     }
//! # }
//! # fn open_transport() -> Usb { Usb }
//!
//! let mut session = AdapterSession::new(open_transport());
//! let status = session.query_status()?;
//! session.prepare()?;
//! let header = session.read_header()?;
//!
//! let geom = geometry::resolve(&status, None)?;
//! let mut engine = TransferEngine::new(&mut session, &status, geom)?;
//! let mut image = Vec::new();
//! engine.backup(&mut image, &mut |_, _| {})?;
//! # Ok::<(), ndsplus_core::Error>(())
//! ```

pub mod error;
pub mod geometry;
pub mod protocol;
pub mod response;
pub mod session;
pub mod transfer;
pub mod transport;

pub use error::{Direction, Error, Result, Stage};
pub use geometry::{SaveGeometry, SaveKind};
pub use response::{HeaderResponse, StatusResponse};
pub use session::{AdapterSession, SessionState};
pub use transfer::TransferEngine;
pub use transport::{Transport, TransportFault};
