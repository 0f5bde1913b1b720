//! Transport abstraction consumed by the protocol driver
//!
//! A session owns exactly one transport: a duplex channel with one outbound
//! and one inbound bulk endpoint, fixed at open time. The driver only needs
//! timed, blocking send/receive of fixed-length buffers; USB enumeration and
//! endpoint discovery live in the backend crate.

use std::time::Duration;

use thiserror::Error;

/// Failure reported by a transport backend.
///
/// Backends may distinguish timeouts from other failures; the driver treats
/// both identically and never retries either.
#[derive(Debug, Error)]
pub enum TransportFault {
    #[error("transfer timed out")]
    Timeout,
    #[error("transfer failed: {0}")]
    Failed(String),
}

/// Blocking bulk transfers against the fixed endpoint pair.
///
/// Both calls return the number of bytes actually moved; the driver treats
/// any count other than the full buffer as a failure of that leg.
pub trait Transport {
    /// Send `bytes` on the outbound endpoint.
    fn send(&mut self, bytes: &[u8], timeout: Duration) -> Result<usize, TransportFault>;

    /// Receive up to `buf.len()` bytes from the inbound endpoint.
    fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, TransportFault>;
}
