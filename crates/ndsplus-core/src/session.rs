//! Adapter session state machine
//!
//! One session per run. The device requires the three setup calls in a fixed
//! order before save transfers will succeed: status query, the two-frame
//! preparation handshake, then the header read. Repeating or reordering them
//! is unspecified by the device and rejected here.
//!
//! Any transport failure moves the session to the terminal `Failed` state;
//! the caller tears the transport down by dropping the session.

use crate::error::{Direction, Error, Result, Stage};
use crate::protocol::{
    CommandFrame, HandshakeStep, HANDSHAKE_REPLY_LEN, HEADER_LEN, SETUP_TIMEOUT, STATUS_LEN,
};
use crate::response::{HeaderResponse, StatusResponse};
use crate::transport::{Transport, TransportFault};
use std::time::Duration;

/// Session lifecycle. `Failed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Opened,
    StatusQueried,
    Prepared,
    HeaderRead,
    Ready,
    Failed,
}

/// Stateful driver for one adapter run.
///
/// Owns the transport for the session's lifetime; the transport is released
/// when the session is dropped, on failure paths included.
pub struct AdapterSession<T> {
    transport: T,
    state: SessionState,
}

impl<T: Transport> AdapterSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: SessionState::Opened,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Query the adapter status: one frame out, 8 bytes back.
    ///
    /// A response carrying the no-cartridge sentinel is a valid result, not
    /// an error; the caller decides whether to abort.
    pub fn query_status(&mut self) -> Result<StatusResponse> {
        self.expect_state("query_status", SessionState::Opened)?;

        let frame = CommandFrame::status_query().encode();
        self.send(&frame, SETUP_TIMEOUT, Stage::StatusQuery)?;

        let mut raw = [0u8; STATUS_LEN];
        self.receive(&mut raw, SETUP_TIMEOUT, Stage::StatusQuery)?;

        self.state = SessionState::StatusQueried;
        let status = StatusResponse::decode(&raw);
        log::debug!("Adapter status: {:02X?}", status.bytes());
        Ok(status)
    }

    /// Run the two-frame preparation handshake.
    ///
    /// The device requires exactly this sequence before header reads work.
    /// The 4-byte reply is never interpreted; it is returned only for
    /// diagnostic capture.
    pub fn prepare(&mut self) -> Result<[u8; HANDSHAKE_REPLY_LEN]> {
        self.expect_state("prepare", SessionState::StatusQueried)?;

        let first = CommandFrame::handshake(HandshakeStep::First).encode();
        self.send(&first, SETUP_TIMEOUT, Stage::Handshake)?;

        let second = CommandFrame::handshake(HandshakeStep::Second).encode();
        self.send(&second, SETUP_TIMEOUT, Stage::Handshake)?;

        let mut reply = [0u8; HANDSHAKE_REPLY_LEN];
        self.receive(&mut reply, SETUP_TIMEOUT, Stage::Handshake)?;

        self.state = SessionState::Prepared;
        log::debug!("Handshake reply: {:02X?}", reply);
        Ok(reply)
    }

    /// Read the first 512 bytes of the cartridge ROM.
    pub fn read_header(&mut self) -> Result<HeaderResponse> {
        self.expect_state("read_header", SessionState::Prepared)?;

        let frame = CommandFrame::header_request().encode();
        self.send(&frame, SETUP_TIMEOUT, Stage::HeaderRead)?;

        let mut raw = [0u8; HEADER_LEN];
        self.receive(&mut raw, SETUP_TIMEOUT, Stage::HeaderRead)?;

        self.state = SessionState::HeaderRead;
        Ok(HeaderResponse::decode(raw))
    }

    /// Move the session into `Ready` for save transfers. Called by the
    /// transfer engine once setup is complete.
    pub(crate) fn begin_transfers(&mut self) -> Result<()> {
        match self.state {
            SessionState::HeaderRead | SessionState::Ready => {
                self.state = SessionState::Ready;
                Ok(())
            }
            state => Err(Error::Session {
                operation: "transfer",
                state,
            }),
        }
    }

    /// Send a buffer, requiring the full length to go through.
    pub(crate) fn send(&mut self, bytes: &[u8], timeout: Duration, stage: Stage) -> Result<()> {
        match self.transport.send(bytes, timeout) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => {
                log::debug!("Short send during {}: {} of {} bytes", stage, n, bytes.len());
                self.fail(Direction::Send, stage)
            }
            Err(fault) => {
                log::debug!("Send fault during {}: {}", stage, fault);
                self.fail(Direction::Send, stage)
            }
        }
    }

    /// Receive into a buffer, requiring it to be filled exactly.
    pub(crate) fn receive(
        &mut self,
        buf: &mut [u8],
        timeout: Duration,
        stage: Stage,
    ) -> Result<()> {
        match self.transport.receive(buf, timeout) {
            Ok(n) if n == buf.len() => Ok(()),
            Ok(n) => {
                log::debug!(
                    "Short receive during {}: {} of {} bytes",
                    stage,
                    n,
                    buf.len()
                );
                self.fail(Direction::Receive, stage)
            }
            Err(fault) => {
                log::debug!("Receive fault during {}: {}", stage, fault);
                self.fail(Direction::Receive, stage)
            }
        }
    }

    /// Best-effort send that does not fail the session. Used for the erase
    /// precommand, whose ack loss the device tolerates.
    pub(crate) fn send_unchecked(
        &mut self,
        bytes: &[u8],
        timeout: Duration,
    ) -> std::result::Result<(), TransportFault> {
        match self.transport.send(bytes, timeout) {
            Ok(n) if n == bytes.len() => Ok(()),
            Ok(n) => Err(TransportFault::Failed(format!(
                "short transfer: {} of {} bytes",
                n,
                bytes.len()
            ))),
            Err(fault) => Err(fault),
        }
    }

    /// Test-only access to the underlying transport.
    #[cfg(test)]
    pub(crate) fn transport_for_test(&self) -> &T {
        &self.transport
    }

    fn expect_state(&self, operation: &'static str, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(Error::Session {
                operation,
                state: self.state,
            })
        }
    }

    fn fail(&mut self, direction: Direction, stage: Stage) -> Result<()> {
        self.state = SessionState::Failed;
        Err(Error::Transport { direction, stage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Transport whose receive leg always comes up short.
    struct ShortReceive;

    impl Transport for ShortReceive {
        fn send(&mut self, bytes: &[u8], _timeout: Duration) -> std::result::Result<usize, TransportFault> {
            Ok(bytes.len())
        }

        fn receive(
            &mut self,
            buf: &mut [u8],
            _timeout: Duration,
        ) -> std::result::Result<usize, TransportFault> {
            Ok(buf.len().saturating_sub(2))
        }
    }

    #[test]
    fn test_short_receive_fails_session() {
        let mut session = AdapterSession::new(ShortReceive);
        match session.query_status() {
            Err(Error::Transport { direction, stage }) => {
                assert_eq!(direction, Direction::Receive);
                assert_eq!(stage, Stage::StatusQuery);
            }
            other => panic!("expected transport error, got {:?}", other),
        }
        assert_eq!(session.state(), SessionState::Failed);

        // the session is unusable afterwards
        match session.query_status() {
            Err(Error::Session { state, .. }) => assert_eq!(state, SessionState::Failed),
            other => panic!("expected session error, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_order_calls_rejected() {
        let mut session = AdapterSession::new(ShortReceive);
        assert!(matches!(
            session.prepare(),
            Err(Error::Session {
                operation: "prepare",
                state: SessionState::Opened,
            })
        ));
        assert!(matches!(
            session.read_header(),
            Err(Error::Session {
                operation: "read_header",
                ..
            })
        ));
    }
}
