//! Deduplicating control-state transmitter
//!
//! The transmitter keeps the last record that was actually written. A new
//! record is framed and written only when it differs from that snapshot,
//! presence flags included, so an unchanged pendant produces no traffic.
//!
//! ```text
//!   state ──▶ == snapshot? ──yes──▶ Skipped
//!                  │ no
//!                  ▼
//!            encode_state ──▶ write_all ──ok──▶ snapshot = state ──▶ Sent
//!                                  │ err
//!                                  ▼
//!                            snapshot kept ──▶ Io(err)
//! ```

use jogpad_protocol::{encode_state, ControlState, FrameBuf, FrameError};

/// Outcome of a transmit call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transmission {
    /// Identical to the last transmitted record, nothing written
    Skipped,
    /// Frame of the given length written
    Sent(usize),
}

/// Transmit errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransmitError<E> {
    /// Record could not be serialized or framed
    Encode(FrameError),
    /// The link rejected the write
    Io(E),
}

impl<E> From<FrameError> for TransmitError<E> {
    fn from(err: FrameError) -> Self {
        TransmitError::Encode(err)
    }
}

/// Writes framed control states, skipping repeats
#[derive(Debug, Clone)]
pub struct Transmitter {
    snapshot: Option<ControlState>,
}

impl Default for Transmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Transmitter {
    /// Create a transmitter whose snapshot is the empty record
    ///
    /// An idle pendant at encoder zero therefore sends nothing until the
    /// first change.
    pub fn new() -> Self {
        Self {
            snapshot: Some(ControlState::default()),
        }
    }

    /// Forget the snapshot so the next record is always sent
    pub fn reset(&mut self) {
        self.snapshot = None;
    }

    /// Last record successfully written
    pub fn last_sent(&self) -> Option<&ControlState> {
        self.snapshot.as_ref()
    }

    /// Frame `state` unless it matches the snapshot
    pub fn prepare(&self, state: &ControlState) -> Result<Option<FrameBuf>, FrameError> {
        if self.snapshot.as_ref() == Some(state) {
            return Ok(None);
        }
        encode_state(state).map(Some)
    }

    /// Record that `state` went out
    fn commit(&mut self, state: &ControlState, frame: &FrameBuf) -> Transmission {
        self.snapshot = Some(*state);
        trace!("sent {} byte frame", frame.len());
        Transmission::Sent(frame.len())
    }

    /// Write `state` to a blocking link if it changed
    pub fn transmit<W: embedded_io::Write>(
        &mut self,
        state: &ControlState,
        link: &mut W,
    ) -> Result<Transmission, TransmitError<W::Error>> {
        let Some(frame) = self.prepare(state)? else {
            return Ok(Transmission::Skipped);
        };
        link.write_all(&frame).map_err(TransmitError::Io)?;
        Ok(self.commit(state, &frame))
    }

    /// Write `state` to an async link if it changed
    pub async fn transmit_async<W: embedded_io_async::Write>(
        &mut self,
        state: &ControlState,
        link: &mut W,
    ) -> Result<Transmission, TransmitError<W::Error>> {
        let Some(frame) = self.prepare(state)? else {
            return Ok(Transmission::Skipped);
        };
        link.write_all(&frame).await.map_err(TransmitError::Io)?;
        Ok(self.commit(state, &frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::ErrorKind;
    use jogpad_protocol::FrameParser;

    /// Byte sink recording each write call
    struct MockLink {
        written: heapless::Vec<u8, 256>,
        writes: usize,
        fail: bool,
    }

    impl MockLink {
        fn new() -> Self {
            Self {
                written: heapless::Vec::new(),
                writes: 0,
                fail: false,
            }
        }
    }

    impl embedded_io::ErrorType for MockLink {
        type Error = ErrorKind;
    }

    impl embedded_io::Write for MockLink {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            if self.fail {
                return Err(ErrorKind::BrokenPipe);
            }
            self.writes += 1;
            self.written
                .extend_from_slice(buf)
                .map_err(|_| ErrorKind::OutOfMemory)?;
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl embedded_io_async::Write for MockLink {
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            embedded_io::Write::write(self, buf)
        }
    }

    #[test]
    fn test_initial_empty_record_is_skipped() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();

        let result = tx.transmit(&ControlState::new(0), &mut link);
        assert_eq!(result, Ok(Transmission::Skipped));
        assert_eq!(link.writes, 0);
    }

    #[test]
    fn test_single_write_per_frame() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();

        let result = tx.transmit(&ControlState::new(5), &mut link);
        assert_eq!(result, Ok(Transmission::Sent(16)));
        assert_eq!(link.writes, 1);
        assert_eq!(link.written.as_slice(), b"^AQAACgAAAAAA$\r\n");
    }

    #[test]
    fn test_presence_change_is_sent() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();

        // same values, but estop now present
        let state = ControlState {
            estop: Some(false),
            ..ControlState::new(0)
        };
        assert_eq!(tx.transmit(&state, &mut link), Ok(Transmission::Sent(20)));
    }

    #[test]
    fn test_failed_write_keeps_snapshot() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();
        link.fail = true;

        let state = ControlState::new(7);
        assert_eq!(
            tx.transmit(&state, &mut link),
            Err(TransmitError::Io(ErrorKind::BrokenPipe))
        );
        assert_eq!(tx.last_sent(), Some(&ControlState::default()));

        link.fail = false;
        assert!(matches!(tx.transmit(&state, &mut link), Ok(Transmission::Sent(_))));
        assert_eq!(tx.last_sent(), Some(&state));
    }

    #[test]
    fn test_reset_forces_resend() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();
        let state = ControlState::new(3);

        let _ = tx.transmit(&state, &mut link);
        assert_eq!(tx.transmit(&state, &mut link), Ok(Transmission::Skipped));

        tx.reset();
        assert!(matches!(tx.transmit(&state, &mut link), Ok(Transmission::Sent(_))));
        assert_eq!(link.writes, 2);
    }

    #[test]
    fn test_async_transmit() {
        let mut tx = Transmitter::new();
        let mut link = MockLink::new();
        let state = ControlState::new(-1);

        let first = embassy_futures::block_on(tx.transmit_async(&state, &mut link));
        let second = embassy_futures::block_on(tx.transmit_async(&state, &mut link));

        assert!(matches!(first, Ok(Transmission::Sent(_))));
        assert_eq!(second, Ok(Transmission::Skipped));

        let mut parser = FrameParser::new();
        assert_eq!(parser.feed_bytes(&link.written), Ok(Some(state)));
    }
}
