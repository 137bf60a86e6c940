//! Frame encoding and decoding for the pendant link.
//!
//! Frame format:
//! - START (1 byte): `'^'`
//! - PAYLOAD: standard base64 (with padding) of the serialized record
//! - END (3 bytes): `"$\r\n"`
//!
//! The base64 alphabet never contains `'^'` or `'$'`, so both delimiters are
//! unambiguous and a receiver can resynchronize on the next `'^'`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use heapless::Vec;

use crate::control::{ControlState, SchemaError, MAX_PAYLOAD_SIZE};

/// Frame start delimiter
pub const FRAME_START: u8 = b'^';

/// Frame end delimiter
pub const FRAME_END: &[u8; 3] = b"$\r\n";

/// Base64 length of a maximal payload
pub const MAX_ENCODED_SIZE: usize = base64_len(MAX_PAYLOAD_SIZE);

/// Maximum complete frame size (START + encoded payload + END)
pub const MAX_FRAME_SIZE: usize = 1 + MAX_ENCODED_SIZE + FRAME_END.len();

/// Owned, fully framed record ready for a single write
pub type FrameBuf = Vec<u8, MAX_FRAME_SIZE>;

const fn base64_len(raw: usize) -> usize {
    raw.div_ceil(3) * 4
}

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Payload is not valid base64
    InvalidEncoding,
    /// Delimiters out of place
    InvalidFrame,
    /// Payload decoded but is not a valid record
    Schema(SchemaError),
}

impl From<SchemaError> for FrameError {
    fn from(err: SchemaError) -> Self {
        FrameError::Schema(err)
    }
}

/// Frame a raw payload into `buffer`
///
/// Returns the number of bytes written.
pub fn encode_frame(payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = 1 + base64_len(payload.len()) + FRAME_END.len();
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = FRAME_START;
    let encoded = STANDARD
        .encode_slice(payload, &mut buffer[1..frame_len - FRAME_END.len()])
        .map_err(|_| FrameError::BufferTooSmall)?;
    let end = 1 + encoded;
    buffer[end..end + FRAME_END.len()].copy_from_slice(FRAME_END);

    Ok(end + FRAME_END.len())
}

/// Serialize and frame a control state
pub fn encode_state(state: &ControlState) -> Result<FrameBuf, FrameError> {
    let mut raw = [0u8; MAX_PAYLOAD_SIZE];
    let payload = state.to_payload(&mut raw)?;

    let mut buffer = [0u8; MAX_FRAME_SIZE];
    let len = encode_frame(payload, &mut buffer)?;
    let mut frame = Vec::new();
    frame
        .extend_from_slice(&buffer[..len])
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(frame)
}

/// State machine for parsing incoming frames
///
/// Used by diagnostics tooling and tests; the pendant itself never parses
/// what it receives.
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_ENCODED_SIZE>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    WaitingForStart,
    /// Collecting base64 characters until `'$'`
    ReadingPayload,
    /// Got `'$'`, waiting for CR
    WaitingForCr,
    /// Got CR, waiting for LF
    WaitingForLf,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    /// Create a new frame parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.buffer.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(state))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<ControlState>, FrameError> {
        // A start byte anywhere restarts the frame
        if byte == FRAME_START {
            self.reset();
            self.state = ParseState::ReadingPayload;
            return Ok(None);
        }

        match self.state {
            ParseState::WaitingForStart => Ok(None),
            ParseState::ReadingPayload => {
                if byte == FRAME_END[0] {
                    self.state = ParseState::WaitingForCr;
                    return Ok(None);
                }
                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Err(FrameError::PayloadTooLarge);
                }
                Ok(None)
            }
            ParseState::WaitingForCr => {
                if byte != FRAME_END[1] {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                self.state = ParseState::WaitingForLf;
                Ok(None)
            }
            ParseState::WaitingForLf => {
                if byte != FRAME_END[2] {
                    self.reset();
                    return Err(FrameError::InvalidFrame);
                }
                let result = self.decode();
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<ControlState>, FrameError> {
        for &byte in bytes {
            if let Some(state) = self.feed(byte)? {
                return Ok(Some(state));
            }
        }
        Ok(None)
    }

    fn decode(&self) -> Result<ControlState, FrameError> {
        // Decode buffer sized to the base64 length, above the decoder's estimate
        let mut raw = [0u8; MAX_ENCODED_SIZE];
        let len = STANDARD
            .decode_slice(&self.buffer, &mut raw)
            .map_err(|_| FrameError::InvalidEncoding)?;
        Ok(ControlState::from_payload(&raw[..len])?)
    }
}
