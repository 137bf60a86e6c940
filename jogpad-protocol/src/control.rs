//! Pendant control state
//!
//! `ControlState` is rebuilt from scratch every loop iteration. Optional fields
//! are only present when they changed this cycle, except `encoder_value`,
//! which is refreshed unconditionally.
//!
//! On the wire the record is a single schema-version byte followed by the
//! postcard encoding of the struct. Postcard writes each `Option` as a
//! 0/1 tag byte, so the presence flags are explicit in the encoding and two
//! records compare equal exactly when their wire bytes do.

use serde::{Deserialize, Serialize};

/// Version byte prefixed to every serialized record
pub const SCHEMA_VERSION: u8 = 1;

/// Upper bound on a serialized record (version byte plus postcard body)
///
/// Worst case: 1 (version) + 2 + 2 (enum options) + 5 (zigzag i32)
/// + 2 + 2 (bool options) + 6 + 6 (u32 options) + 4 (u16 option) = 30.
pub const MAX_PAYLOAD_SIZE: usize = 32;

/// Bitmask over keypad button indices (bit `n` = button `n`)
pub type KeyMask = u32;

/// Schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchemaError {
    /// Output buffer cannot hold the record
    BufferTooSmall,
    /// Record carries a version this build does not understand
    UnsupportedVersion(u8),
    /// Body is not a valid record
    Malformed,
    /// Bytes left over after the record
    TrailingBytes,
}

/// Jog axis selected on the axis selector
///
/// Discriminants are the thermometer-decoded selector index; postcard encodes
/// unit variants by declaration order, so the wire value matches the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Axis {
    /// No contact: the pendant is in navigation mode
    #[default]
    Off = 0,
    X = 1,
    Y = 2,
    Z = 3,
    Fourth = 4,
    Fifth = 5,
    Sixth = 6,
}

impl Axis {
    /// Number of selector positions, including `Off`
    pub const POSITIONS: u8 = 7;

    /// Map a decoded selector index to an axis
    ///
    /// Out-of-range indices resolve to `Off`.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Axis::X,
            2 => Axis::Y,
            3 => Axis::Z,
            4 => Axis::Fourth,
            5 => Axis::Fifth,
            6 => Axis::Sixth,
            _ => Axis::Off,
        }
    }

    /// Selector index of this axis
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Short label for display
    pub fn label(self) -> &'static str {
        match self {
            Axis::Off => "-",
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
            Axis::Fourth => "4",
            Axis::Fifth => "5",
            Axis::Sixth => "6",
        }
    }
}

/// Jog step multiplier selected on the gain selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Multiplier {
    #[default]
    X1 = 0,
    X10 = 1,
    X100 = 2,
}

impl Multiplier {
    /// Number of selector positions
    pub const POSITIONS: u8 = 3;

    /// Map a decoded selector index to a multiplier
    ///
    /// Out-of-range indices resolve to the lowest gain.
    pub fn from_index(index: u8) -> Self {
        match index {
            1 => Multiplier::X10,
            2 => Multiplier::X100,
            _ => Multiplier::X1,
        }
    }

    /// Selector index of this multiplier
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Short label for display
    pub fn label(self) -> &'static str {
        match self {
            Multiplier::X1 => "x1",
            Multiplier::X10 => "x10",
            Multiplier::X100 => "x100",
        }
    }
}

/// One cycle's worth of pendant input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    pub axis: Option<Axis>,
    pub multiplier: Option<Multiplier>,
    /// Accumulated encoder count, always present
    pub encoder_value: i32,
    pub estop: Option<bool>,
    pub feedhold: Option<bool>,
    pub keys_pressed: Option<KeyMask>,
    pub keys_released: Option<KeyMask>,
    /// Raw aggregate switch register, diagnostics only
    pub raw_port_mask: Option<u16>,
}

impl ControlState {
    /// Fresh record carrying only the encoder value
    pub fn new(encoder_value: i32) -> Self {
        Self {
            encoder_value,
            ..Self::default()
        }
    }

    /// Mark keypad button `index` as pressed this cycle
    ///
    /// Indices outside the mask width are ignored.
    pub fn record_key_pressed(&mut self, index: u8) {
        if let Some(bit) = key_bit(index) {
            *self.keys_pressed.get_or_insert(0) |= bit;
        }
    }

    /// Mark keypad button `index` as released this cycle
    pub fn record_key_released(&mut self, index: u8) {
        if let Some(bit) = key_bit(index) {
            *self.keys_released.get_or_insert(0) |= bit;
        }
    }

    /// Serialize into `buffer` as version byte + postcard body
    ///
    /// Returns the written prefix of `buffer`.
    pub fn to_payload<'a>(&self, buffer: &'a mut [u8]) -> Result<&'a [u8], SchemaError> {
        let (version, body) = buffer
            .split_first_mut()
            .ok_or(SchemaError::BufferTooSmall)?;
        *version = SCHEMA_VERSION;
        let used = postcard::to_slice(self, body)
            .map_err(|_| SchemaError::BufferTooSmall)?
            .len();
        Ok(&buffer[..1 + used])
    }

    /// Parse a payload produced by [`ControlState::to_payload`]
    pub fn from_payload(bytes: &[u8]) -> Result<Self, SchemaError> {
        let (&version, body) = bytes.split_first().ok_or(SchemaError::Malformed)?;
        if version != SCHEMA_VERSION {
            return Err(SchemaError::UnsupportedVersion(version));
        }
        let (state, rest) =
            postcard::take_from_bytes::<ControlState>(body).map_err(|_| SchemaError::Malformed)?;
        if !rest.is_empty() {
            return Err(SchemaError::TrailingBytes);
        }
        Ok(state)
    }
}

fn key_bit(index: u8) -> Option<KeyMask> {
    (1 as KeyMask).checked_shl(u32::from(index))
}
