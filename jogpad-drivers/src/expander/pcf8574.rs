//! PCF8574 keypad matrix port
//!
//! The 4×4 matrix hangs off one PCF8574: rows on P0..P3, columns on P4..P7.
//! The PCF8574 is quasi-bidirectional, so a pin written `1` is a weak
//! pull-up that can be read back and a pin written `0` sinks current.
//!
//! ```text
//!   P7 P6 P5 P4 | P3 P2 P1 P0
//!   [ columns  ] | [  rows   ]
//!    read, 0=key    0=driven
//! ```
//!
//! Driving a row means writing `0` to it; a closed key on that row pulls
//! its column low. Columns are always written `1`.

use embedded_hal::i2c::I2c;
use jogpad_core::bits::{get_field, make_field};
use jogpad_core::KeypadPort;
use jogpad_hal::BusError;

/// Default I2C address on the pendant board
pub const DEFAULT_ADDRESS: u8 = 0x24;

const ROW_WIDTH: u32 = 4;
const ROW_OFFSET: u32 = 0;
const COL_WIDTH: u32 = 4;
const COL_OFFSET: u32 = 4;

/// Microsecond clock and budget for column reads
#[derive(Debug, Clone, Copy)]
pub struct ReadDeadline {
    pub now_us: fn() -> u64,
    pub budget_us: u32,
}

impl ReadDeadline {
    fn exceeded_since(&self, start: u64) -> bool {
        (self.now_us)().saturating_sub(start) > u64::from(self.budget_us)
    }
}

/// Keypad matrix behind a PCF8574
pub struct Pcf8574Keypad<I2C> {
    i2c: I2C,
    address: u8,
    deadline: Option<ReadDeadline>,
}

impl<I2C: I2c> Pcf8574Keypad<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            deadline: None,
        }
    }

    /// Report reads slower than `deadline` as [`BusError::Timeout`]
    pub fn with_deadline(mut self, deadline: ReadDeadline) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Port byte for a set of active rows
    fn row_pattern(active_rows: u8) -> u8 {
        !(make_field(u32::from(active_rows), ROW_WIDTH, ROW_OFFSET) as u8)
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> KeypadPort for Pcf8574Keypad<I2C> {
    fn drive_rows(&mut self, active_rows: u8) -> Result<(), BusError> {
        self.i2c
            .write(self.address, &[Self::row_pattern(active_rows)])
            .map_err(|e| BusError::from_i2c(&e))
    }

    fn read_columns(&mut self) -> Result<u8, BusError> {
        let start = self.deadline.map(|d| (d.now_us)());
        let mut port = [0u8];
        self.i2c
            .read(self.address, &mut port)
            .map_err(|e| BusError::from_i2c(&e))?;

        if let (Some(deadline), Some(start)) = (self.deadline, start) {
            if deadline.exceeded_since(start) {
                return Err(BusError::Timeout);
            }
        }

        Ok(get_field(u32::from(!port[0]), COL_WIDTH, COL_OFFSET) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockI2c;
    use core::sync::atomic::{AtomicU64, Ordering};
    use embedded_hal::i2c::ErrorKind;

    #[test]
    fn test_row_patterns() {
        let mut keypad = Pcf8574Keypad::new(MockI2c::new(), DEFAULT_ADDRESS);

        keypad.drive_rows(0b0010).unwrap();
        keypad.drive_rows(0b1111).unwrap();

        let i2c = keypad.release();
        assert_eq!(i2c.writes[0].0, DEFAULT_ADDRESS);
        assert_eq!(i2c.write(0), &[0b1111_1101]);
        assert_eq!(i2c.write(1), &[0b1111_0000]);
    }

    #[test]
    fn test_columns_are_active_low() {
        let mut i2c = MockI2c::new();
        // column 2 pulled low, row 1 driven
        i2c.respond(&[0b1011_1101]);
        let mut keypad = Pcf8574Keypad::new(i2c, DEFAULT_ADDRESS);

        assert_eq!(keypad.read_columns(), Ok(0b0100));
    }

    #[test]
    fn test_nack_maps_to_bus_error() {
        let mut i2c = MockI2c::new();
        i2c.fail = Some(ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        ));
        let mut keypad = Pcf8574Keypad::new(i2c, DEFAULT_ADDRESS);

        assert_eq!(keypad.read_columns(), Err(BusError::Nack));
        assert_eq!(keypad.drive_rows(1), Err(BusError::Nack));
    }

    static NOW: AtomicU64 = AtomicU64::new(0);

    fn slow_clock() -> u64 {
        // every reading advances 600 µs
        NOW.fetch_add(600, Ordering::Relaxed)
    }

    #[test]
    fn test_slow_read_times_out() {
        let mut i2c = MockI2c::new();
        i2c.respond(&[0xFF, 0xFF]);
        let mut keypad = Pcf8574Keypad::new(i2c, DEFAULT_ADDRESS).with_deadline(ReadDeadline {
            now_us: slow_clock,
            budget_us: 500,
        });
        assert_eq!(keypad.read_columns(), Err(BusError::Timeout));

        let mut keypad = Pcf8574Keypad::new(keypad.release(), DEFAULT_ADDRESS).with_deadline(
            ReadDeadline {
                now_us: slow_clock,
                budget_us: 1_000,
            },
        );
        assert_eq!(keypad.read_columns(), Ok(0));
    }
}
