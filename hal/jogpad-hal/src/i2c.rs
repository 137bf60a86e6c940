//! I2C bus abstractions
//!
//! The pendant's I/O expanders and display share one I2C bus. Device drivers
//! talk to it through `embedded_hal::i2c::I2c`; this module classifies the
//! resulting errors so the scanners can tell a timed-out read (abort the scan,
//! retry later) from other faults.

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Classified bus failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The transaction did not complete within the bus deadline
    Timeout,
    /// The addressed device did not acknowledge
    Nack,
    /// Bus-level fault (misplaced start/stop, overrun)
    Bus,
    /// Anything the HAL could not classify
    Other,
}

impl BusError {
    /// Classify an `embedded-hal` I2C error kind
    ///
    /// Arbitration loss is reported as a timeout: on a single-master bus it
    /// only happens when a transaction was cut short, and the correct reaction
    /// is the same (give up this cycle, try again next poll).
    pub fn from_kind(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::ArbitrationLoss => BusError::Timeout,
            ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data)
            | ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown) => BusError::Nack,
            ErrorKind::Bus | ErrorKind::Overrun => BusError::Bus,
            _ => BusError::Other,
        }
    }

    /// Classify any `embedded-hal` I2C error
    pub fn from_i2c<E: embedded_hal::i2c::Error>(error: &E) -> Self {
        Self::from_kind(error.kind())
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Deadline for a single read transaction, in microseconds
    pub read_timeout_us: u32,
}
