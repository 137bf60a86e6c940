//! Mock I2C bus shared by the driver tests

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use heapless::{Deque, Vec};

/// Records every write and serves queued bytes to reads
pub struct MockI2c {
    pub writes: Vec<(u8, Vec<u8, 8>), 64>,
    pub responses: Deque<u8, 16>,
    pub fail: Option<ErrorKind>,
    pub transactions: usize,
}

impl MockI2c {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            responses: Deque::new(),
            fail: None,
            transactions: 0,
        }
    }

    pub fn respond(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let _ = self.responses.push_back(b);
        }
    }

    /// Payload of the `n`th write
    pub fn write(&self, n: usize) -> &[u8] {
        self.writes[n].1.as_slice()
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.transactions += 1;
        if let Some(error) = self.fail {
            return Err(error);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let mut payload = Vec::new();
                    let _ = payload.extend_from_slice(&bytes[..bytes.len().min(8)]);
                    let _ = self.writes.push((address, payload));
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.responses.pop_front().unwrap_or(0xFF);
                    }
                }
            }
        }
        Ok(())
    }
}
