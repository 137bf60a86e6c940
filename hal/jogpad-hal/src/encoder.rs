//! Encoder count abstractions
//!
//! The jog wheel is counted outside the main loop (hardware counter, PIO or
//! an edge task). The core only ever reads the accumulated signed count.

use portable_atomic::{AtomicI32, Ordering};

/// Read-only view of a quadrature encoder count
pub trait EncoderCount {
    /// Current signed count
    fn count(&self) -> i32;
}

impl<T: EncoderCount + ?Sized> EncoderCount for &T {
    fn count(&self) -> i32 {
        (**self).count()
    }
}

/// Encoder count shared between the counting context and the main loop
#[derive(Debug)]
pub struct SharedCount {
    value: AtomicI32,
}

impl SharedCount {
    /// Create a count at zero
    pub const fn new() -> Self {
        Self {
            value: AtomicI32::new(0),
        }
    }

    /// Apply a signed step (wrapping)
    pub fn add(&self, delta: i32) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }
}

impl Default for SharedCount {
    fn default() -> Self {
        Self::new()
    }
}

impl EncoderCount for SharedCount {
    fn count(&self) -> i32 {
        self.value.load(Ordering::Relaxed)
    }
}
