//! Interrupt contexts
//!
//! An interrupt handler may only touch one of these. Each physical interrupt
//! line gets exactly one statically-allocated context, which is handed by
//! reference both to the code that services the line and to the scanner that
//! consumes it. Nothing here performs bus I/O.
//!
//! ```text
//!  INT line ──► IrqContext::fire() ──► (main loop) scanner poll
//! ```

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// Something an interrupt handler can signal
///
/// Implementations must be callable from interrupt context: no blocking,
/// no allocation, no bus access.
pub trait IrqContext: Sync {
    /// Record one interrupt occurrence
    fn fire(&self);
}

/// Level-insensitive dirty flag
///
/// Any number of edges set the flag; only the consumer clears it, after it
/// has completely serviced the line.
#[derive(Debug)]
pub struct IrqLatch {
    pending: AtomicBool,
}

impl IrqLatch {
    /// Create a latch with no pending interrupt
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Check whether an interrupt arrived since the last [`clear`](Self::clear)
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Re-arm the latch
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }
}

impl Default for IrqLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqContext for IrqLatch {
    fn fire(&self) {
        self.pending.store(true, Ordering::Release);
    }
}

/// Wrapping interrupt counter
///
/// The consumer keeps its own watermark and compares it with [`load`](Self::load);
/// any number of interrupts between two polls collapse into one pending
/// difference. Wraps at 256, which only matters if exactly 256 interrupts
/// arrive between two polls.
#[derive(Debug)]
pub struct IrqCounter {
    triggered: AtomicU8,
}

impl IrqCounter {
    /// Create a counter at zero
    pub const fn new() -> Self {
        Self {
            triggered: AtomicU8::new(0),
        }
    }

    /// Current trigger count
    pub fn load(&self) -> u8 {
        self.triggered.load(Ordering::Acquire)
    }
}

impl Default for IrqCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl IrqContext for IrqCounter {
    fn fire(&self) {
        self.triggered.fetch_add(1, Ordering::AcqRel);
    }
}
