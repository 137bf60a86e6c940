//! Shared state between interrupt tasks and the main loop
//!
//! One static per physical signal. Interrupt-line tasks only ever fire their
//! context; the main loop is the only reader.

use jogpad_hal::{IrqCounter, IrqLatch, SharedCount};

/// Keypad expander INT line
pub static KEYPAD_IRQ: IrqLatch = IrqLatch::new();

/// Switch expander INTA and INTB; both lines fire the same counter
pub static SWITCH_IRQ: IrqCounter = IrqCounter::new();

/// Jog wheel count, written by the encoder task
pub static JOG_COUNT: SharedCount = SharedCount::new();
