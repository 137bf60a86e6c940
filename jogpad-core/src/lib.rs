//! Board-agnostic core logic for the jog pendant firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Bit-field helpers and thermometer decoding
//! - Matrix keypad scanner
//! - Aggregate switch register scanner
//! - Per-cycle control state aggregation
//! - Deduplicating frame transmitter
//! - Configuration types and parser
//!
//! ```text
//!   IRQ ─▶ IrqLatch ───▶ MatrixScanner ──┐
//!   IRQ ─▶ IrqCounter ─▶ SwitchScanner ──┼─▶ Aggregator ─▶ ControlState ─┬─▶ Transmitter ─▶ link
//!   encoder ─▶ SharedCount ──────────────┘                              └─▶ DisplaySink
//! ```

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod aggregator;
pub mod bits;
pub mod config;
pub mod events;
pub mod keypad;
pub mod switches;
pub mod traits;
pub mod transmitter;

pub use aggregator::{Aggregator, Cycle};
pub use events::{InputEvent, KeyState};
pub use keypad::{KeypadPort, MatrixScanner, ScanOutcome};
pub use switches::{FieldSpec, SwitchLayout, SwitchPoll, SwitchPort, SwitchScanner};
pub use traits::DisplaySink;
pub use transmitter::{TransmitError, Transmission, Transmitter};
