//! Jogpad Hardware Abstraction Layer
//!
//! This crate holds the small, board-agnostic primitives shared between the
//! pendant core logic and the board firmware. Chip-specific code lives in the
//! firmware crate and talks to the core only through these types.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  jogpad-firmware (RP2040 binary)        │
//! └─────────────────────────────────────────┘
//!          │ interrupt tasks      │ main loop
//!          ▼                      ▼
//! ┌─────────────────────────────────────────┐
//! │  jogpad-hal (this crate)                │
//! │  IrqLatch / IrqCounter / SharedCount    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  jogpad-core (scanners, transmitter)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`irq`] - Interrupt contexts, one static instance per physical line
//! - [`encoder`] - Shared quadrature count read by the main loop
//! - [`i2c`] - Bus error classification and bus configuration

#![no_std]
#![deny(unsafe_code)]

pub mod encoder;
pub mod i2c;
pub mod irq;

// Re-export key types at crate root for convenience
pub use encoder::{EncoderCount, SharedCount};
pub use i2c::{BusError, I2cConfig};
pub use irq::{IrqContext, IrqCounter, IrqLatch};
