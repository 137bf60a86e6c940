//! Display abstraction and the pendant status view
//!
//! This crate provides:
//! - `DisplayBackend` trait for character-addressed displays
//! - `Screen`, a text buffer that tracks which rows changed
//! - `PendantView`, which renders control states onto a backend
//!
//! # Architecture
//!
//! ```text
//!   ControlState ─▶ PendantView (latches fields) ─▶ Screen (row diff) ─▶ DisplayBackend
//! ```
//!
//! The main loop hands every cycle's record to `PendantView` through the
//! core `DisplaySink` trait. Only rows whose text changed are sent to the
//! hardware.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod screen;
pub mod view;

// Re-export key types
pub use backend::{DisplayBackend, DisplayError};
pub use screen::{Screen, SCREEN_COLS, SCREEN_ROWS};
pub use view::PendantView;
