//! Display drivers
//!
//! Backends implementing [`jogpad_display::DisplayBackend`].

pub mod sh1106;

pub use sh1106::Sh1106;
