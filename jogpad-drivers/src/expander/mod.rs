//! I/O expander drivers
//!
//! Both expanders sit on the shared I2C bus and are reached through any
//! `embedded_hal::i2c::I2c` implementation, typically a bus-sharing device
//! handle.

pub mod mcp23017;
pub mod pcf8574;

pub use mcp23017::Mcp23017Switches;
pub use pcf8574::Pcf8574Keypad;
