//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in jogpad-core and jogpad-display for the pendant board:
//!
//! - I/O expanders (PCF8574 keypad matrix, MCP23017 switch register)
//! - SH1106 OLED text display
//! - Quadrature encoder decoding
//! - ESP-AT Wi-Fi modem link

#![no_std]
#![deny(unsafe_code)]

pub mod display;
pub mod encoder;
pub mod expander;
pub mod link;

#[cfg(test)]
mod mock;
