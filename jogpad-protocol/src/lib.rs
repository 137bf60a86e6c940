//! Jogpad Wire Protocol
//!
//! This crate defines the control-state record the pendant streams to the
//! machine controller, and the textual frame that carries it.
//!
//! # Protocol Overview
//!
//! Every state change is sent as one contiguous frame:
//! ```text
//! ┌─────┬──────────────────────────────────────┬───────────┐
//! │ '^' │ base64(VERSION ‖ postcard(state))    │ "$\r\n"   │
//! │ 1B  │ 4·⌈n/3⌉ B                            │ 3B        │
//! └─────┴──────────────────────────────────────┴───────────┘
//! ```
//!
//! The link is one-way. The controller never acknowledges a frame and the
//! pendant discards whatever it receives.

#![no_std]
#![deny(unsafe_code)]

pub mod control;
pub mod frame;

pub use control::{
    Axis, ControlState, KeyMask, Multiplier, SchemaError, MAX_PAYLOAD_SIZE, SCHEMA_VERSION,
};
pub use frame::{
    encode_frame, encode_state, FrameBuf, FrameError, FrameParser, FRAME_END, FRAME_START,
    MAX_FRAME_SIZE,
};
