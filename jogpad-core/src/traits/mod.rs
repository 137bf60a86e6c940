//! Collaborator traits
//!
//! These traits define the interface between the pendant logic and the
//! outputs it drives.

pub mod display;

pub use display::DisplaySink;
