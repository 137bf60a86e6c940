//! Configuration loading
//!
//! The pendant configuration is compiled in from `pendant.toml` and parsed
//! with the `no_std` parser in jogpad-core.

pub mod loader;

pub use loader::load_config;
