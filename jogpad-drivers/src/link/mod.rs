//! Network links to the machine controller

pub mod esp_at;

pub use esp_at::{EspAtLink, LinkError};
