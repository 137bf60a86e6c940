//! Configuration type definitions
//!
//! Defaults describe the reference pendant board, so an empty file yields a
//! working configuration apart from the network credentials.

use heapless::String;

use crate::switches::SwitchLayout;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum host name length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum access point name length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum access point password length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Controller link configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetworkConfig {
    /// Access point to join
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    /// Controller host name or address
    pub host: String<MAX_HOST_LEN>,
    /// Controller TCP port
    pub port: u16,
    /// Delay between connection attempts
    pub retry_ms: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            host: String::new(),
            port: 8888,
            retry_ms: 2000,
        }
    }
}

/// Shared I2C bus configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// Keypad expander (PCF8574) address
    pub keypad_address: u8,
    /// Switch expander (MCP23017) address
    pub switches_address: u8,
    /// Display controller address
    pub display_address: u8,
    /// Bus clock in Hz
    pub frequency: u32,
    /// Read deadline in microseconds
    pub read_timeout_us: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            keypad_address: 0x24,
            switches_address: 0x20,
            display_address: 0x3C,
            frequency: 100_000,
            read_timeout_us: 1_000,
        }
    }
}

/// Switch expander wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SwitchesConfig {
    pub layout: SwitchLayout,
    /// Expander pin driving the status LED (active-low)
    pub led_pin: u8,
}

impl Default for SwitchesConfig {
    fn default() -> Self {
        Self {
            layout: SwitchLayout::default(),
            led_pin: 0,
        }
    }
}

/// Main loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// Delay between loop iterations
    pub poll_interval_ms: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DiagnosticsConfig {
    /// Include the raw switch register in the record when it changes
    pub report_raw_mask: bool,
}

/// Complete pendant configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PendantConfig {
    pub network: NetworkConfig,
    pub bus: BusConfig,
    pub switches: SwitchesConfig,
    pub scan: ScanConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Semantic configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No controller host given
    MissingHost,
    /// Port 0 is not connectable
    InvalidPort,
    /// Two bus devices share an address, or an address is outside 7 bits
    InvalidAddress,
    /// Switch fields overlap or leave the 16-bit register
    InvalidLayout,
    /// LED pin collides with a switch input
    InvalidLedPin,
}

impl PendantConfig {
    /// Check cross-field constraints the parser cannot see
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.network.host.is_empty() {
            return Err(ConfigError::MissingHost);
        }
        if self.network.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        self.validate_wiring()
    }

    /// Check only the bus addresses and switch wiring
    pub fn validate_wiring(&self) -> Result<(), ConfigError> {
        let bus = &self.bus;
        let addresses = [bus.keypad_address, bus.switches_address, bus.display_address];
        if addresses.iter().any(|&a| a > 0x7F)
            || bus.keypad_address == bus.switches_address
            || bus.keypad_address == bus.display_address
            || bus.switches_address == bus.display_address
        {
            return Err(ConfigError::InvalidAddress);
        }

        let layout = &self.switches.layout;
        if !layout.is_valid() {
            return Err(ConfigError::InvalidLayout);
        }
        let led = self.switches.led_pin;
        if led > 15 || layout.input_mask() & (1 << led) != 0 {
            return Err(ConfigError::InvalidLedPin);
        }

        Ok(())
    }

    /// Replace the bus and switch sections with board defaults if the
    /// wiring is invalid, returning the rejected error
    ///
    /// Network settings are left alone; a bad host only stops the link.
    pub fn restore_board_wiring(&mut self) -> Option<ConfigError> {
        let error = self.validate_wiring().err()?;
        self.bus = BusConfig::default();
        self.switches = SwitchesConfig::default();
        Some(error)
    }
}
