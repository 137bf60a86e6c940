//! Embedded configuration loader
//!
//! Falls back to board defaults if the embedded file does not parse, and to
//! the board wiring if its bus or switch sections are invalid.

use defmt::*;

use jogpad_core::config::{parse_config, PendantConfig};

/// Embedded configuration (compiled into firmware)
/// Edit pendant.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../pendant.toml");

/// Parse the embedded configuration
pub fn load_config() -> PendantConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Parsed embedded configuration");
            config
        }
        Err(e) => {
            // build.rs validates the file, so this only happens when the
            // parser and the validator disagree
            error!("Failed to parse embedded config: {}", e);
            error!("Using board defaults");
            PendantConfig::default()
        }
    };

    if let Some(e) = config.restore_board_wiring() {
        error!("Invalid wiring in embedded config: {}", e);
        error!("Using board bus and switch defaults");
    }
    if let Err(e) = config.validate() {
        error!("Controller link settings invalid: {}", e);
    }

    log_config_summary(&config);
    config
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &PendantConfig) {
    debug!(
        "  controller {}:{} via '{}'",
        config.network.host.as_str(),
        config.network.port,
        config.network.ssid.as_str()
    );
    debug!(
        "  keypad @{=u8:#x}, switches @{=u8:#x}, display @{=u8:#x}",
        config.bus.keypad_address,
        config.bus.switches_address,
        config.bus.display_address
    );
    debug!("  layout {}", config.switches.layout);
    debug!("  poll every {} ms", config.scan.poll_interval_ms);
}
