//! Simple TOML parser for pendant configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `pendant.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, decimal or `0x` integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and tables
//! - Multi-line strings
//! - Escapes inside strings
//!
//! Unknown keys are ignored so newer files still load on older firmware.

use heapless::String as HString;

use super::types::PendantConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Invalid value type
    InvalidValue,
    /// Line is neither a header, a comment nor `key = value`
    InvalidLine,
    /// String longer than its field allows
    TooLong,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Bus,
    Switches,
    Scan,
    Diagnostics,
}

/// Parse TOML configuration into `PendantConfig`
///
/// Keys missing from the file keep their default values.
pub fn parse_config(input: &str) -> Result<PendantConfig, ParseError> {
    let mut config = PendantConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "network" => Ok(Section::Network),
        "bus" => Ok(Section::Bus),
        "switches" => Ok(Section::Switches),
        "scan" => Ok(Section::Scan),
        "diagnostics" => Ok(Section::Diagnostics),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment unless the `#` sits inside a string
fn strip_comment(text: &str) -> &str {
    match text.find('#') {
        Some(hash_pos) if text[..hash_pos].matches('"').count() % 2 == 0 => text[..hash_pos].trim(),
        _ => text,
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        // Allow unquoted strings for simple values
        Ok(value)
    }
}

fn parse_bounded<const N: usize>(value: &str) -> Result<HString<N>, ParseError> {
    let mut out = HString::new();
    out.push_str(parse_string(value)?)
        .map_err(|_| ParseError::TooLong)?;
    Ok(out)
}

/// Parse a decimal or `0x`-prefixed integer, `_` separators allowed
fn parse_int<T: TryFrom<u32>>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<16> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    let raw = match digits.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse(),
    }
    .map_err(|_| ParseError::InvalidValue)?;
    T::try_from(raw).map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut PendantConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::InvalidSection),
        Section::Network => {
            let n = &mut config.network;
            match key {
                "ssid" => n.ssid = parse_bounded(value)?,
                "password" => n.password = parse_bounded(value)?,
                "host" => n.host = parse_bounded(value)?,
                "port" => n.port = parse_int(value)?,
                "retry_ms" => n.retry_ms = parse_int(value)?,
                _ => {} // Ignore unknown keys
            }
        }
        Section::Bus => {
            let b = &mut config.bus;
            match key {
                "keypad_address" => b.keypad_address = parse_int(value)?,
                "switches_address" => b.switches_address = parse_int(value)?,
                "display_address" => b.display_address = parse_int(value)?,
                "frequency" => b.frequency = parse_int(value)?,
                "read_timeout_us" => b.read_timeout_us = parse_int(value)?,
                _ => {}
            }
        }
        Section::Switches => {
            let s = &mut config.switches;
            match key {
                "axis_width" => s.layout.axis.width = parse_int(value)?,
                "axis_offset" => s.layout.axis.offset = parse_int(value)?,
                "multiplier_width" => s.layout.multiplier.width = parse_int(value)?,
                "multiplier_offset" => s.layout.multiplier.offset = parse_int(value)?,
                "estop_bit" => s.layout.estop_bit = parse_int(value)?,
                "feedhold_bit" => s.layout.feedhold_bit = parse_int(value)?,
                "led_pin" => s.led_pin = parse_int(value)?,
                _ => {}
            }
        }
        Section::Scan => {
            if key == "poll_interval_ms" {
                config.scan.poll_interval_ms = parse_int(value)?;
            }
        }
        Section::Diagnostics => {
            if key == "report_raw_mask" {
                config.diagnostics.report_raw_mask = parse_bool(value)?;
            }
        }
    }
    Ok(())
}
