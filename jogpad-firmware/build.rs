//! Links against memory.x and refuses to build with a bad pendant.toml

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let out = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out.join("memory.x"), include_bytes!("memory.x")).unwrap();
    println!("cargo:rustc-link-search={}", out.display());
    for arg in ["--nmagic", "-Tlink.x", "-Tdefmt.x"] {
        println!("cargo:rustc-link-arg-bins={}", arg);
    }

    for file in ["memory.x", "build.rs", "pendant.toml"] {
        println!("cargo:rerun-if-changed={}", file);
    }

    let errors = match config_errors() {
        Ok(errors) => errors,
        Err(e) => panic!("pendant.toml: {}", e),
    };
    if !errors.is_empty() {
        panic!("pendant.toml is invalid:\n  - {}", errors.join("\n  - "));
    }
}

/// Every problem found in pendant.toml, or why it could not be read
fn config_errors() -> Result<Vec<String>, String> {
    let text = fs::read_to_string("pendant.toml").map_err(|e| e.to_string())?;
    let config: toml::Value = toml::from_str(&text).map_err(|e| e.to_string())?;

    let mut errors = Vec::new();
    validate_network(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_switches(&config, &mut errors);
    Ok(errors)
}

fn integer(table: &toml::value::Table, key: &str) -> Option<i64> {
    table.get(key).and_then(|v| v.as_integer())
}

/// Check an optional string key against its length limit
fn check_string(
    section: &toml::value::Table,
    name: &str,
    key: &str,
    max: usize,
    errors: &mut Vec<String>,
) {
    match section.get(key) {
        Some(toml::Value::String(s)) if s.len() > max => {
            errors.push(format!("[{}] {} longer than {} bytes", name, key, max));
        }
        Some(toml::Value::String(_)) | None => {}
        Some(_) => errors.push(format!("[{}] {} must be a string", name, key)),
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(network) = config.get("network").and_then(|n| n.as_table()) else {
        errors.push("Missing [network] section".to_string());
        return;
    };

    match network.get("host") {
        Some(toml::Value::String(host)) if !host.is_empty() => {}
        _ => errors.push("[network] missing 'host'".to_string()),
    }
    check_string(network, "network", "host", 64, errors);
    check_string(network, "network", "ssid", 32, errors);
    check_string(network, "network", "password", 64, errors);

    if let Some(port) = integer(network, "port") {
        if !(1..=65535).contains(&port) {
            errors.push("[network] port must be 1-65535".to_string());
        }
    }
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(bus) = config.get("bus").and_then(|b| b.as_table()) else {
        return;
    };

    let mut seen = Vec::new();
    for key in ["keypad_address", "switches_address", "display_address"] {
        if let Some(address) = integer(bus, key) {
            if !(0..=0x7F).contains(&address) {
                errors.push(format!("[bus] {} must be a 7-bit address", key));
            }
            if seen.contains(&address) {
                errors.push(format!("[bus] {} collides with another device", key));
            }
            seen.push(address);
        }
    }
}

fn validate_switches(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(switches) = config.get("switches").and_then(|s| s.as_table()) else {
        return;
    };

    for field in ["axis", "multiplier"] {
        let width = integer(switches, &format!("{}_width", field));
        let offset = integer(switches, &format!("{}_offset", field));
        if let (Some(width), Some(offset)) = (width, offset) {
            if width < 1 || offset < 0 || width + offset > 16 {
                errors.push(format!("[switches] {} field must fit in 16 bits", field));
            }
        }
    }

    for key in ["estop_bit", "feedhold_bit", "led_pin"] {
        if let Some(bit) = integer(switches, key) {
            if !(0..16).contains(&bit) {
                errors.push(format!("[switches] {} must be 0-15", key));
            }
        }
    }
}
