//! Desktop stand-ins for the phone's presence and battery sensors.
//!
//! Charging comes from `/sys/class/power_supply`, the current network from
//! `iwgetid -r`. Both degrade to "unknown" (unplugged, no SSID) when the
//! source is missing.

use std::path::Path;
use std::process::Command;

use gosleep_core::{ChargingState, PlugType};

const POWER_SUPPLY_DIR: &str = "/sys/class/power_supply";

pub fn read_charging() -> ChargingState {
    let dir = std::env::var_os("GOSLEEP_POWER_SUPPLY_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| POWER_SUPPLY_DIR.into());
    let state = read_charging_from(&dir);
    tracing::debug!(
        dir = %dir.display(),
        is_charging = state.is_charging,
        plug = ?state.plug,
        "read charging state"
    );
    state
}

/// Scan a sysfs-style power supply directory. Online mains, USB and
/// wireless supplies set the plug type; a battery reporting "Charging"
/// sets `is_charging`.
pub fn read_charging_from(dir: &Path) -> ChargingState {
    let mut state = ChargingState::unplugged();
    let Ok(entries) = std::fs::read_dir(dir) else {
        return state;
    };

    for entry in entries.flatten() {
        let supply = entry.path();
        let Some(kind) = read_attr(&supply, "type") else {
            continue;
        };
        if kind.eq_ignore_ascii_case("battery") {
            if read_attr(&supply, "status").as_deref() == Some("Charging") {
                state.is_charging = true;
            }
        } else if read_attr(&supply, "online").as_deref() == Some("1") {
            if let Ok(plug) = kind.parse::<PlugType>() {
                state.plug.get_or_insert(plug);
            }
        }
    }
    state
}

fn read_attr(supply: &Path, name: &str) -> Option<String> {
    std::fs::read_to_string(supply.join(name))
        .ok()
        .map(|s| s.trim().to_string())
}

pub fn read_ssid() -> Option<String> {
    let output = match Command::new("iwgetid").arg("-r").output() {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!(error = %e, "iwgetid unavailable, no SSID");
            return None;
        }
    };
    if !output.status.success() {
        tracing::debug!(status = %output.status, "not connected to a wireless network");
        return None;
    }
    let ssid = String::from_utf8_lossy(&output.stdout).trim().to_string();
    tracing::debug!(ssid = %ssid, "read SSID");
    (!ssid.is_empty()).then_some(ssid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supply(root: &Path, name: &str, attrs: &[(&str, &str)]) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        for (attr, value) in attrs {
            std::fs::write(dir.join(attr), format!("{value}\n")).unwrap();
        }
    }

    #[test]
    fn missing_directory_reads_as_unplugged() {
        let dir = tempfile::tempdir().unwrap();
        let state = read_charging_from(&dir.path().join("nope"));
        assert!(!state.is_plugged_in());
    }

    #[test]
    fn online_mains_is_ac() {
        let dir = tempfile::tempdir().unwrap();
        supply(dir.path(), "AC", &[("type", "Mains"), ("online", "1")]);
        supply(dir.path(), "BAT0", &[("type", "Battery"), ("status", "Full")]);
        let state = read_charging_from(dir.path());
        assert_eq!(state.plug, Some(PlugType::Ac));
        assert!(!state.is_charging);
        assert!(state.is_plugged_in());
    }

    #[test]
    fn offline_supply_and_discharging_battery() {
        let dir = tempfile::tempdir().unwrap();
        supply(dir.path(), "ucsi-source-psy-USBC000:001", &[("type", "USB"), ("online", "0")]);
        supply(dir.path(), "BAT0", &[("type", "Battery"), ("status", "Discharging")]);
        assert!(!read_charging_from(dir.path()).is_plugged_in());
    }

    #[test]
    fn charging_battery_without_online_supply() {
        let dir = tempfile::tempdir().unwrap();
        supply(dir.path(), "BAT1", &[("type", "Battery"), ("status", "Charging")]);
        let state = read_charging_from(dir.path());
        assert!(state.is_charging);
        assert_eq!(state.plug, None);
    }
}
