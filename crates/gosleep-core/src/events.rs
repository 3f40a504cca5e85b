use serde::{Deserialize, Serialize};

use crate::presence::PlugType;

/// Discrete external happenings that make the monitor re-evaluate.
///
/// Only `AlarmFired` runs the full policy; the others pull the next check
/// forward so it runs shortly with fresh signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The pending alarm slot fired.
    AlarmFired,
    /// The device (or the monitor process) just started.
    BootCompleted,
    /// The device entered the home geofence.
    GeofenceEntered,
    /// The user edited their settings.
    SettingsChanged,
    PowerConnected {
        #[serde(default)]
        plug: Option<PlugType>,
    },
    PowerDisconnected,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::AlarmFired => "alarm_fired",
            Event::BootCompleted => "boot_completed",
            Event::GeofenceEntered => "geofence_entered",
            Event::SettingsChanged => "settings_changed",
            Event::PowerConnected { .. } => "power_connected",
            Event::PowerDisconnected => "power_disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_internally_tagged() {
        let json = serde_json::to_string(&Event::PowerConnected {
            plug: Some(PlugType::Usb),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"power_connected","plug":"usb"}"#);

        let parsed: Event = serde_json::from_str(r#"{"type":"boot_completed"}"#).unwrap();
        assert_eq!(parsed, Event::BootCompleted);
        assert_eq!(parsed.name(), "boot_completed");
    }
}
