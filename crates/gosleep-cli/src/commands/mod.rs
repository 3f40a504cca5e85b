pub mod check;
pub mod config;
pub mod event;
pub mod history;
pub mod home;
pub mod run;
pub mod status;
pub mod zone;

use chrono::{DateTime, Local, Utc};
use clap::Args;
use gosleep_core::{
    is_at_home, BedtimeMonitor, ChargingState, Clock, Config, ConfigError, Coordinates, Database,
    Event, FixedClock, PlugType, PresenceObservation, Settings, Signals, SystemClock,
};

use crate::notify::TerminalAlertSink;
use crate::sensors;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Parse an RFC 3339 timestamp given on the command line.
pub fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp (e.g. 2024-03-04T23:15:00+01:00): {e}"))
}

/// `--at` pins the clock for the command; otherwise the system clock is used.
pub fn clock_for(at: Option<DateTime<Utc>>) -> Box<dyn Clock> {
    match at {
        Some(t) => Box::new(FixedClock::new(t)),
        None => Box::new(SystemClock),
    }
}

/// Presence and charging overrides. Anything not given is read from the
/// local sensors.
#[derive(Args, Debug, Default, Clone)]
pub struct SignalArgs {
    /// Treat the user as at home
    #[arg(long, conflicts_with = "away")]
    pub home: bool,
    /// Treat the user as away from home
    #[arg(long)]
    pub away: bool,
    /// Current Wi-Fi network instead of asking the system
    #[arg(long)]
    pub ssid: Option<String>,
    /// Current latitude, checked against the home geofence
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Current longitude
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
    /// Treat the device as charging
    #[arg(long, conflicts_with = "unplugged")]
    pub charging: bool,
    /// Treat the device as unplugged
    #[arg(long, conflicts_with = "plug")]
    pub unplugged: bool,
    /// Plug type (ac, usb, wireless); implies plugged in
    #[arg(long)]
    pub plug: Option<PlugType>,
}

impl SignalArgs {
    pub fn location(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }

    pub fn resolve(&self, settings: &Settings) -> Signals {
        let at_home = if self.home {
            true
        } else if self.away {
            false
        } else {
            let observed = PresenceObservation {
                ssid: self.ssid.clone().or_else(sensors::read_ssid),
                location: self.location(),
            };
            is_at_home(settings, &observed)
        };

        let charging = if self.unplugged {
            ChargingState::unplugged()
        } else if self.charging || self.plug.is_some() {
            ChargingState {
                is_charging: self.charging,
                plug: self.plug,
            }
        } else {
            sensors::read_charging()
        };

        Signals { at_home, charging }
    }
}

/// Refuse edits while the settings lock is active.
pub fn ensure_unlocked(config: &Config) -> Result<(), ConfigError> {
    let now = Utc::now();
    if config.settings.is_locked(now, &Local) {
        let zone = gosleep_core::classify(&config.settings, now, &Local);
        return Err(ConfigError::Locked { zone });
    }
    Ok(())
}

/// Pull the next check forward after a settings edit so it runs against
/// the new values. Presence and charging come from the sensors.
pub fn reschedule_after_settings_change(config: &Config) -> CmdResult {
    let mut db = Database::open()?;
    let mut sink = TerminalAlertSink::new(config.notifications.clone());
    let monitor = BedtimeMonitor::new(SystemClock, Local, config.policy.clone());
    let signals = SignalArgs::default().resolve(&config.settings);
    let outcome = monitor.handle(
        Event::SettingsChanged,
        &config.settings,
        &signals,
        &mut db,
        &mut sink,
    )?;
    db.record_check(&outcome, &signals)?;
    Ok(())
}
