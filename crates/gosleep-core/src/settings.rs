//! User settings: wake-up time, sleep duration, zone widths and
//! re-check intervals, plus the home definition used for presence.
//!
//! Durations are stored as whole minutes so the TOML file stays
//! hand-editable; the accessors hand out `chrono::Duration`.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::zone::{self, Zone};

/// Longest sleep duration accepted, in minutes.
pub const MAX_SLEEP_DURATION_MIN: u32 = 24 * 60;

/// Default geofence radius in metres.
pub const DEFAULT_GEOFENCE_RADIUS_M: f64 = 100.0;

/// Home area for geofence-based presence.
///
/// Latitude and longitude live in one struct so that they are either
/// both configured or both absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeofenceSettings {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_radius")]
    pub radius_m: f64,
}

impl GeofenceSettings {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            radius_m: DEFAULT_GEOFENCE_RADIUS_M,
        }
    }

    pub fn with_radius(mut self, radius_m: f64) -> Self {
        self.radius_m = radius_m;
        self
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(ValidationError::Coordinate {
                axis: "latitude",
                value: self.latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(ValidationError::Coordinate {
                axis: "longitude",
                value: self.longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        if !(self.radius_m > 0.0) {
            return Err(ValidationError::Radius(self.radius_m));
        }
        Ok(())
    }
}

/// Bedtime settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Wall-clock wake-up time, `"HH:MM"` in the config file.
    #[serde(default = "default_wake_up_time", with = "hhmm")]
    pub wake_up_time: NaiveTime,
    #[serde(default = "default_sleep_duration_min")]
    pub sleep_duration_min: u32,
    /// Width of the green zone (bedtime start to yellow start).
    #[serde(default = "default_zone_min")]
    pub green_zone_min: u32,
    /// Width of the yellow zone (yellow start to red start).
    #[serde(default = "default_zone_min")]
    pub yellow_zone_min: u32,
    #[serde(default = "default_green_interval_min")]
    pub green_interval_min: u32,
    #[serde(default = "default_yellow_interval_min")]
    pub yellow_interval_min: u32,
    #[serde(default = "default_red_interval_min")]
    pub red_interval_min: u32,
    #[serde(default)]
    pub home_wifi_ssid: Option<String>,
    #[serde(default)]
    pub home_geofence: Option<GeofenceSettings>,
    #[serde(default)]
    pub lock_settings_during_bedtime: bool,
}

fn default_wake_up_time() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN)
}
fn default_sleep_duration_min() -> u32 {
    8 * 60
}
fn default_zone_min() -> u32 {
    30
}
fn default_green_interval_min() -> u32 {
    15
}
fn default_yellow_interval_min() -> u32 {
    10
}
fn default_red_interval_min() -> u32 {
    5
}
fn default_radius() -> f64 {
    DEFAULT_GEOFENCE_RADIUS_M
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wake_up_time: default_wake_up_time(),
            sleep_duration_min: default_sleep_duration_min(),
            green_zone_min: default_zone_min(),
            yellow_zone_min: default_zone_min(),
            green_interval_min: default_green_interval_min(),
            yellow_interval_min: default_yellow_interval_min(),
            red_interval_min: default_red_interval_min(),
            home_wifi_ssid: None,
            home_geofence: None,
            lock_settings_during_bedtime: false,
        }
    }
}

impl Settings {
    pub fn sleep_duration(&self) -> Duration {
        Duration::minutes(self.sleep_duration_min as i64)
    }

    pub fn green_zone(&self) -> Duration {
        Duration::minutes(self.green_zone_min as i64)
    }

    pub fn yellow_zone(&self) -> Duration {
        Duration::minutes(self.yellow_zone_min as i64)
    }

    /// Re-check interval while in `zone`. `Zone::None` has no interval;
    /// the next check is pinned to bedtime start instead.
    pub fn interval_for(&self, zone: Zone) -> Option<Duration> {
        let minutes = match zone {
            Zone::None => return None,
            Zone::Green => self.green_interval_min,
            Zone::Yellow => self.yellow_interval_min,
            Zone::Red => self.red_interval_min,
        };
        Some(Duration::minutes(minutes as i64))
    }

    /// Check the invariants that the type system doesn't already cover.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sleep_duration_min == 0 || self.sleep_duration_min > MAX_SLEEP_DURATION_MIN {
            return Err(ValidationError::SleepDuration {
                minutes: self.sleep_duration_min,
            });
        }
        if let Some(ssid) = &self.home_wifi_ssid {
            if ssid.trim().is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: "home_wifi_ssid".into(),
                    message: "SSID must not be blank".into(),
                });
            }
        }
        if let Some(geofence) = &self.home_geofence {
            geofence.validate()?;
        }
        Ok(())
    }

    /// True when edits should be refused: the lock flag is on and a
    /// bedtime zone is active.
    pub fn is_locked<Tz: TimeZone>(&self, now: DateTime<Utc>, tz: &Tz) -> bool {
        self.lock_settings_during_bedtime && zone::classify(self, now, tz) != Zone::None
    }
}

/// `"HH:MM"` serde representation for `NaiveTime`. Seconds are accepted
/// on input but never written.
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, String> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
            .map_err(|_| format!("invalid time of day '{raw}', expected HH:MM"))
    }
}

pub use hhmm::parse as parse_time_of_day;
