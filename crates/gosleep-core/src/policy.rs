//! Rescheduling policy: given the current zone and the presence/charging
//! signals, decide whether to alert now and when to check again.
//!
//! ## Rules (first applicable wins)
//!
//! 1. Not bedtime: check again just after bedtime starts.
//! 2. Away from home: retry after `away_retry_min`, no alert.
//! 3. Home and plugged in: assume the user is in bed, skip to the next
//!    day's bedtime.
//! 4. Home and unplugged: alert, then re-check after the zone's interval.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::presence::ChargingState;
use crate::settings::Settings;
use crate::zone::{same_time_next_day, Zone, ZoneBoundaries};

/// Timing knobs for the policy and the event handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Offset past bedtime start so the first check lands inside Green.
    #[serde(default = "default_bedtime_epsilon_secs")]
    pub bedtime_epsilon_secs: u32,
    #[serde(default = "default_away_retry_min")]
    pub away_retry_min: u32,
    /// Applied when a computed trigger is not in the future.
    #[serde(default = "default_clamp_buffer_secs")]
    pub clamp_buffer_secs: u32,
    #[serde(default = "default_boot_delay_secs")]
    pub boot_delay_secs: u32,
    #[serde(default = "default_geofence_delay_secs")]
    pub geofence_delay_secs: u32,
    #[serde(default = "default_settings_change_delay_secs")]
    pub settings_change_delay_secs: u32,
    #[serde(default = "default_power_change_delay_secs")]
    pub power_change_delay_secs: u32,
}

fn default_bedtime_epsilon_secs() -> u32 {
    1
}
fn default_away_retry_min() -> u32 {
    60
}
fn default_clamp_buffer_secs() -> u32 {
    10
}
fn default_boot_delay_secs() -> u32 {
    60
}
fn default_geofence_delay_secs() -> u32 {
    1
}
fn default_settings_change_delay_secs() -> u32 {
    10
}
fn default_power_change_delay_secs() -> u32 {
    1
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            bedtime_epsilon_secs: default_bedtime_epsilon_secs(),
            away_retry_min: default_away_retry_min(),
            clamp_buffer_secs: default_clamp_buffer_secs(),
            boot_delay_secs: default_boot_delay_secs(),
            geofence_delay_secs: default_geofence_delay_secs(),
            settings_change_delay_secs: default_settings_change_delay_secs(),
            power_change_delay_secs: default_power_change_delay_secs(),
        }
    }
}

impl PolicyConfig {
    pub fn bedtime_epsilon(&self) -> Duration {
        Duration::seconds(self.bedtime_epsilon_secs as i64)
    }

    pub fn away_retry(&self) -> Duration {
        Duration::minutes(self.away_retry_min as i64)
    }

    pub fn clamp_buffer(&self) -> Duration {
        Duration::seconds(self.clamp_buffer_secs as i64)
    }
}

/// Externally observed signals, sampled at decision time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signals {
    pub at_home: bool,
    #[serde(default)]
    pub charging: ChargingState,
}

/// Why the policy picked its next check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    NotBedtime,
    Away,
    InBed,
    Alert,
}

impl DecisionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DecisionReason::NotBedtime => "not_bedtime",
            DecisionReason::Away => "away",
            DecisionReason::InBed => "in_bed",
            DecisionReason::Alert => "alert",
        }
    }
}

/// Result of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub zone: Zone,
    pub next_check: DateTime<Utc>,
    /// Zone to alert for, set only when the user should be nagged now.
    pub alert: Option<Zone>,
    pub reason: DecisionReason,
}

impl Decision {
    pub fn should_alert(&self) -> bool {
        self.alert.is_some()
    }
}

/// Evaluate the rescheduling policy at `now`.
pub fn decide<Tz: TimeZone>(
    settings: &Settings,
    now: DateTime<Utc>,
    tz: &Tz,
    signals: &Signals,
    config: &PolicyConfig,
) -> Decision {
    let boundaries = ZoneBoundaries::compute(settings, now, tz);
    let zone = boundaries.zone_at(now);

    let Some(interval) = settings.interval_for(zone) else {
        return Decision {
            zone,
            next_check: boundaries.bedtime_start + config.bedtime_epsilon(),
            alert: None,
            reason: DecisionReason::NotBedtime,
        };
    };

    if !signals.at_home {
        return Decision {
            zone,
            next_check: now + config.away_retry(),
            alert: None,
            reason: DecisionReason::Away,
        };
    }

    if signals.charging.is_plugged_in() {
        let tomorrow = ZoneBoundaries::compute(settings, same_time_next_day(now, tz), tz);
        return Decision {
            zone,
            next_check: tomorrow.bedtime_start + config.bedtime_epsilon(),
            alert: None,
            reason: DecisionReason::InBed,
        };
    }

    Decision {
        zone,
        next_check: now + interval,
        alert: Some(zone),
        reason: DecisionReason::Alert,
    }
}

/// Platform alarm APIs reject trigger times in the past. Push anything
/// not strictly after `now` to `now + buffer`.
pub fn clamp_trigger(trigger: DateTime<Utc>, now: DateTime<Utc>, buffer: Duration) -> DateTime<Utc> {
    if trigger > now {
        return trigger;
    }
    tracing::warn!(
        trigger = %trigger,
        now = %now,
        buffer_secs = buffer.num_seconds(),
        "computed trigger is not in the future, clamping"
    );
    now + buffer
}
