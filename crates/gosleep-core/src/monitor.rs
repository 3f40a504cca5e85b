//! Bedtime monitor: turns an external event into the next alarm and an
//! optional alert.
//!
//! Every event produces the same output pair (next trigger, alert?), so
//! the caller can treat them uniformly:
//!
//! ```ignore
//! let monitor = BedtimeMonitor::new(SystemClock, Local, config.policy.clone());
//! let outcome = monitor.handle(Event::AlarmFired, &settings, &signals, &mut db, &mut sink)?;
//! ```

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::{Alert, AlarmScheduler, AlertSink};
use crate::clock::Clock;
use crate::error::Result;
use crate::events::Event;
use crate::policy::{self, Decision, PolicyConfig, Signals};
use crate::settings::Settings;
use crate::zone::{self, Zone};

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub event: Event,
    pub evaluated_at: DateTime<Utc>,
    pub zone: Zone,
    /// Policy result; only present for `AlarmFired`.
    pub decision: Option<Decision>,
    /// Trigger handed to the scheduler, already clamped into the future.
    pub next_check: DateTime<Utc>,
    pub alert: Option<Zone>,
}

pub struct BedtimeMonitor<C, Tz> {
    clock: C,
    tz: Tz,
    policy: PolicyConfig,
}

impl<C: Clock, Tz: TimeZone> BedtimeMonitor<C, Tz> {
    pub fn new(clock: C, tz: Tz, policy: PolicyConfig) -> Self {
        Self { clock, tz, policy }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn time_zone(&self) -> &Tz {
        &self.tz
    }

    pub fn policy(&self) -> &PolicyConfig {
        &self.policy
    }

    /// Evaluate without touching any collaborator.
    pub fn evaluate(&self, event: Event, settings: &Settings, signals: &Signals) -> Outcome {
        let now = self.clock.now();
        let zone = zone::classify(settings, now, &self.tz);

        let (decision, trigger) = match event {
            Event::AlarmFired => {
                let decision = policy::decide(settings, now, &self.tz, signals, &self.policy);
                (Some(decision), decision.next_check)
            }
            Event::BootCompleted => (None, now + secs(self.policy.boot_delay_secs)),
            Event::GeofenceEntered => (None, now + secs(self.policy.geofence_delay_secs)),
            Event::SettingsChanged => (None, now + secs(self.policy.settings_change_delay_secs)),
            Event::PowerConnected { .. } | Event::PowerDisconnected => {
                (None, now + secs(self.policy.power_change_delay_secs))
            }
        };

        Outcome {
            event,
            evaluated_at: now,
            zone,
            alert: decision.and_then(|d| d.alert),
            decision,
            next_check: policy::clamp_trigger(trigger, now, self.policy.clamp_buffer()),
        }
    }

    /// Evaluate, reschedule, and raise the alert if one is due.
    ///
    /// A failed alert is logged and otherwise ignored so the next check is
    /// still in place; a failed reschedule is returned to the caller.
    pub fn handle(
        &self,
        event: Event,
        settings: &Settings,
        signals: &Signals,
        scheduler: &mut dyn AlarmScheduler,
        alerts: &mut dyn AlertSink,
    ) -> Result<Outcome> {
        let outcome = self.evaluate(event, settings, signals);

        tracing::info!(
            event = event.name(),
            zone = %outcome.zone,
            at_home = signals.at_home,
            plugged_in = signals.charging.is_plugged_in(),
            reason = outcome.decision.map(|d| d.reason.as_str()).unwrap_or("rescheduled"),
            next_check = %outcome.next_check,
            "bedtime check"
        );

        if let Some(zone) = outcome.alert {
            let alert = Alert::for_zone(zone, outcome.evaluated_at);
            if let Err(e) = alerts.raise(&alert) {
                tracing::warn!(zone = %zone, error = %e, "failed to deliver alert");
            }
        }

        scheduler.set_alarm(outcome.next_check)?;
        Ok(outcome)
    }
}

fn secs(n: u32) -> Duration {
    Duration::seconds(n as i64)
}
