//! Outbound collaborators: the single pending alarm slot and the alert
//! channel.
//!
//! At most one trigger is pending at a time. Setting a new one replaces
//! whatever was scheduled before; there is no separate cancel-then-set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::zone::Zone;

/// One-shot alarm scheduler with a single slot.
pub trait AlarmScheduler {
    /// Overwrite the pending trigger.
    fn set_alarm(&mut self, trigger_at: DateTime<Utc>) -> Result<()>;

    /// The currently pending trigger, if any.
    fn next_alarm(&self) -> Result<Option<DateTime<Utc>>>;

    /// Drop the pending trigger.
    fn clear_alarm(&mut self) -> Result<()>;
}

/// In-memory slot, used by tests and by callers that persist elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryAlarmSlot {
    pending: Option<DateTime<Utc>>,
    /// Number of times the slot has been written.
    pub writes: usize,
}

impl MemoryAlarmSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<DateTime<Utc>> {
        self.pending
    }
}

impl AlarmScheduler for MemoryAlarmSlot {
    fn set_alarm(&mut self, trigger_at: DateTime<Utc>) -> Result<()> {
        self.pending = Some(trigger_at);
        self.writes += 1;
        Ok(())
    }

    fn next_alarm(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.pending)
    }

    fn clear_alarm(&mut self) -> Result<()> {
        self.pending = None;
        Ok(())
    }
}

/// A user-facing nag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub zone: Zone,
    pub title: String,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub const TITLE: &'static str = "Go sleep";

    pub fn for_zone(zone: Zone, raised_at: DateTime<Utc>) -> Self {
        Self {
            zone,
            title: Self::TITLE.to_string(),
            message: zone.alert_message().to_string(),
            raised_at,
        }
    }
}

/// Delivers alerts to the user (notification, full-screen, sound...).
pub trait AlertSink {
    fn raise(&mut self, alert: &Alert) -> Result<()>;
}

/// Keeps every alert it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlertSink {
    pub alerts: Vec<Alert>,
}

impl AlertSink for RecordingAlertSink {
    fn raise(&mut self, alert: &Alert) -> Result<()> {
        self.alerts.push(alert.clone());
        Ok(())
    }
}
