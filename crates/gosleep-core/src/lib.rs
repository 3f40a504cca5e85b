//! # GoSleep Core Library
//!
//! Core logic for the GoSleep bedtime alarm. Everything the `gosleep` CLI
//! does goes through this crate; the binary only supplies sensors, a
//! clock and somewhere to print alerts.
//!
//! ## Architecture
//!
//! - **Zones**: the night before the next wake-up is split into bedtime
//!   zones (green, yellow, red) whose boundaries follow from the settings
//! - **Policy**: a pure function that picks the next check time and
//!   whether to alert, given the zone and the presence/charging signals
//! - **Monitor**: turns external events into a single rescheduled alarm
//! - **Storage**: SQLite alarm slot and check history, TOML configuration
//!
//! ## Key Components
//!
//! - [`classify`]: which zone an instant falls in
//! - [`decide`]: the rescheduling policy
//! - [`BedtimeMonitor`]: event handling over [`AlarmScheduler`] and [`AlertSink`]
//! - [`Database`]: alarm slot and check log persistence
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod clock;
pub mod error;
pub mod events;
pub mod monitor;
pub mod policy;
pub mod presence;
pub mod settings;
pub mod storage;
pub mod timeline;
pub mod zone;

pub use alarm::{Alert, AlarmScheduler, AlertSink, MemoryAlarmSlot, RecordingAlertSink};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use monitor::{BedtimeMonitor, Outcome};
pub use policy::{clamp_trigger, decide, Decision, DecisionReason, PolicyConfig, Signals};
pub use presence::{is_at_home, ChargingState, Coordinates, PlugType, PresenceObservation};
pub use settings::{parse_time_of_day, GeofenceSettings, Settings};
pub use storage::{CheckRecord, Config, Database, NotificationsConfig};
pub use timeline::{Timeline, TimelineScale};
pub use zone::{classify, next_wake_up, Zone, ZoneBoundaries};
