//! Long-lived monitor: waits for the pending alarm, polls the sensors in
//! between, and turns sensor changes into events.

use std::time::Duration;

use chrono::{Local, Utc};
use clap::Args;
use gosleep_core::{
    AlarmScheduler, BedtimeMonitor, Config, Database, Event, Signals, SystemClock,
};
use tokio::time::{sleep_until, Instant};

use super::{CmdResult, SignalArgs};
use crate::notify::TerminalAlertSink;

const IDLE_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Args)]
pub struct RunArgs {
    /// Seconds between sensor polls
    #[arg(long, default_value = "30")]
    pub poll_secs: u64,
    /// Fixed latitude for geofence checks (no GPS on the desktop)
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,
    /// Fixed longitude for geofence checks
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

pub fn run(args: RunArgs) -> CmdResult {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(monitor_loop(args))
}

/// Sensor change between two polls that the monitor should hear about.
fn signal_event(previous: &Signals, current: &Signals) -> Option<Event> {
    let was_plugged = previous.charging.is_plugged_in();
    let is_plugged = current.charging.is_plugged_in();
    if !was_plugged && is_plugged {
        return Some(Event::PowerConnected {
            plug: current.charging.plug,
        });
    }
    if was_plugged && !is_plugged {
        return Some(Event::PowerDisconnected);
    }
    if !previous.at_home && current.at_home {
        return Some(Event::GeofenceEntered);
    }
    None
}

struct Monitor {
    config: Config,
    db: Database,
    sink: TerminalAlertSink,
    sensors: SignalArgs,
}

impl Monitor {
    fn sample(&self) -> Signals {
        self.sensors.resolve(&self.config.settings)
    }

    fn handle(&mut self, event: Event, signals: &Signals) -> CmdResult {
        let monitor = BedtimeMonitor::new(SystemClock, Local, self.config.policy.clone());
        let outcome = monitor.handle(
            event,
            &self.config.settings,
            signals,
            &mut self.db,
            &mut self.sink,
        )?;
        self.db.record_check(&outcome, signals)?;
        Ok(())
    }

    /// Pick up edits made from another shell. True when anything changed.
    fn reload_config(&mut self) -> bool {
        match Config::load() {
            Ok(fresh) if fresh != self.config => {
                self.sink = TerminalAlertSink::new(fresh.notifications.clone());
                self.config = fresh;
                true
            }
            Ok(_) => false,
            Err(e) => {
                tracing::warn!(error = %e, "keeping previous configuration");
                false
            }
        }
    }

    fn deadline(&self) -> Result<Instant, Box<dyn std::error::Error>> {
        let wait = match self.db.next_alarm()? {
            Some(at) => (at - Utc::now()).to_std().unwrap_or(Duration::ZERO),
            // Nothing pending; the next poll re-arms.
            None => IDLE_WAIT,
        };
        Ok(Instant::now() + wait)
    }
}

async fn monitor_loop(args: RunArgs) -> CmdResult {
    let sensors = SignalArgs {
        lat: args.lat,
        lon: args.lon,
        ..SignalArgs::default()
    };
    let config = Config::load()?;
    let mut monitor = Monitor {
        sink: TerminalAlertSink::new(config.notifications.clone()),
        db: Database::open()?,
        config,
        sensors,
    };

    tracing::info!(poll_secs = args.poll_secs, "monitor started");
    let mut signals = monitor.sample();
    monitor.handle(Event::BootCompleted, &signals)?;

    let mut poll = tokio::time::interval(Duration::from_secs(args.poll_secs.max(1)));
    poll.tick().await;

    loop {
        let deadline = monitor.deadline()?;
        tokio::select! {
            _ = sleep_until(deadline) => {
                monitor.reload_config();
                signals = monitor.sample();
                monitor.handle(Event::AlarmFired, &signals)?;
            }
            _ = poll.tick() => {
                if monitor.reload_config() {
                    monitor.handle(Event::SettingsChanged, &signals)?;
                }
                let current = monitor.sample();
                if let Some(event) = signal_event(&signals, &current) {
                    monitor.handle(event, &current)?;
                }
                if monitor.db.next_alarm()?.is_none() {
                    monitor.handle(Event::BootCompleted, &current)?;
                }
                signals = current;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("monitor stopped");
                break;
            }
        }
    }
    Ok(())
}
