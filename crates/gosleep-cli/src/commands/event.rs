use chrono::{DateTime, Local, Utc};
use clap::{Args, ValueEnum};
use gosleep_core::{BedtimeMonitor, Config, Database, Event, PlugType};

use super::{clock_for, parse_instant, CmdResult, SignalArgs};
use crate::notify::TerminalAlertSink;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum EventKind {
    Boot,
    GeofenceEntered,
    SettingsChanged,
    PowerConnected,
    PowerDisconnected,
}

impl EventKind {
    fn into_event(self, plug: Option<PlugType>) -> Event {
        match self {
            EventKind::Boot => Event::BootCompleted,
            EventKind::GeofenceEntered => Event::GeofenceEntered,
            EventKind::SettingsChanged => Event::SettingsChanged,
            EventKind::PowerConnected => Event::PowerConnected { plug },
            EventKind::PowerDisconnected => Event::PowerDisconnected,
        }
    }
}

#[derive(Args)]
pub struct EventArgs {
    #[arg(value_enum)]
    pub kind: EventKind,
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
    #[command(flatten)]
    pub signals: SignalArgs,
}

pub fn run(args: EventArgs) -> CmdResult {
    let config = Config::load()?;
    let mut db = Database::open()?;
    let mut sink = TerminalAlertSink::new(config.notifications.clone());
    let clock = clock_for(args.at);
    let monitor = BedtimeMonitor::new(&*clock, Local, config.policy.clone());

    let signals = args.signals.resolve(&config.settings);
    let event = args.kind.into_event(args.signals.plug);
    let outcome = monitor.handle(event, &config.settings, &signals, &mut db, &mut sink)?;
    db.record_check(&outcome, &signals)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
