use chrono::{DateTime, Local, Utc};
use clap::Args;
use gosleep_core::{BedtimeMonitor, Config, Database, Event};

use super::{clock_for, parse_instant, CmdResult, SignalArgs};
use crate::notify::TerminalAlertSink;

#[derive(Args)]
pub struct CheckArgs {
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
    #[command(flatten)]
    pub signals: SignalArgs,
}

pub fn run(args: CheckArgs) -> CmdResult {
    let config = Config::load()?;
    let mut db = Database::open()?;
    let mut sink = TerminalAlertSink::new(config.notifications.clone());
    let clock = clock_for(args.at);
    let monitor = BedtimeMonitor::new(&*clock, Local, config.policy.clone());

    let signals = args.signals.resolve(&config.settings);
    let outcome = monitor.handle(
        Event::AlarmFired,
        &config.settings,
        &signals,
        &mut db,
        &mut sink,
    )?;
    db.record_check(&outcome, &signals)?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
