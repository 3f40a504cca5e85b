use chrono::{DateTime, Local, Utc};
use clap::Args;
use gosleep_core::{Clock, Config, ZoneBoundaries};

use super::{clock_for, parse_instant, CmdResult};

#[derive(Args)]
pub struct ZoneArgs {
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
}

pub fn run(args: ZoneArgs) -> CmdResult {
    let config = Config::load()?;
    let now = clock_for(args.at).now();
    let boundaries = ZoneBoundaries::compute(&config.settings, now, &Local);
    let zone = boundaries.zone_at(now);

    let json = serde_json::json!({
        "at": now,
        "zone": zone,
        "headline": zone.headline(),
        "boundaries": boundaries,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
