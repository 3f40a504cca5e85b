use chrono::Local;
use clap::Args;
use gosleep_core::Database;

use super::CmdResult;

#[derive(Args)]
pub struct HistoryArgs {
    /// Maximum number of checks to show
    #[arg(long, default_value = "20")]
    pub limit: usize,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: HistoryArgs) -> CmdResult {
    let db = Database::open()?;
    let records = db.recent_checks(args.limit)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No checks recorded yet.");
        return Ok(());
    }

    for r in &records {
        let flag = |on: bool, label: &'static str| if on { label } else { "-" };
        println!(
            "{}  {:<18} {:<6} {:<11} {:<4} {:<7} {:<5} next {}",
            r.checked_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S"),
            r.event,
            r.zone.as_str(),
            r.reason.as_deref().unwrap_or("-"),
            flag(r.at_home, "home"),
            flag(r.plugged_in, "plugged"),
            flag(r.alerted, "alert"),
            r.next_check.with_timezone(&Local).format("%H:%M:%S"),
        );
    }
    Ok(())
}
