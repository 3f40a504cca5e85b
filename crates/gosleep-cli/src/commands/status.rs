use chrono::{DateTime, Local, Utc};
use clap::Args;
use gosleep_core::{AlarmScheduler, Clock, Config, Database, Timeline};

use super::{clock_for, parse_instant, CmdResult};

const BAR_WIDTH: usize = 48;

#[derive(Args)]
pub struct StatusArgs {
    /// Evaluate at this instant instead of now (RFC 3339)
    #[arg(long, value_parser = parse_instant)]
    pub at: Option<DateTime<Utc>>,
    /// Draw the zones as a bar ending at wake-up
    #[arg(long)]
    pub bar: bool,
    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: StatusArgs) -> CmdResult {
    let config = Config::load()?;
    let db = Database::open()?;
    let now = clock_for(args.at).now();
    let timeline = Timeline::compute(&config.settings, now, &Local);
    let pending = db.next_alarm()?;
    let locked = config.settings.is_locked(now, &Local);

    if args.json {
        let json = serde_json::json!({
            "timeline": timeline,
            "next_alarm": pending,
            "settings_locked": locked,
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!("Zone:        {} ({})", timeline.zone, timeline.zone.headline());
    println!("Bedtime:     {}", timeline.bedtime_label);
    println!("Wake-up:     {}", timeline.wake_up_label);
    println!("Sleep left:  {}", timeline.sleep_left_label);
    match pending {
        Some(t) => println!(
            "Next check:  {}",
            t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("Next check:  none scheduled"),
    }
    if locked {
        println!("Settings:    locked until wake-up");
    }
    if args.bar {
        println!();
        println!("{}", render_bar(&timeline, BAR_WIDTH));
    }
    Ok(())
}

/// `.` before bedtime, `g`/`y`/`r` for the zones, `|` for now.
fn render_bar(timeline: &Timeline, width: usize) -> String {
    let now_cell = ((timeline.now_pos * (width - 1) as f64).round() as usize).min(width - 1);
    let cells: String = (0..width)
        .map(|i| {
            if i == now_cell {
                return '|';
            }
            let p = (i as f64 + 0.5) / width as f64;
            if p < timeline.bedtime_pos {
                '.'
            } else if p < timeline.yellow_pos {
                'g'
            } else if p < timeline.red_pos {
                'y'
            } else {
                'r'
            }
        })
        .collect();
    format!("[{cells}] {}", timeline.wake_up_label)
}
