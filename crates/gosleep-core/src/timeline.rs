//! Zone geometry for progress displays.
//!
//! Maps the zone boundaries onto a rolling window that ends at the next
//! wake-up: position 1.0 is the wake-up, 0.0 is one window length
//! earlier. The window is 12 hours when the wake-up is less than 12 hours
//! away, otherwise 24.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::zone::{Zone, ZoneBoundaries};

const MINUTES_PER_DAY: i64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineScale {
    TwelveHours,
    TwentyFourHours,
}

impl TimelineScale {
    pub fn minutes(self) -> i64 {
        match self {
            TimelineScale::TwelveHours => 12 * 60,
            TimelineScale::TwentyFourHours => MINUTES_PER_DAY,
        }
    }

    fn for_minutes_until_wake_up(minutes: i64) -> Self {
        if minutes < 12 * 60 {
            TimelineScale::TwelveHours
        } else {
            TimelineScale::TwentyFourHours
        }
    }
}

/// Normalized positions (0.0..=1.0) of the boundaries and of "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub zone: Zone,
    pub scale: TimelineScale,
    pub boundaries: ZoneBoundaries,
    pub bedtime_pos: f64,
    pub yellow_pos: f64,
    pub red_pos: f64,
    pub now_pos: f64,
    /// Local wake-up time, `HH:MM`.
    pub wake_up_label: String,
    /// Local bedtime start, `HH:MM`.
    pub bedtime_label: String,
    /// Remaining sleep opportunity, e.g. `7h 45m`.
    pub sleep_left_label: String,
}

impl Timeline {
    pub fn compute<Tz: TimeZone>(settings: &Settings, now: DateTime<Utc>, tz: &Tz) -> Self {
        let boundaries = ZoneBoundaries::compute(settings, now, tz);
        let minutes_until_wake_up = (boundaries.wake_up - now).num_minutes();
        let scale = TimelineScale::for_minutes_until_wake_up(minutes_until_wake_up);
        let pos = |instant| position(instant, boundaries.wake_up, scale);

        Self {
            zone: boundaries.zone_at(now),
            scale,
            bedtime_pos: pos(boundaries.bedtime_start),
            yellow_pos: pos(boundaries.yellow_start),
            red_pos: pos(boundaries.red_start),
            now_pos: pos(now),
            wake_up_label: hhmm(boundaries.wake_up, tz),
            bedtime_label: hhmm(boundaries.bedtime_start, tz),
            sleep_left_label: format_remaining(boundaries.until_wake_up(now)),
            boundaries,
        }
    }
}

/// Position of `instant` on a window of `scale` ending at `wake_up`.
/// Instants after the wake-up wrap around by a day.
pub fn position(instant: DateTime<Utc>, wake_up: DateTime<Utc>, scale: TimelineScale) -> f64 {
    let mut minutes = (wake_up - instant).num_minutes();
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }
    (1.0 - minutes as f64 / scale.minutes() as f64).clamp(0.0, 1.0)
}

/// `"7h 45m"`, `"45m"`, or `"0m"` once the time is up.
pub fn format_remaining(remaining: Duration) -> String {
    let minutes = remaining.num_minutes();
    if minutes <= 0 {
        return "0m".to_string();
    }
    let (hours, mins) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours}h {mins}m")
    } else {
        format!("{mins}m")
    }
}

fn hhmm<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> String {
    instant.with_timezone(tz).naive_local().format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn scale_depends_on_distance_to_wake_up() {
        let s = Settings::default();
        // 22:00 -> 07:00 is 9 hours.
        assert_eq!(Timeline::compute(&s, at(22, 0), &Utc).scale, TimelineScale::TwelveHours);
        // 12:00 -> 07:00 is 19 hours.
        assert_eq!(
            Timeline::compute(&s, at(12, 0), &Utc).scale,
            TimelineScale::TwentyFourHours
        );
    }

    #[test]
    fn positions_on_twelve_hour_scale() {
        let t = Timeline::compute(&Settings::default(), at(22, 0), &Utc);
        // Bedtime 23:00 is 8h before wake-up: 1 - 480/720.
        assert!((t.bedtime_pos - (1.0 - 480.0 / 720.0)).abs() < 1e-9);
        assert!((t.yellow_pos - (1.0 - 450.0 / 720.0)).abs() < 1e-9);
        assert!((t.red_pos - (1.0 - 420.0 / 720.0)).abs() < 1e-9);
        assert!((t.now_pos - (1.0 - 540.0 / 720.0)).abs() < 1e-9);
        assert!(t.bedtime_pos < t.yellow_pos && t.yellow_pos < t.red_pos);
    }

    #[test]
    fn positions_are_clamped() {
        let wake = at(7, 0);
        // 20 hours before wake-up does not fit a 12 hour window.
        assert_eq!(position(wake - Duration::hours(20), wake, TimelineScale::TwelveHours), 0.0);
        assert_eq!(position(wake, wake, TimelineScale::TwelveHours), 1.0);
    }

    #[test]
    fn instants_after_wake_up_wrap_by_a_day() {
        let wake = at(7, 0);
        let p = position(wake + Duration::hours(1), wake, TimelineScale::TwentyFourHours);
        assert!((p - 1.0 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn labels() {
        let t = Timeline::compute(&Settings::default(), at(23, 15), &Utc);
        assert_eq!(t.wake_up_label, "07:00");
        assert_eq!(t.bedtime_label, "23:00");
        assert_eq!(t.sleep_left_label, "7h 45m");
        assert_eq!(t.zone, Zone::Green);
    }

    #[test]
    fn remaining_formatting() {
        assert_eq!(format_remaining(Duration::minutes(45)), "45m");
        assert_eq!(format_remaining(Duration::minutes(60)), "1h 0m");
        assert_eq!(format_remaining(Duration::zero()), "0m");
        assert_eq!(format_remaining(Duration::minutes(-5)), "0m");
    }
}
