//! Bedtime zone classification.
//!
//! Zones escalate with how far past bedtime the current instant is:
//!
//! ```text
//!  None          Green          Yellow          Red
//! ------|bedtime_start|----|yellow_start|----|red_start|------> wake_up
//! ```
//!
//! Boundaries are derived from the *next* wake-up: today's wake-up time
//! if the local clock hasn't reached it yet, otherwise tomorrow's.
//! Everything here is a pure function of (settings, instant, time zone).

use std::fmt;

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// Escalation stage. Ordered by severity: `None < Green < Yellow < Red`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    /// Not bedtime yet.
    None,
    Green,
    Yellow,
    Red,
}

impl Zone {
    pub fn as_str(self) -> &'static str {
        match self {
            Zone::None => "none",
            Zone::Green => "green",
            Zone::Yellow => "yellow",
            Zone::Red => "red",
        }
    }

    /// Short status line for status displays.
    pub fn headline(self) -> &'static str {
        match self {
            Zone::None => "Not bedtime yet",
            Zone::Green => "Time to get ready for bed",
            Zone::Yellow => "You should be in bed by now",
            Zone::Red => "You're significantly past bedtime",
        }
    }

    /// Body text of the alert raised in this zone.
    pub fn alert_message(self) -> &'static str {
        match self {
            Zone::None => "No alarm",
            Zone::Green => "It's bedtime! Time to prepare for sleep.",
            Zone::Yellow => "You should be in bed by now!",
            Zone::Red => "GO TO SLEEP NOW!",
        }
    }

    pub fn is_bedtime(self) -> bool {
        self != Zone::None
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The instants that delimit the zones for one night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneBoundaries {
    pub wake_up: DateTime<Utc>,
    pub bedtime_start: DateTime<Utc>,
    pub yellow_start: DateTime<Utc>,
    pub red_start: DateTime<Utc>,
}

impl ZoneBoundaries {
    /// Compute the boundaries of the night that ends at the next wake-up
    /// after `now`, interpreting the wake-up time in `tz`.
    pub fn compute<Tz: TimeZone>(settings: &Settings, now: DateTime<Utc>, tz: &Tz) -> Self {
        let wake_up = next_wake_up(settings, now, tz);
        let bedtime_start = wake_up - settings.sleep_duration();
        let yellow_start = bedtime_start + settings.green_zone();
        let red_start = yellow_start + settings.yellow_zone();
        Self {
            wake_up,
            bedtime_start,
            yellow_start,
            red_start,
        }
    }

    /// Zone of `now` relative to these boundaries. First match wins.
    pub fn zone_at(&self, now: DateTime<Utc>) -> Zone {
        if now < self.bedtime_start {
            Zone::None
        } else if now < self.yellow_start {
            Zone::Green
        } else if now < self.red_start {
            Zone::Yellow
        } else {
            Zone::Red
        }
    }

    /// Time left until wake-up, never negative.
    pub fn until_wake_up(&self, now: DateTime<Utc>) -> Duration {
        (self.wake_up - now).max(Duration::zero())
    }
}

/// Classify `now` into a bedtime zone.
pub fn classify<Tz: TimeZone>(settings: &Settings, now: DateTime<Utc>, tz: &Tz) -> Zone {
    ZoneBoundaries::compute(settings, now, tz).zone_at(now)
}

/// The next occurrence of the configured wake-up time: today if the local
/// wall clock is strictly before it, tomorrow otherwise.
pub fn next_wake_up<Tz: TimeZone>(settings: &Settings, now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    let local_now = now.with_timezone(tz).naive_local();
    let today = local_now.date().and_time(settings.wake_up_time);
    let target = if local_now < today {
        today
    } else {
        today + Duration::days(1)
    };
    resolve_local(tz, target)
}

/// The same local wall-clock time one calendar day later. Across a DST
/// change this is 23 or 25 hours away, not 24.
pub(crate) fn same_time_next_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> DateTime<Utc> {
    resolve_local(tz, now.with_timezone(tz).naive_local() + Duration::days(1))
}

/// Map a local wall-clock time to an instant.
///
/// Ambiguous times (clocks going back) resolve to the earlier instant.
/// Times inside a spring-forward gap are shifted one hour later.
pub(crate) fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(t) => t.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => match tz.from_local_datetime(&(local + Duration::hours(1))) {
            LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t.with_timezone(&Utc),
            LocalResult::None => Utc.from_utc_datetime(&local),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveTime, Timelike};
    use chrono_tz::America::New_York;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn zone_order_is_severity() {
        assert!(Zone::None < Zone::Green);
        assert!(Zone::Green < Zone::Yellow);
        assert!(Zone::Yellow < Zone::Red);
        assert_eq!(Zone::Red.max(Zone::Green), Zone::Red);
    }

    #[test]
    fn zone_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Zone::Yellow).unwrap(), "\"yellow\"");
        let z: Zone = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(z, Zone::None);
    }

    #[test]
    fn wake_up_is_today_before_wake_time() {
        let s = Settings::default();
        assert_eq!(next_wake_up(&s, at(6, 59), &Utc), at(7, 0));
    }

    #[test]
    fn wake_up_rolls_to_tomorrow_at_or_after_wake_time() {
        let s = Settings::default();
        let tomorrow = at(7, 0) + Duration::days(1);
        assert_eq!(next_wake_up(&s, at(7, 0), &Utc), tomorrow);
        assert_eq!(next_wake_up(&s, at(22, 0), &Utc), tomorrow);
    }

    #[test]
    fn boundaries_follow_zone_widths() {
        let s = Settings {
            green_zone_min: 20,
            yellow_zone_min: 40,
            ..Settings::default()
        };
        let b = ZoneBoundaries::compute(&s, at(12, 0), &Utc);
        assert_eq!(b.bedtime_start, at(23, 0));
        assert_eq!(b.yellow_start, at(23, 20));
        assert_eq!(b.red_start, at(23, 0) + Duration::hours(1));
    }

    #[test]
    fn red_lasts_until_wake_up() {
        let s = Settings::default();
        assert_eq!(classify(&s, at(6, 59), &Utc), Zone::Red);
        assert_eq!(classify(&s, at(7, 0), &Utc), Zone::None);
    }

    #[test]
    fn zone_edges_are_half_open() {
        let s = Settings::default();
        let b = ZoneBoundaries::compute(&s, at(12, 0), &Utc);
        assert_eq!(b.zone_at(b.bedtime_start - Duration::seconds(1)), Zone::None);
        assert_eq!(b.zone_at(b.bedtime_start), Zone::Green);
        assert_eq!(b.zone_at(b.yellow_start), Zone::Yellow);
        assert_eq!(b.zone_at(b.red_start), Zone::Red);
    }

    #[test]
    fn zero_width_zones_collapse() {
        let s = Settings {
            green_zone_min: 0,
            yellow_zone_min: 0,
            ..Settings::default()
        };
        assert_eq!(classify(&s, at(23, 0), &Utc), Zone::Red);
    }

    #[test]
    fn wake_up_time_is_local() {
        // UTC+2: 07:00 local is 05:00 UTC.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let s = Settings::default();
        let wake = next_wake_up(&s, at(4, 0), &tz);
        assert_eq!(wake, at(5, 0));
        // 21:30 UTC is 23:30 local: yellow zone.
        assert_eq!(classify(&s, at(21, 30), &tz), Zone::Yellow);
    }

    #[test]
    fn late_wake_up_time_puts_bedtime_after_midnight() {
        let s = Settings {
            wake_up_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            sleep_duration_min: 7 * 60,
            ..Settings::default()
        };
        let b = ZoneBoundaries::compute(&s, at(12, 0), &Utc);
        let next_day = |h, m| at(h, m) + Duration::days(1);
        assert_eq!(b.bedtime_start, next_day(1, 30));
        assert_eq!(b.yellow_start, next_day(2, 0));
        assert_eq!(b.red_start, next_day(2, 30));
    }

    #[test]
    fn wake_up_in_spring_forward_gap_shifts_an_hour() {
        let s = Settings {
            wake_up_time: NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
            ..Settings::default()
        };
        // 2024-03-09 12:00 EST; 02:30 on the 10th does not exist in New York.
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap();
        let wake = next_wake_up(&s, now, &New_York);
        assert_eq!(wake, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
        assert_eq!(wake.with_timezone(&New_York).hour(), 3);
    }

    #[test]
    fn ambiguous_wake_up_takes_earlier_instant() {
        let s = Settings {
            wake_up_time: NaiveTime::from_hms_opt(1, 30, 0).unwrap(),
            ..Settings::default()
        };
        // 01:30 happens twice on 2024-11-03: first at EDT (05:30 UTC).
        let now = Utc.with_ymd_and_hms(2024, 11, 2, 16, 0, 0).unwrap();
        let wake = next_wake_up(&s, now, &New_York);
        assert_eq!(wake, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }

    #[test]
    fn next_day_keeps_wall_clock_across_dst() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 11, 30, 0).unwrap();
        let next = same_time_next_day(now, &New_York);
        assert_eq!(next - now, Duration::hours(23));
        assert_eq!(next.with_timezone(&New_York).hour(), 6);
    }

    #[test]
    fn until_wake_up_never_negative() {
        let b = ZoneBoundaries::compute(&Settings::default(), at(12, 0), &Utc);
        assert_eq!(b.until_wake_up(b.wake_up + Duration::hours(1)), Duration::zero());
        assert_eq!(b.until_wake_up(b.bedtime_start), Duration::hours(8));
    }
}
