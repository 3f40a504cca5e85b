//! Property tests for zone classification and the rescheduling policy.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use gosleep_core::{
    classify, clamp_trigger, decide, ChargingState, DecisionReason, PlugType, PolicyConfig,
    Settings, Signals, Zone, ZoneBoundaries,
};
use proptest::prelude::*;

fn arb_settings() -> impl Strategy<Value = Settings> {
    (
        0u32..24,
        0u32..60,
        1u32..=1440,
        0u32..180,
        0u32..180,
        0u32..60,
        0u32..60,
        0u32..60,
    )
        .prop_map(|(h, m, sleep, green, yellow, gi, yi, ri)| Settings {
            wake_up_time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            sleep_duration_min: sleep,
            green_zone_min: green,
            yellow_zone_min: yellow,
            green_interval_min: gi,
            yellow_interval_min: yi,
            red_interval_min: ri,
            ..Settings::default()
        })
}

fn arb_instant() -> impl Strategy<Value = DateTime<Utc>> {
    // 2020-01-01 .. 2030-01-01
    (1_577_836_800i64..1_893_456_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn arb_signals() -> impl Strategy<Value = Signals> {
    (any::<bool>(), any::<bool>()).prop_map(|(at_home, plugged)| Signals {
        at_home,
        charging: if plugged {
            ChargingState::plugged(PlugType::Usb)
        } else {
            ChargingState::unplugged()
        },
    })
}

proptest! {
    #[test]
    fn boundaries_are_ordered(settings in arb_settings(), now in arb_instant()) {
        let b = ZoneBoundaries::compute(&settings, now, &Utc);
        prop_assert!(b.bedtime_start <= b.yellow_start);
        prop_assert!(b.yellow_start <= b.red_start);
        prop_assert!(b.bedtime_start < b.wake_up);
        prop_assert!(now < b.wake_up);
        prop_assert!(b.wake_up - now <= Duration::days(1));
    }

    #[test]
    fn before_bedtime_is_never_a_zone(settings in arb_settings(), now in arb_instant()) {
        let b = ZoneBoundaries::compute(&settings, now, &Utc);
        let zone = classify(&settings, now, &Utc);
        prop_assert_eq!(zone == Zone::None, now < b.bedtime_start);
    }

    #[test]
    fn classification_is_deterministic(settings in arb_settings(), now in arb_instant()) {
        prop_assert_eq!(classify(&settings, now, &Utc), classify(&settings, now, &Utc));
    }

    #[test]
    fn alert_only_at_home_and_unplugged(
        settings in arb_settings(),
        now in arb_instant(),
        signals in arb_signals(),
    ) {
        let d = decide(&settings, now, &Utc, &signals, &PolicyConfig::default());
        if let Some(zone) = d.alert {
            prop_assert_eq!(zone, d.zone);
            prop_assert!(zone.is_bedtime());
            prop_assert!(signals.at_home);
            prop_assert!(!signals.charging.is_plugged_in());
            prop_assert_eq!(d.reason, DecisionReason::Alert);
        }
    }

    #[test]
    fn clamped_next_check_is_in_the_future(
        settings in arb_settings(),
        now in arb_instant(),
        signals in arb_signals(),
    ) {
        let config = PolicyConfig::default();
        let d = decide(&settings, now, &Utc, &signals, &config);
        prop_assert!(clamp_trigger(d.next_check, now, config.clamp_buffer()) > now);
    }

    #[test]
    fn not_bedtime_waits_for_bedtime_start(
        settings in arb_settings(),
        now in arb_instant(),
        signals in arb_signals(),
    ) {
        let d = decide(&settings, now, &Utc, &signals, &PolicyConfig::default());
        if d.zone == Zone::None {
            prop_assert!(d.next_check > now);
            prop_assert!(d.alert.is_none());
        }
    }
}
