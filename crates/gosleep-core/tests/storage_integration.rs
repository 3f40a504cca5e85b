//! Integration tests for the persisted alarm slot, check log and config.

use chrono::{DateTime, Duration, TimeZone, Utc};
use gosleep_core::{
    AlarmScheduler, BedtimeMonitor, ChargingState, Config, ConfigError, CoreError, Database,
    Event, FixedClock, PlugType, RecordingAlertSink, Signals, Zone,
};

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
}

#[test]
fn test_monitor_writes_through_to_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gosleep.db");
    let config = Config::default();
    let clock = FixedClock::new(at(23, 35));
    let monitor = BedtimeMonitor::new(&clock, Utc, config.policy.clone());
    let signals = Signals {
        at_home: true,
        charging: ChargingState::unplugged(),
    };

    {
        let mut db = Database::open_at(&db_path).unwrap();
        let mut sink = RecordingAlertSink::default();
        let outcome = monitor
            .handle(Event::AlarmFired, &config.settings, &signals, &mut db, &mut sink)
            .unwrap();
        db.record_check(&outcome, &signals).unwrap();
        assert_eq!(sink.alerts.len(), 1);
    }

    // A fresh process sees the same pending alarm and history.
    let db = Database::open_at(&db_path).unwrap();
    assert_eq!(db.next_alarm().unwrap(), Some(at(23, 45)));
    let history = db.recent_checks(5).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].zone, Zone::Yellow);
    assert!(history[0].alerted);
    assert_eq!(history[0].reason.as_deref(), Some("alert"));
}

#[test]
fn test_power_event_replaces_pending_alarm() {
    let mut db = Database::open_memory().unwrap();
    let config = Config::default();
    let clock = FixedClock::new(at(23, 35));
    let monitor = BedtimeMonitor::new(&clock, Utc, config.policy.clone());
    let mut sink = RecordingAlertSink::default();

    db.set_alarm(at(23, 45)).unwrap();
    let plugged = Signals {
        at_home: true,
        charging: ChargingState::plugged(PlugType::Ac),
    };
    let outcome = monitor
        .handle(
            Event::PowerConnected {
                plug: Some(PlugType::Ac),
            },
            &config.settings,
            &plugged,
            &mut db,
            &mut sink,
        )
        .unwrap();
    db.record_check(&outcome, &plugged).unwrap();
    assert_eq!(db.next_alarm().unwrap(), Some(at(23, 35) + Duration::seconds(1)));

    // The recheck sees the phone on the charger and moves to tomorrow.
    clock.set(at(23, 35) + Duration::seconds(1));
    let outcome = monitor
        .handle(Event::AlarmFired, &config.settings, &plugged, &mut db, &mut sink)
        .unwrap();
    db.record_check(&outcome, &plugged).unwrap();
    assert_eq!(
        db.next_alarm().unwrap(),
        Some(at(23, 0) + Duration::days(1) + Duration::seconds(1))
    );
    assert!(sink.alerts.is_empty());

    let history = db.recent_checks(10).unwrap();
    assert_eq!(history[0].event, "alarm_fired");
    assert_eq!(history[1].event, "power_connected");
    assert!(history.iter().all(|r| r.plugged_in));
}

#[test]
fn test_config_file_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    let mut cfg = Config::load_from(&path).unwrap();
    cfg.set_value("settings.wake_up_time", "06:30").unwrap();
    cfg.set_value("settings.home_wifi_ssid", "HomeNet").unwrap();
    cfg.set_value("policy.away_retry_min", "45").unwrap();
    cfg.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert_eq!(reloaded, cfg);
    assert_eq!(reloaded.get("settings.wake_up_time").as_deref(), Some("06:30"));
    assert_eq!(reloaded.policy.away_retry_min, 45);
}

#[test]
fn test_unknown_config_key_is_rejected() {
    let mut cfg = Config::default();
    let err = cfg.set_value("settings.snooze", "5").unwrap_err();
    assert!(matches!(err, CoreError::Config(ConfigError::UnknownKey(_))));
}
