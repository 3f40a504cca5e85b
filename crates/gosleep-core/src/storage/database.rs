//! SQLite-backed alarm slot and check history.
//!
//! Provides persistent storage for:
//! - The single pending alarm (one row, overwritten on every reschedule)
//! - A log of past bedtime checks and what they decided

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmScheduler;
use crate::error::{DatabaseError, Result};
use crate::monitor::Outcome;
use crate::policy::Signals;
use crate::zone::Zone;

use super::data_dir;

/// One logged bedtime check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRecord {
    pub id: i64,
    pub checked_at: DateTime<Utc>,
    pub event: String,
    pub zone: Zone,
    /// Policy reason, absent for events that only rescheduled.
    pub reason: Option<String>,
    pub at_home: bool,
    pub plugged_in: bool,
    pub alerted: bool,
    pub next_check: DateTime<Utc>,
}

/// SQLite database holding the alarm slot and check history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/gosleep.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("gosleep.db"))
    }

    /// Open (or create) the database at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS alarm_slot (
                id          INTEGER PRIMARY KEY CHECK (id = 0),
                trigger_at  TEXT NOT NULL,
                updated_at  TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS checks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                checked_at  TEXT NOT NULL,
                event       TEXT NOT NULL,
                zone        TEXT NOT NULL,
                reason      TEXT,
                at_home     INTEGER NOT NULL,
                plugged_in  INTEGER NOT NULL,
                alerted     INTEGER NOT NULL,
                next_check  TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_checks_checked_at ON checks(checked_at);",
        )?;
        Ok(())
    }

    /// Append a handled event to the check log.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_check(&self, outcome: &Outcome, signals: &Signals) -> Result<i64> {
        self.conn
            .execute(
                "INSERT INTO checks
                    (checked_at, event, zone, reason, at_home, plugged_in, alerted, next_check)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    outcome.evaluated_at.to_rfc3339(),
                    outcome.event.name(),
                    outcome.zone.as_str(),
                    outcome.decision.map(|d| d.reason.as_str()),
                    signals.at_home,
                    signals.charging.is_plugged_in(),
                    outcome.alert.is_some(),
                    outcome.next_check.to_rfc3339(),
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recent checks first.
    pub fn recent_checks(&self, limit: usize) -> Result<Vec<CheckRecord>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, checked_at, event, zone, reason, at_home, plugged_in, alerted, next_check
                 FROM checks
                 ORDER BY checked_at DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(DatabaseError::from)?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, bool>(5)?,
                    row.get::<_, bool>(6)?,
                    row.get::<_, bool>(7)?,
                    row.get::<_, String>(8)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut records = Vec::new();
        for row in rows {
            let (id, checked_at, event, zone, reason, at_home, plugged_in, alerted, next_check) =
                row.map_err(DatabaseError::from)?;
            records.push(CheckRecord {
                id,
                checked_at: parse_instant("checked_at", &checked_at)?,
                event,
                zone: parse_zone(&zone)?,
                reason,
                at_home,
                plugged_in,
                alerted,
                next_check: parse_instant("next_check", &next_check)?,
            });
        }
        Ok(records)
    }
}

impl AlarmScheduler for Database {
    fn set_alarm(&mut self, trigger_at: DateTime<Utc>) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO alarm_slot (id, trigger_at, updated_at) VALUES (0, ?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET
                    trigger_at = excluded.trigger_at,
                    updated_at = excluded.updated_at",
                params![trigger_at.to_rfc3339(), Utc::now().to_rfc3339()],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn next_alarm(&self) -> Result<Option<DateTime<Utc>>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT trigger_at FROM alarm_slot WHERE id = 0", [], |row| {
                row.get(0)
            })
            .optional()
            .map_err(DatabaseError::from)?;
        Ok(raw.map(|s| parse_instant("trigger_at", &s)).transpose()?)
    }

    fn clear_alarm(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM alarm_slot WHERE id = 0", [])
            .map_err(DatabaseError::from)?;
        Ok(())
    }
}

fn parse_instant(column: &str, raw: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| DatabaseError::Corrupt {
            column: column.to_string(),
            message: e.to_string(),
        })
}

fn parse_zone(raw: &str) -> Result<Zone, DatabaseError> {
    match raw {
        "none" => Ok(Zone::None),
        "green" => Ok(Zone::Green),
        "yellow" => Ok(Zone::Yellow),
        "red" => Ok(Zone::Red),
        other => Err(DatabaseError::Corrupt {
            column: "zone".to_string(),
            message: format!("unknown zone '{other}'"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;
    use crate::policy::{Decision, DecisionReason};
    use crate::presence::{ChargingState, PlugType};
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn alarm_slot_is_overwritten() {
        let mut db = Database::open_memory().unwrap();
        assert_eq!(db.next_alarm().unwrap(), None);

        db.set_alarm(at(23, 0)).unwrap();
        db.set_alarm(at(23, 15)).unwrap();
        assert_eq!(db.next_alarm().unwrap(), Some(at(23, 15)));

        let rows: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM alarm_slot", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);

        db.clear_alarm().unwrap();
        assert_eq!(db.next_alarm().unwrap(), None);
    }

    #[test]
    fn check_log_round_trip() {
        let db = Database::open_memory().unwrap();
        let signals = Signals {
            at_home: true,
            charging: ChargingState::plugged(PlugType::Ac),
        };
        let decision = Decision {
            zone: Zone::Red,
            next_check: at(23, 0) + Duration::days(1),
            alert: None,
            reason: DecisionReason::InBed,
        };
        let first = Outcome {
            event: Event::AlarmFired,
            evaluated_at: at(0, 30),
            zone: Zone::Red,
            decision: Some(decision),
            next_check: decision.next_check,
            alert: None,
        };
        let second = Outcome {
            event: Event::BootCompleted,
            evaluated_at: at(1, 0),
            zone: Zone::Red,
            decision: None,
            next_check: at(1, 1),
            alert: None,
        };
        db.record_check(&first, &signals).unwrap();
        db.record_check(&second, &Signals::default()).unwrap();

        let records = db.recent_checks(10).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].event, "boot_completed");
        assert_eq!(records[0].reason, None);
        assert!(!records[0].at_home);
        assert_eq!(records[1].event, "alarm_fired");
        assert_eq!(records[1].reason.as_deref(), Some("in_bed"));
        assert!(records[1].plugged_in);
        assert_eq!(records[1].next_check, at(23, 0) + Duration::days(1));

        assert_eq!(db.recent_checks(1).unwrap().len(), 1);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gosleep.db");
        {
            let mut db = Database::open_at(&path).unwrap();
            db.set_alarm(at(22, 0)).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.next_alarm().unwrap(), Some(at(22, 0)));
    }
}
