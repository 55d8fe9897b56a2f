//! SQLite-backed daily free-use counter.
//!
//! Tracks free uses per subject (a user id, or this device's id for
//! anonymous visitors) per UTC day. Rows from earlier days are ignored,
//! so the counter resets at midnight without a background job.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::data_dir;
use crate::access::{next_daily_reset, AccessLimits, ViewCount};
use crate::error::{CoreError, DatabaseError};

const DEVICE_ID_KEY: &str = "device_id";
const DEVICE_ID_PREFIX: &str = "device-";

/// Local usage store.
pub struct UsageStore {
    conn: Mutex<Connection>,
    limits: AccessLimits,
}

impl std::fmt::Debug for UsageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageStore")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

impl UsageStore {
    /// Open the store at `~/.config/sportsedge/sportsedge.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(limits: AccessLimits) -> Result<Self, CoreError> {
        let path = data_dir()?.join("sportsedge.db");
        Ok(Self::open_at(&path, limits)?)
    }

    pub fn open_at(path: &Path, limits: AccessLimits) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn, limits)
    }

    /// Open an in-memory store.
    pub fn open_memory(limits: AccessLimits) -> Result<Self, DatabaseError> {
        Self::with_connection(Connection::open_in_memory()?, limits)
    }

    fn with_connection(conn: Connection, limits: AccessLimits) -> Result<Self, DatabaseError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            limits,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::Locked)
    }

    pub fn limits(&self) -> AccessLimits {
        self.limits
    }

    /// Counter for `subject` on the UTC day containing `now`.
    pub fn view_count(&self, subject: &str, now: DateTime<Utc>) -> Result<ViewCount, DatabaseError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                "SELECT count, bonus FROM daily_usage WHERE subject = ?1 AND day = ?2",
                params![subject, day_key(now.date_naive())],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;

        let (count, bonus) = row.unwrap_or((0, 0));
        Ok(ViewCount {
            count,
            max_views: self.limits.max_free_uses,
            bonus_views: self.limits.bonus_uses.saturating_add(bonus),
            next_reset: next_daily_reset(now),
        })
    }

    /// Count one free use and return the updated counter.
    pub fn record_view(&self, subject: &str, now: DateTime<Utc>) -> Result<ViewCount, DatabaseError> {
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO daily_usage (subject, day, count, bonus) VALUES (?1, ?2, 1, 0)
                 ON CONFLICT(subject, day) DO UPDATE SET count = count + 1",
                params![subject, day_key(now.date_naive())],
            )?;
        }
        self.view_count(subject, now)
    }

    /// Grant extra uses for today (e.g. after a rewarded ad).
    pub fn grant_bonus(
        &self,
        subject: &str,
        extra: u32,
        now: DateTime<Utc>,
    ) -> Result<ViewCount, DatabaseError> {
        {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO daily_usage (subject, day, count, bonus) VALUES (?1, ?2, 0, ?3)
                 ON CONFLICT(subject, day) DO UPDATE SET bonus = bonus + ?3",
                params![subject, day_key(now.date_naive()), extra],
            )?;
        }
        self.view_count(subject, now)
    }

    /// Delete counters from days before `before`. Returns rows removed.
    pub fn purge_before(&self, before: NaiveDate) -> Result<usize, DatabaseError> {
        let conn = self.conn()?;
        Ok(conn.execute(
            "DELETE FROM daily_usage WHERE day < ?1",
            params![day_key(before)],
        )?)
    }

    /// Stable identifier for this installation, created on first use.
    pub fn device_id(&self) -> Result<String, DatabaseError> {
        let conn = self.conn()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![DEVICE_ID_KEY],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = format!("{DEVICE_ID_PREFIX}{}", Uuid::new_v4());
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)",
            params![DEVICE_ID_KEY, id],
        )?;
        Ok(id)
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS daily_usage (
            subject TEXT NOT NULL,
            day     TEXT NOT NULL,
            count   INTEGER NOT NULL DEFAULT 0,
            bonus   INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (subject, day)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_daily_usage_day ON daily_usage(day);",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> UsageStore {
        UsageStore::open_memory(AccessLimits {
            max_free_uses: 2,
            bonus_uses: 0,
        })
        .unwrap()
    }

    #[test]
    fn unseen_subject_has_full_allowance() {
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        let count = store().view_count("u-1", now).unwrap();
        assert_eq!(count.count, 0);
        assert_eq!(count.remaining(), 2);
        assert_eq!(count.next_reset, Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap());
    }

    #[test]
    fn record_view_counts_down() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(store.record_view("u-1", now).unwrap().remaining(), 1);
        assert_eq!(store.record_view("u-1", now).unwrap().remaining(), 0);
        assert_eq!(store.record_view("u-1", now).unwrap().remaining(), 0);
        assert_eq!(store.view_count("u-2", now).unwrap().remaining(), 2);
    }

    #[test]
    fn counter_resets_next_day() {
        let store = store();
        let day1 = Utc.with_ymd_and_hms(2026, 5, 1, 23, 59, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 5, 2, 0, 1, 0).unwrap();
        store.record_view("u-1", day1).unwrap();
        store.record_view("u-1", day1).unwrap();
        assert_eq!(store.view_count("u-1", day2).unwrap().count, 0);
    }

    #[test]
    fn bonus_extends_allowance_for_today_only() {
        let store = store();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        store.record_view("u-1", now).unwrap();
        store.record_view("u-1", now).unwrap();
        let after = store.grant_bonus("u-1", 1, now).unwrap();
        assert_eq!(after.bonus_views, 1);
        assert_eq!(after.remaining(), 1);

        let tomorrow = Utc.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap();
        assert_eq!(store.view_count("u-1", tomorrow).unwrap().bonus_views, 0);
    }

    #[test]
    fn purge_removes_old_days() {
        let store = store();
        let old = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        store.record_view("u-1", old).unwrap();
        store.record_view("u-1", now).unwrap();
        assert_eq!(store.purge_before(now.date_naive()).unwrap(), 1);
        assert_eq!(store.view_count("u-1", now).unwrap().count, 1);
    }

    #[test]
    fn device_id_is_stable() {
        let store = store();
        let first = store.device_id().unwrap();
        assert!(first.starts_with(DEVICE_ID_PREFIX));
        assert_eq!(store.device_id().unwrap(), first);
    }

    #[test]
    fn file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap();
        {
            let store = UsageStore::open_at(&path, AccessLimits::default()).unwrap();
            store.record_view("u-1", now).unwrap();
        }
        let store = UsageStore::open_at(&path, AccessLimits::default()).unwrap();
        assert_eq!(store.view_count("u-1", now).unwrap().count, 1);
    }
}
