//! SQLite-based fast history and snapshot storage.
//!
//! This is the persistence collaborator: the core state machines hold no
//! durable state, so the host stores what they return here after every
//! successful transition. Provides:
//! - A history table of terminal (completed/aborted) fasts
//! - Aggregate statistics over that history
//! - A key-value store for live session / ledger snapshots

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::DatabaseError;
use crate::fast::FastingSession;

/// One row of the fast history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastRecord {
    pub id: String,
    pub status: String,
    pub plan: Option<String>,
    pub target_secs: u64,
    pub elapsed_secs: u64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Aggregate statistics over the recorded fast history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FastStats {
    pub total_fasts: u64,
    pub completed: u64,
    pub aborted: u64,
    /// completed / total, 0.0 when no fasts are recorded.
    pub completion_rate: f64,
    /// Fasting seconds across all recorded fasts, aborted ones included.
    pub total_fasting_secs: u64,
    pub longest_fast_secs: u64,
}

/// SQLite database for fast history and host snapshots.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/fastvault/fastvault.db`,
    /// creating the file and schema if they don't exist.
    pub fn open() -> Result<Self, DatabaseError> {
        let dir = data_dir();
        std::fs::create_dir_all(&dir).map_err(|e| DatabaseError::DataDirFailed {
            path: dir.clone(),
            message: e.to_string(),
        })?;
        Self::open_at(dir.join("fastvault.db"))
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and ephemeral hosts).
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS fasts (
                    id           TEXT PRIMARY KEY,
                    status       TEXT NOT NULL,
                    plan         TEXT,
                    target_secs  INTEGER NOT NULL,
                    elapsed_secs INTEGER NOT NULL,
                    started_at   TEXT NOT NULL,
                    ended_at     TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_fasts_ended_at ON fasts(ended_at);
                CREATE INDEX IF NOT EXISTS idx_fasts_status ON fasts(status);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    /// Record a terminal session in the history table.
    ///
    /// Inserting the same session id twice is a no-op, so a host retrying
    /// after a crash cannot duplicate history rows.
    pub fn record_fast(&self, session: &FastingSession) -> Result<(), DatabaseError> {
        let Some(ended_at) = session.ended_at() else {
            return Err(DatabaseError::QueryFailed(
                "cannot record a session that has not ended".to_string(),
            ));
        };
        let elapsed_secs = session.final_elapsed_seconds().unwrap_or(0);
        let started_at = session.started_at().unwrap_or(ended_at);
        self.conn.execute(
            "INSERT OR IGNORE INTO fasts (id, status, plan, target_secs, elapsed_secs, started_at, ended_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session.id().to_string(),
                session.status().to_string(),
                session.plan().map(|p| p.label()),
                session.target_duration_secs(),
                elapsed_secs,
                started_at,
                ended_at,
            ],
        )?;
        Ok(())
    }

    /// Most recent fasts, newest first.
    pub fn history(&self, limit: u32) -> Result<Vec<FastRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, status, plan, target_secs, elapsed_secs, started_at, ended_at
             FROM fasts ORDER BY ended_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok(FastRecord {
                id: row.get(0)?,
                status: row.get(1)?,
                plan: row.get(2)?,
                target_secs: row.get(3)?,
                elapsed_secs: row.get(4)?,
                started_at: row.get(5)?,
                ended_at: row.get(6)?,
            })
        })?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub fn stats(&self) -> Result<FastStats, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*), COALESCE(SUM(elapsed_secs), 0), COALESCE(MAX(elapsed_secs), 0)
             FROM fasts GROUP BY status",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, u64>(3)?,
            ))
        })?;

        let mut stats = FastStats::default();
        for row in rows {
            let (status, count, total_secs, longest_secs) = row?;
            stats.total_fasts += count;
            stats.total_fasting_secs += total_secs;
            stats.longest_fast_secs = stats.longest_fast_secs.max(longest_secs);
            match status.as_str() {
                "completed" => stats.completed += count,
                "aborted" => stats.aborted += count,
                _ => {}
            }
        }
        if stats.total_fasts > 0 {
            stats.completion_rate = stats.completed as f64 / stats.total_fasts as f64;
        }
        Ok(stats)
    }

    // ── Key-value store ──────────────────────────────────────────────

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<(), DatabaseError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fast::{FastingPlan, FastingSession};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 2, 19, 0, 0).unwrap()
    }

    fn terminal_session(target_hours: u64, ran_hours: i64) -> FastingSession {
        let mut session = FastingSession::new(target_hours * 3600).unwrap();
        session.start(t0()).unwrap();
        session.stop(t0() + Duration::hours(ran_hours)).unwrap();
        session
    }

    #[test]
    fn records_and_lists_fasts() {
        let db = Database::open_memory().unwrap();
        db.record_fast(&terminal_session(16, 17)).unwrap();
        db.record_fast(&terminal_session(18, 9)).unwrap();

        let history = db.history(10).unwrap();
        assert_eq!(history.len(), 2);
        let completed = history.iter().find(|r| r.status == "completed").unwrap();
        assert_eq!(completed.elapsed_secs, 17 * 3600);
        assert_eq!(completed.target_secs, 16 * 3600);
    }

    #[test]
    fn rejects_live_sessions() {
        let db = Database::open_memory().unwrap();
        let mut session = FastingSession::new(3600).unwrap();
        session.start(t0()).unwrap();
        assert!(db.record_fast(&session).is_err());
    }

    #[test]
    fn duplicate_record_is_a_noop() {
        let db = Database::open_memory().unwrap();
        let session = terminal_session(16, 17);
        db.record_fast(&session).unwrap();
        db.record_fast(&session).unwrap();
        assert_eq!(db.history(10).unwrap().len(), 1);
    }

    #[test]
    fn stats_aggregate_history() {
        let db = Database::open_memory().unwrap();
        db.record_fast(&terminal_session(16, 16)).unwrap();
        db.record_fast(&terminal_session(16, 20)).unwrap();
        db.record_fast(&terminal_session(18, 6)).unwrap();

        let stats = db.stats().unwrap();
        assert_eq!(stats.total_fasts, 3);
        assert_eq!(stats.completed, 2);
        assert_eq!(stats.aborted, 1);
        assert!((stats.completion_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.total_fasting_secs, (16 + 20 + 6) * 3600);
        assert_eq!(stats.longest_fast_secs, 20 * 3600);
    }

    #[test]
    fn empty_stats_are_zero() {
        let db = Database::open_memory().unwrap();
        let stats = db.stats().unwrap();
        assert_eq!(stats.total_fasts, 0);
        assert_eq!(stats.completion_rate, 0.0);
    }

    #[test]
    fn kv_roundtrip() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("session").unwrap(), None);
        db.kv_set("session", "{}").unwrap();
        db.kv_set("session", "{\"status\":\"running\"}").unwrap();
        assert_eq!(
            db.kv_get("session").unwrap().as_deref(),
            Some("{\"status\":\"running\"}")
        );
        db.kv_delete("session").unwrap();
        assert_eq!(db.kv_get("session").unwrap(), None);
    }

    #[test]
    fn plan_label_is_stored() {
        let db = Database::open_memory().unwrap();
        let mut session = FastingSession::for_plan(FastingPlan::Omad);
        session.start(t0()).unwrap();
        session.stop(t0() + Duration::hours(23)).unwrap();
        db.record_fast(&session).unwrap();

        let history = db.history(1).unwrap();
        assert_eq!(history[0].plan.as_deref(), Some("23:1 OMAD"));
    }
}
