use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use super::store::{AttemptStore, LoginAttempt, StoreError};

/// SQLite-backed attempt log.
///
/// Timestamps are stored as fixed-width RFC 3339 UTC strings (millisecond
/// precision, `Z` suffix) so that range filters can compare them as text.
pub struct AttemptDb {
    conn: Mutex<Connection>,
}

impl AttemptDb {
    pub fn new(data_dir: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let db_path = data_dir.join("login-attempts.db");
        let conn = Connection::open(&db_path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> anyhow::Result<()> {
        let conn = self.conn()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS login_attempts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identifier TEXT NOT NULL,
                success INTEGER NOT NULL,
                attempted_at TEXT NOT NULL,
                blocked_until TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_la_identifier_time ON login_attempts(identifier, attempted_at);
            CREATE INDEX IF NOT EXISTS idx_la_time ON login_attempts(attempted_at);
        ",
        )?;
        Ok(())
    }

    pub fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn to_db_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn from_db_ts(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StoreError::Timestamp(format!("{raw}: {e}")))
}

impl AttemptStore for AttemptDb {
    fn attempts_since(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT identifier, success, attempted_at, blocked_until
             FROM login_attempts
             WHERE identifier = ?1 AND attempted_at >= ?2
             ORDER BY attempted_at DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![identifier, to_db_ts(since)], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, i64>(1)? != 0,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut attempts = Vec::new();
        for row in rows {
            let (identifier, success, attempted_at, blocked_until) = row?;
            attempts.push(LoginAttempt {
                identifier,
                success,
                attempted_at: from_db_ts(&attempted_at)?,
                blocked_until: blocked_until.as_deref().map(from_db_ts).transpose()?,
            });
        }
        Ok(attempts)
    }

    fn insert(&self, attempt: &LoginAttempt) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO login_attempts (identifier, success, attempted_at, blocked_until)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                attempt.identifier,
                attempt.success as i64,
                to_db_ts(attempt.attempted_at),
                attempt.blocked_until.map(to_db_ts),
            ],
        )?;
        Ok(())
    }

    fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM login_attempts WHERE attempted_at < ?1",
            params![to_db_ts(cutoff)],
        )?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_format_is_fixed_width() {
        let a = DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let b = DateTime::parse_from_rfc3339("2025-01-01T00:00:00.5Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_db_ts(a), "2025-01-01T00:00:00.000Z");
        assert_eq!(to_db_ts(b), "2025-01-01T00:00:00.500Z");
        assert!(to_db_ts(a) < to_db_ts(b));
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let ts = DateTime::parse_from_rfc3339("2025-06-30T12:34:56.789Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(from_db_ts(&to_db_ts(ts)).unwrap(), ts);
    }

    #[test]
    fn test_bad_timestamp_is_an_error() {
        assert!(matches!(
            from_db_ts("yesterday"),
            Err(StoreError::Timestamp(_))
        ));
    }
}
