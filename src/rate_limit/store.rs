use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// One row of the append-only attempt log. Rows are never updated; a block is
/// a failed row carrying `blocked_until`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub identifier: String,
    pub success: bool,
    pub attempted_at: DateTime<Utc>,
    pub blocked_until: Option<DateTime<Utc>>,
}

impl LoginAttempt {
    pub fn new(identifier: &str, success: bool, attempted_at: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.to_string(),
            success,
            attempted_at,
            blocked_until: None,
        }
    }

    pub fn block(identifier: &str, attempted_at: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.to_string(),
            success: false,
            attempted_at,
            blocked_until: Some(until),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid timestamp in attempt log: {0}")]
    Timestamp(String),

    #[error("Attempt log lock poisoned")]
    Poisoned,

    #[error("Attempt log unavailable: {0}")]
    Unavailable(String),
}

/// Backing store for login attempts.
pub trait AttemptStore: Send + Sync {
    /// Attempts for `identifier` with `attempted_at >= since`, newest first.
    fn attempts_since(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, StoreError>;

    fn insert(&self, attempt: &LoginAttempt) -> Result<(), StoreError>;

    /// Delete every attempt (any identifier) older than `cutoff`.
    fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError>;
}

/// Process-local attempt log, used by tests and embedded callers.
#[derive(Default)]
pub struct MemoryAttemptStore {
    attempts: Mutex<Vec<LoginAttempt>>,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.attempts.lock().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttemptStore for MemoryAttemptStore {
    fn attempts_since(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, StoreError> {
        let attempts = self.attempts.lock().map_err(|_| StoreError::Poisoned)?;
        let mut found: Vec<LoginAttempt> = attempts
            .iter()
            .filter(|a| a.identifier == identifier && a.attempted_at >= since)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at));
        Ok(found)
    }

    fn insert(&self, attempt: &LoginAttempt) -> Result<(), StoreError> {
        let mut attempts = self.attempts.lock().map_err(|_| StoreError::Poisoned)?;
        attempts.push(attempt.clone());
        Ok(())
    }

    fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut attempts = self.attempts.lock().map_err(|_| StoreError::Poisoned)?;
        let before = attempts.len();
        attempts.retain(|a| a.attempted_at >= cutoff);
        Ok(before - attempts.len())
    }
}
