pub mod db;
pub mod store;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::{
    ATTEMPT_RETENTION_DAYS, DEFAULT_BLOCK_DURATION_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_WINDOW_MS,
};
use store::{AttemptStore, LoginAttempt, StoreError};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    pub max_attempts: u32,
    pub window_ms: i64,
    pub block_duration_ms: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_ms: DEFAULT_WINDOW_MS,
            block_duration_ms: DEFAULT_BLOCK_DURATION_MS,
        }
    }
}

impl RateLimitConfig {
    fn window(&self) -> Result<Duration, RateLimitError> {
        positive_millis(self.window_ms).ok_or(RateLimitError::OutOfRange("window"))
    }

    fn block_duration(&self) -> Result<Duration, RateLimitError> {
        positive_millis(self.block_duration_ms)
            .ok_or(RateLimitError::OutOfRange("block duration"))
    }
}

fn positive_millis(ms: i64) -> Option<Duration> {
    if ms <= 0 {
        return None;
    }
    Duration::try_milliseconds(ms)
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Rate limit {0} out of range")]
    OutOfRange(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitStatus {
    /// No failures in the window.
    Allowed,
    /// Some failures in the window, still under the limit.
    Warning,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub allowed: bool,
    pub status: RateLimitStatus,
    pub remaining_attempts: u32,
    pub reset_time: Option<DateTime<Utc>>,
    pub blocked_until: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateLimitResult {
    fn blocked(until: DateTime<Utc>) -> Self {
        Self {
            allowed: false,
            status: RateLimitStatus::Blocked,
            remaining_attempts: 0,
            reset_time: None,
            blocked_until: Some(until),
            message: Some(blocked_message(until)),
        }
    }

    /// The answer given when the attempt log cannot be read.
    pub fn fail_open(config: &RateLimitConfig) -> Self {
        Self {
            allowed: true,
            status: RateLimitStatus::Allowed,
            remaining_attempts: config.max_attempts,
            reset_time: None,
            blocked_until: None,
            message: None,
        }
    }
}

pub fn blocked_message(until: DateTime<Utc>) -> String {
    format!(
        "Too many login attempts. Please wait until {}.",
        until.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

// ============================================================================
// Limiter
// ============================================================================

/// Sliding-window login limiter over an append-only attempt log.
///
/// Check and record are independent round-trips with no lock between them, so
/// two concurrent checks can both pass just under the limit.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn AttemptStore>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn AttemptStore>, config: RateLimitConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn check(&self, identifier: &str) -> RateLimitResult {
        self.check_at(identifier, Utc::now())
    }

    /// Check with the limiter's own config. Any evaluation error fails open.
    pub fn check_at(&self, identifier: &str, now: DateTime<Utc>) -> RateLimitResult {
        match self.evaluate(identifier, &self.config, now) {
            Ok(result) => result,
            Err(e) => {
                warn!("Rate limit check for {} failed, allowing: {}", identifier, e);
                RateLimitResult::fail_open(&self.config)
            }
        }
    }

    /// Evaluate `identifier` against `config` at `now`.
    ///
    /// Reaching the limit appends a blocking row. An `Err` means the attempt
    /// log could not be read or the window does not fit around `now`; what to
    /// do about that is the caller's call.
    ///
    /// `now` is cut to milliseconds, the precision the attempt log keeps, so
    /// a reported `blocked_until` matches the one read back later.
    pub fn evaluate(
        &self,
        identifier: &str,
        config: &RateLimitConfig,
        now: DateTime<Utc>,
    ) -> Result<RateLimitResult, RateLimitError> {
        let now = now.trunc_subsecs(3);
        let window = config.window()?;
        let since = now
            .checked_sub_signed(window)
            .ok_or(RateLimitError::OutOfRange("window"))?;
        let attempts = self.store.attempts_since(identifier, since)?;

        // Newest first, so this is the most recent active block.
        let active_block = attempts
            .iter()
            .filter_map(|a| a.blocked_until)
            .find(|until| *until > now);
        if let Some(until) = active_block {
            debug!("{} is blocked until {}", identifier, until);
            return Ok(RateLimitResult::blocked(until));
        }

        let failed: Vec<&LoginAttempt> = attempts.iter().filter(|a| !a.success).collect();
        let failed_count = failed.len() as u32;

        if failed_count >= config.max_attempts {
            let until = now
                .checked_add_signed(config.block_duration()?)
                .ok_or(RateLimitError::OutOfRange("block duration"))?;
            if let Err(e) = self
                .store
                .insert(&LoginAttempt::block(identifier, now, until))
            {
                warn!("Failed to persist block for {}: {}", identifier, e);
            }
            warn!(
                "Blocking {} until {} after {} failed attempts",
                identifier, until, failed_count
            );
            return Ok(RateLimitResult::blocked(until));
        }

        let reset_time = match failed.last() {
            Some(oldest) => Some(
                oldest
                    .attempted_at
                    .checked_add_signed(window)
                    .ok_or(RateLimitError::OutOfRange("window"))?,
            ),
            None => None,
        };
        let status = if failed_count == 0 {
            RateLimitStatus::Allowed
        } else {
            RateLimitStatus::Warning
        };

        Ok(RateLimitResult {
            allowed: true,
            status,
            remaining_attempts: config.max_attempts - failed_count,
            reset_time,
            blocked_until: None,
            message: None,
        })
    }

    pub fn record(&self, identifier: &str, success: bool) {
        self.record_at(identifier, success, Utc::now())
    }

    /// Append an attempt, then prune rows past retention. Neither step can
    /// fail the caller; errors are logged.
    pub fn record_at(&self, identifier: &str, success: bool, now: DateTime<Utc>) {
        let now = now.trunc_subsecs(3);
        if let Err(e) = self
            .store
            .insert(&LoginAttempt::new(identifier, success, now))
        {
            warn!("Failed to record login attempt for {}: {}", identifier, e);
        }

        let Some(cutoff) = now.checked_sub_signed(Duration::days(ATTEMPT_RETENTION_DAYS)) else {
            return;
        };
        match self.store.delete_before(cutoff) {
            Ok(0) => {}
            Ok(n) => debug!("Pruned {} login attempts older than {}", n, cutoff),
            Err(e) => warn!("Failed to prune old login attempts: {}", e),
        }
    }

    /// Intentionally does nothing: a successful login keeps the failure
    /// history, and blocks lift only by window or block expiry.
    pub fn clear(&self, _identifier: &str) {}
}

/// Emails are case-folded before use as an identifier; IPs are used verbatim.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}
