use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use roi_comparator::rate_limit::store::{
    AttemptStore, LoginAttempt, MemoryAttemptStore, StoreError,
};
use roi_comparator::rate_limit::{RateLimitConfig, RateLimitStatus, RateLimiter};

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-03-01T09:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn limiter() -> (Arc<MemoryAttemptStore>, RateLimiter) {
    let store = Arc::new(MemoryAttemptStore::new());
    let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());
    (store, limiter)
}

/// Store whose reads and writes can be made to fail on demand.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryAttemptStore,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl AttemptStore for FlakyStore {
    fn attempts_since(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<LoginAttempt>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".to_string()));
        }
        self.inner.attempts_since(identifier, since)
    }

    fn insert(&self, attempt: &LoginAttempt) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }
        self.inner.insert(attempt)
    }

    fn delete_before(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("delete refused".to_string()));
        }
        self.inner.delete_before(cutoff)
    }
}

#[test]
fn test_fresh_identifier_is_allowed() {
    let (_, limiter) = limiter();
    let result = limiter.check_at("new@example.com", t0());

    assert!(result.allowed);
    assert_eq!(result.status, RateLimitStatus::Allowed);
    assert_eq!(result.remaining_attempts, 5);
    assert!(result.reset_time.is_none());
    assert!(result.blocked_until.is_none());
    assert!(result.message.is_none());
}

#[test]
fn test_failures_reduce_remaining_and_set_reset_time() {
    let (_, limiter) = limiter();
    limiter.record_at("a@example.com", false, t0());
    limiter.record_at("a@example.com", false, t0() + Duration::minutes(2));
    limiter.record_at("a@example.com", true, t0() + Duration::minutes(3));

    let result = limiter.check_at("a@example.com", t0() + Duration::minutes(4));
    assert!(result.allowed);
    assert_eq!(result.status, RateLimitStatus::Warning);
    assert_eq!(result.remaining_attempts, 3);
    // Oldest failure in the window plus the window length
    assert_eq!(result.reset_time, Some(t0() + Duration::minutes(15)));
}

#[test]
fn test_successes_do_not_count() {
    let (_, limiter) = limiter();
    for i in 0..10 {
        limiter.record_at("ok@example.com", true, t0() + Duration::seconds(i));
    }
    let result = limiter.check_at("ok@example.com", t0() + Duration::minutes(1));
    assert!(result.allowed);
    assert_eq!(result.remaining_attempts, 5);
    assert!(result.reset_time.is_none());
}

#[test]
fn test_old_failures_fall_out_of_window() {
    let (_, limiter) = limiter();
    for i in 0..4 {
        limiter.record_at("w@example.com", false, t0() + Duration::seconds(i));
    }
    let later = t0() + Duration::minutes(20);
    limiter.record_at("w@example.com", false, later);

    let result = limiter.check_at("w@example.com", later + Duration::seconds(1));
    assert!(result.allowed);
    assert_eq!(result.remaining_attempts, 4);
    assert_eq!(result.reset_time, Some(later + Duration::minutes(15)));
}

#[test]
fn test_reaching_limit_blocks_and_persists_block() {
    let (store, limiter) = limiter();
    for i in 0..5 {
        limiter.record_at("b@example.com", false, t0() + Duration::seconds(i));
    }

    let now = t0() + Duration::minutes(1);
    let first = limiter.check_at("b@example.com", now);
    assert!(!first.allowed);
    assert_eq!(first.status, RateLimitStatus::Blocked);
    assert_eq!(first.remaining_attempts, 0);
    assert_eq!(first.blocked_until, Some(now + Duration::minutes(30)));
    assert!(first.message.is_some());
    assert_eq!(store.len(), 6);

    // Still blocked, same expiry, no new block row.
    let second = limiter.check_at("b@example.com", now + Duration::minutes(2));
    assert!(!second.allowed);
    assert_eq!(second.blocked_until, first.blocked_until);
    assert_eq!(store.len(), 6);
}

#[test]
fn test_block_is_per_identifier() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        limiter.record_at("victim@example.com", false, t0() + Duration::seconds(i));
    }
    let now = t0() + Duration::minutes(1);

    assert!(!limiter.check_at("victim@example.com", now).allowed);
    assert!(limiter.check_at("203.0.113.9", now).allowed);
}

#[test]
fn test_success_does_not_lift_block() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        limiter.record_at("c@example.com", false, t0() + Duration::seconds(i));
    }
    let now = t0() + Duration::minutes(1);
    assert!(!limiter.check_at("c@example.com", now).allowed);

    limiter.record_at("c@example.com", true, now + Duration::seconds(1));
    limiter.clear("c@example.com");

    assert!(!limiter
        .check_at("c@example.com", now + Duration::seconds(2))
        .allowed);
}

#[test]
fn test_block_row_outside_window_no_longer_blocks() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        limiter.record_at("d@example.com", false, t0() + Duration::seconds(i));
    }
    let blocked_at = t0() + Duration::minutes(1);
    assert!(!limiter.check_at("d@example.com", blocked_at).allowed);

    // The block row is older than the 15 minute window, as are the failures.
    let result = limiter.check_at("d@example.com", blocked_at + Duration::minutes(16));
    assert!(result.allowed);
    assert_eq!(result.remaining_attempts, 5);
}

#[test]
fn test_custom_config_per_call() {
    let (_, limiter) = limiter();
    let strict = RateLimitConfig {
        max_attempts: 2,
        window_ms: 60_000,
        block_duration_ms: 120_000,
    };
    limiter.record_at("e@example.com", false, t0());
    limiter.record_at("e@example.com", false, t0() + Duration::seconds(10));

    let now = t0() + Duration::seconds(20);
    let result = limiter.evaluate("e@example.com", &strict, now).unwrap();
    assert!(!result.allowed);
    assert_eq!(result.blocked_until, Some(now + Duration::minutes(2)));
}

#[test]
fn test_check_fails_open_when_store_unreadable() {
    let store = Arc::new(FlakyStore::default());
    let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());
    for i in 0..5 {
        limiter.record_at("f@example.com", false, t0() + Duration::seconds(i));
    }
    store.fail_reads.store(true, Ordering::SeqCst);

    let now = t0() + Duration::minutes(1);
    assert!(limiter
        .evaluate("f@example.com", limiter.config(), now)
        .is_err());

    let result = limiter.check_at("f@example.com", now);
    assert!(result.allowed);
    assert_eq!(result.remaining_attempts, 5);
    assert!(result.blocked_until.is_none());
}

#[test]
fn test_block_reported_even_if_block_row_not_written() {
    let store = Arc::new(FlakyStore::default());
    let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());
    for i in 0..5 {
        limiter.record_at("g@example.com", false, t0() + Duration::seconds(i));
    }
    store.fail_writes.store(true, Ordering::SeqCst);

    let result = limiter.check_at("g@example.com", t0() + Duration::minutes(1));
    assert!(!result.allowed);
    assert_eq!(store.inner.len(), 5);
}

#[test]
fn test_record_survives_store_errors() {
    let store = Arc::new(FlakyStore::default());
    let limiter = RateLimiter::new(store.clone(), RateLimitConfig::default());

    store.fail_writes.store(true, Ordering::SeqCst);
    limiter.record_at("h@example.com", false, t0());
    assert!(store.inner.is_empty());

    // A failed prune does not undo the insert.
    store.fail_writes.store(false, Ordering::SeqCst);
    store.fail_deletes.store(true, Ordering::SeqCst);
    limiter.record_at("h@example.com", false, t0());
    assert_eq!(store.inner.len(), 1);
}

#[test]
fn test_record_prunes_attempts_past_retention() {
    let (store, limiter) = limiter();
    limiter.record_at("old@example.com", false, t0());
    limiter.record_at("old@example.com", false, t0() + Duration::days(29));
    assert_eq!(store.len(), 2);

    limiter.record_at("new@example.com", true, t0() + Duration::days(31));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_window_beyond_calendar_fails_open() {
    let store = Arc::new(MemoryAttemptStore::new());
    let huge = RateLimitConfig {
        window_ms: i64::MAX / 2,
        ..Default::default()
    };
    let limiter = RateLimiter::new(store, huge);

    assert!(limiter.evaluate("a@example.com", &huge, t0()).is_err());
    let result = limiter.check_at("a@example.com", t0());
    assert!(result.allowed);
    assert_eq!(result.remaining_attempts, 5);
}

#[test]
fn test_non_positive_periods_fail_open() {
    let (_, limiter) = limiter();
    for i in 0..5 {
        limiter.record_at("n@example.com", false, t0() + Duration::seconds(i));
    }
    let now = t0() + Duration::minutes(1);

    let no_block = RateLimitConfig {
        block_duration_ms: -1,
        ..Default::default()
    };
    assert!(limiter.evaluate("n@example.com", &no_block, now).is_err());

    let no_window = RateLimitConfig {
        window_ms: 0,
        ..Default::default()
    };
    assert!(limiter.evaluate("n@example.com", &no_window, now).is_err());
}

#[test]
fn test_sub_millisecond_now_is_truncated() {
    let (store, limiter) = limiter();
    let now = t0() + Duration::nanoseconds(1_234_567);
    limiter.record_at("ms@example.com", false, now);

    let found = store.attempts_since("ms@example.com", t0()).unwrap();
    assert_eq!(found[0].attempted_at, t0() + Duration::milliseconds(1));
    let result = limiter.check_at("ms@example.com", now);
    assert_eq!(
        result.reset_time,
        Some(t0() + Duration::milliseconds(1) + Duration::minutes(15))
    );
}
