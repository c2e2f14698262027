use clap::Parser;
use std::path::PathBuf;
use tracing::warn;

use crate::rate_limit::RateLimitConfig;
use crate::settings::RateLimitSettings;

/// ROI comparator: scenario comparison engine and login rate limiter.
#[derive(Parser, Debug, Clone)]
#[command(name = "roi-comparator")]
pub struct CliArgs {
    /// HTTP port
    #[arg(long = "port", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory holding the attempt log database and settings file
    #[arg(short = 'D', long = "data-dir")]
    pub data_dir: Option<PathBuf>,

    /// Also write logs to daily-rolling files in this directory
    #[arg(short = 'l', long = "log-dir")]
    pub log_dir: Option<PathBuf>,

    /// Failed logins allowed per window before blocking
    #[arg(long = "max-attempts")]
    pub max_attempts: Option<u32>,

    /// Sliding window length in seconds
    #[arg(long = "window-secs")]
    pub window_secs: Option<i64>,

    /// Block length in seconds once the limit is reached
    #[arg(long = "block-secs")]
    pub block_secs: Option<i64>,
}

pub struct AppConfig {
    pub port: u16,
    pub data_dir: PathBuf,
    pub log_dir: Option<PathBuf>,
    pub rate_limit: RateLimitConfig,
}

// Server constants
pub const DEFAULT_PORT: u16 = 9880;
pub const DATA_DIR_NAME: &str = "roi-comparator";

// Rate limit constants
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_WINDOW_MS: i64 = 15 * 60 * 1000; // 15 minutes
pub const DEFAULT_BLOCK_DURATION_MS: i64 = 30 * 60 * 1000; // 30 minutes
pub const ATTEMPT_RETENTION_DAYS: i64 = 30;
pub const MAX_RATE_LIMIT_PERIOD_MS: i64 = 365 * 24 * 60 * 60 * 1000; // 1 year

// Scenario labels for freshly created sessions
pub const DEFAULT_BASE_SCENARIO_NAME: &str = "Scenario 1";
pub const DEFAULT_COMP_SCENARIO_NAME: &str = "Scenario 2";

impl AppConfig {
    /// Merge CLI flags over the settings file over built-in defaults.
    pub fn from_args(args: CliArgs, settings: &RateLimitSettings) -> Self {
        let rate_limit = resolve_rate_limit(&args, settings);
        let data_dir = args.data_dir.unwrap_or_else(default_data_dir);

        AppConfig {
            port: args.port,
            data_dir,
            log_dir: args.log_dir,
            rate_limit,
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}

/// Out-of-range values fall back to the default with a warning.
fn resolve_rate_limit(args: &CliArgs, settings: &RateLimitSettings) -> RateLimitConfig {
    let defaults = RateLimitConfig::default();

    let max_attempts = match args.max_attempts.or(settings.max_attempts) {
        Some(0) => {
            warn!(
                "Ignoring max attempts of 0, using {}",
                defaults.max_attempts
            );
            defaults.max_attempts
        }
        Some(n) => n,
        None => defaults.max_attempts,
    };

    RateLimitConfig {
        max_attempts,
        window_ms: resolve_period(
            "window",
            args.window_secs,
            settings.window_ms,
            defaults.window_ms,
        ),
        block_duration_ms: resolve_period(
            "block duration",
            args.block_secs,
            settings.block_duration_ms,
            defaults.block_duration_ms,
        ),
    }
}

fn resolve_period(name: &str, secs: Option<i64>, ms: Option<i64>, default: i64) -> i64 {
    // A seconds flag too large to express in ms is as out of range as any other.
    let requested = secs
        .map(|s| s.checked_mul(1000).unwrap_or(i64::MAX))
        .or(ms);
    match requested {
        Some(ms) if ms > 0 && ms <= MAX_RATE_LIMIT_PERIOD_MS => ms,
        Some(ms) => {
            warn!(
                "Ignoring rate limit {} of {} ms, using {} ms",
                name, ms, default
            );
            default
        }
        None => default,
    }
}
