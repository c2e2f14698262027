use std::sync::Arc;

use crate::config::AppConfig;
use crate::rate_limit::db::AttemptDb;
use crate::rate_limit::store::AttemptStore;
use crate::rate_limit::{RateLimitConfig, RateLimiter};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(rate_limit: RateLimitConfig, store: Arc<dyn AttemptStore>) -> Self {
        Self {
            limiter: RateLimiter::new(store, rate_limit),
        }
    }

    /// Open the SQLite attempt log under `config.data_dir`.
    pub fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let db = AttemptDb::new(&config.data_dir)?;
        Ok(Self::new(config.rate_limit, Arc::new(db)))
    }
}
