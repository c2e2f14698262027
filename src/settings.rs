use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Optional rate-limit overrides read from `<data-dir>/rate-limit.json`.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSettings {
    pub max_attempts: Option<u32>,
    pub window_ms: Option<i64>,
    pub block_duration_ms: Option<i64>,
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("rate-limit.json")
}

pub fn load_settings(path: &Path) -> RateLimitSettings {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings in {:?}: {}", path, e);
            RateLimitSettings::default()
        }),
        Err(_) => RateLimitSettings::default(),
    }
}
