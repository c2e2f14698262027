use roi_comparator::settings::{load_settings, settings_path};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let settings = load_settings(&dir.path().join("nonexistent.json"));
    assert!(settings.max_attempts.is_none());
    assert!(settings.window_ms.is_none());
    assert!(settings.block_duration_ms.is_none());
}

#[test]
fn test_load_invalid_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "not json at all {{{").unwrap();
    let settings = load_settings(&path);
    // Should return defaults instead of panicking
    assert!(settings.max_attempts.is_none());
    assert!(settings.window_ms.is_none());
}

#[test]
fn test_load_full_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rate-limit.json");
    std::fs::write(
        &path,
        r#"{"maxAttempts": 3, "windowMs": 60000, "blockDurationMs": 120000}"#,
    )
    .unwrap();

    let settings = load_settings(&path);
    assert_eq!(settings.max_attempts, Some(3));
    assert_eq!(settings.window_ms, Some(60_000));
    assert_eq!(settings.block_duration_ms, Some(120_000));
}

#[test]
fn test_partial_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{"maxAttempts": 8}"#).unwrap();

    let settings = load_settings(&path);
    assert_eq!(settings.max_attempts, Some(8));
    assert!(settings.window_ms.is_none());
    assert!(settings.block_duration_ms.is_none());
}

#[test]
fn test_settings_path() {
    assert_eq!(
        settings_path(Path::new("/tmp/roi")),
        PathBuf::from("/tmp/roi/rate-limit.json")
    );
}
