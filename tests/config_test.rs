//! Preference file tests
//!
//! Tests that preferences load with sensible defaults and survive a
//! save/load cycle

use speakr::speech::EngineKind;
use speakr::state::config::{Config, Paths, Preferences};
use std::fs;

#[test]
fn test_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from(&dir.path().join("speakr.json"));

    assert_eq!(config.preferences(), &Preferences::default());
    assert_eq!(config.engine(), Some(EngineKind::Google));
    assert_eq!(config.voice_id(), "en");
    assert!(config.cache_enabled());
}

#[test]
fn test_malformed_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speakr.json");
    fs::write(&path, "{ not json").unwrap();

    let config = Config::load_from(&path);
    assert_eq!(config.preferences(), &Preferences::default());
}

#[test]
fn test_save_creates_parent_and_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config").join("speakr.json");

    let mut config = Config::load_from(&path);
    config.set_engine(EngineKind::EspeakNg);
    config.set_voice_id("en+m3");
    config.set_cache_enabled(false);
    config.save().expect("Failed to save config");

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\n  \"engine\": \"espeak-ng\""), "not pretty printed: {}", raw);

    let reloaded = Config::load_from(&path);
    assert_eq!(reloaded.engine(), Some(EngineKind::EspeakNg));
    assert_eq!(reloaded.voice_id(), "en+m3");
    assert!(!reloaded.cache_enabled());
    assert_eq!(reloaded.path(), &path);
}

#[test]
fn test_legacy_keys_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speakr.json");
    fs::write(
        &path,
        r#"{"engine": "festival", "voice_lang": "en", "hotkey_enabled": true, "clipboard_monitor": false}"#,
    )
    .unwrap();

    let config = Config::load_from(&path);
    assert_eq!(config.engine(), Some(EngineKind::Festival));
    assert_eq!(config.voice_id(), "en");
}

#[test]
fn test_paths_in_dir() {
    let dir = tempfile::tempdir().unwrap();
    let paths = Paths::in_dir(dir.path());
    assert!(paths.config_file.starts_with(dir.path()));
    assert!(paths.cache_dir.starts_with(dir.path()));
}

#[test]
fn test_out_of_range_rate_keeps_engine_and_voice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("speakr.json");
    fs::write(
        &path,
        r#"{"engine": "festival", "voice_id": "default", "rate": 300, "volume": 70}"#,
    )
    .unwrap();

    let config = Config::load_from(&path);
    assert_eq!(config.engine(), Some(EngineKind::Festival));
    assert_eq!(config.voice_id(), "default");
    assert_eq!(config.rate(), None);
    assert_eq!(config.volume(), Some(70));

    // Saving drops the bad value instead of resetting the file
    config.save().unwrap();
    let saved = fs::read_to_string(&path).unwrap();
    assert!(saved.contains("\"engine\": \"festival\""));
    assert!(!saved.contains("\"rate\""));
}
