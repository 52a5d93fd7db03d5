// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use stereogram::constants::folders;
use stereogram::{Config, ErrorCode, ViewingMethod};

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.thumbnail_size, 100);
    assert_eq!(
        config.default_viewing_method,
        ViewingMethod::CrossEye,
        "New stereograms should default to cross-eye viewing"
    );
    assert!(
        config.store_dir.ends_with(folders::STORE),
        "Store should live in its own folder"
    );
    assert!(config.export_dir.ends_with(folders::EXPORT));
}

#[test]
fn test_compose_config_follows_config() {
    let config = Config {
        frame_delay_ms: 400,
        ..Config::default()
    };
    let compose = config.compose_config();
    assert_eq!(compose.quality, config.export_quality);
    assert_eq!(compose.frame_delay.as_millis(), 400);
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = Config::load_from(&path).unwrap_err();
    assert!(err.is(ErrorCode::InvalidFileFormat));
}

#[test]
fn test_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.is(ErrorCode::FileNotFound));
}

#[test]
fn test_malformed_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "thumbnail_size": "big" }"#).unwrap();

    assert_eq!(
        Config::load_or_default(&path),
        Config::default(),
        "A broken config file should not stop the program"
    );
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        Config::load_or_default(&dir.path().join("absent.json")),
        Config::default()
    );
}

#[test]
fn test_saved_config_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let config = Config {
        thumbnail_size: 48,
        ..Config::default()
    };
    config.save_to(&path).unwrap();

    assert_eq!(Config::load_or_default(&path), config);
}
