use rolling_file_appender::config::{FileSize, LayoutKind, RollingConfig, TriggeringConfig};
use rolling_file_appender::{AppenderConfig, LogEvent, RollingError, DEFAULT_MAX_FILE_SIZE};
use std::fs;
use tempfile::TempDir;

#[test]
fn minimal_document_uses_defaults() {
    let config = AppenderConfig::from_json(r#"{ "file": "logs/app.log" }"#).unwrap();

    assert!(config.append);
    assert!(!config.buffered_io);
    assert_eq!(config.buffer_size, 8192);
    assert_eq!(config.layout, LayoutKind::Simple);
    assert_eq!(config.max_backup_index, 1);
    assert!(config.triggering.is_none());
    assert!(config.rolling.is_none());
}

#[test]
fn policies_are_parsed() {
    let config = AppenderConfig::from_json(
        r#"{
            "file": "app.log",
            "triggering": { "type": "size", "max_file_size": "5MB" },
            "rolling": { "type": "fixed_window", "max_index": 4, "file_name_pattern": "old/app.%i.log" }
        }"#,
    )
    .unwrap();

    assert_eq!(
        config.triggering,
        Some(TriggeringConfig::Size {
            max_file_size: FileSize::Text("5MB".into())
        })
    );
    assert_eq!(
        config.rolling,
        Some(RollingConfig::FixedWindow {
            min_index: 1,
            max_index: 4,
            file_name_pattern: Some("old/app.%i.log".into()),
        })
    );
}

#[test]
fn file_sizes_accept_numbers_and_text() {
    assert_eq!(FileSize::Bytes(100).to_bytes().unwrap(), 100);
    assert_eq!(FileSize::Text("2KB".into()).to_bytes().unwrap(), 2048);
    assert_eq!(FileSize::default().to_bytes().unwrap(), DEFAULT_MAX_FILE_SIZE);
    assert!(matches!(
        FileSize::Text("lots".into()).to_bytes(),
        Err(RollingError::InvalidOption { .. })
    ));
}

#[test]
fn unknown_fields_are_rejected() {
    let err = AppenderConfig::from_json(r#"{ "file": "app.log", "encoding": "utf-8" }"#).unwrap_err();
    assert!(matches!(err, RollingError::Config(_)));
}

#[test]
fn reads_config_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("appender.json");
    fs::write(&path, r#"{ "file": "x.log", "layout": "json" }"#).unwrap();

    let config = AppenderConfig::from_path(&path).unwrap();
    assert_eq!(config.layout, LayoutKind::Json);
    assert!(matches!(
        AppenderConfig::from_path(&dir.path().join("missing.json")),
        Err(RollingError::Io(_))
    ));
}

#[test]
fn built_appender_rotates_and_writes_json() {
    let dir = TempDir::new().unwrap();
    let active = dir.path().join("app.log");
    let json = serde_json::json!({
        "file": active,
        "layout": "json",
        "triggering": { "type": "size", "max_file_size": 1 },
        "rolling": { "type": "fixed_window", "min_index": 1, "max_index": 2 }
    });
    let config = AppenderConfig::from_json(&json.to_string()).unwrap();

    let mut appender = config.build().unwrap();
    assert!(appender.activate());
    appender.append(&LogEvent::info("first")).unwrap();
    appender.append(&LogEvent::info("second")).unwrap();
    appender.shutdown();

    let backup = fs::read_to_string(dir.path().join("app.log.1")).unwrap();
    let record: serde_json::Value = serde_json::from_str(backup.trim_end()).unwrap();
    assert_eq!(record["message"], "first");
    assert_eq!(record["level"], "INFO");

    let current = fs::read_to_string(&active).unwrap();
    let record: serde_json::Value = serde_json::from_str(current.trim_end()).unwrap();
    assert_eq!(record["message"], "second");
}

#[test]
fn invalid_size_fails_the_build() {
    let config = AppenderConfig::from_json(
        r#"{ "file": "app.log", "triggering": { "type": "size", "max_file_size": "big" } }"#,
    )
    .unwrap();
    assert!(config.build().is_err());
}
