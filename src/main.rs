use log::{error, info, Level};
use rolling_file_appender::{AppenderConfig, LogEvent, RollingError};
use std::path::PathBuf;

const DEMO_CONFIG: &str = r#"{
    "file": "logs/demo.log",
    "max_backup_index": 3,
    "triggering": { "type": "size", "max_file_size": "1KB" },
    "rolling": { "type": "fixed_window", "min_index": 1, "max_index": 3 }
}"#;

fn run() -> Result<(), RollingError> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppenderConfig::from_path(&PathBuf::from(path))?,
        None => AppenderConfig::from_json(DEMO_CONFIG)?,
    };

    let mut appender = config.build()?;
    if !appender.activate() {
        error!("Rotation disabled for {}", appender.name());
    }

    for n in 0..200 {
        let event = LogEvent::new(Level::Info, "demo", format!("event number {n}"));
        appender.append(&event)?;
    }
    appender.shutdown();

    info!(
        "Wrote 200 events, active file {} holds {} bytes",
        appender.active_file().display(),
        appender.file_length()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("Demo failed: {err}");
        std::process::exit(1);
    }
}
