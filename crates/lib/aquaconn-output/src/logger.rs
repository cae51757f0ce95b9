use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use serde::Deserialize;

use crate::error::{OutputError, Result};

const FILE_PATTERN: &str = "{d(%Y.%m.%d %H:%M:%S)} | {({l}):5.5} | {({f}:{L}):>40.40} — {m}{n}";
const CONSOLE_PATTERN: &str = "{({l}):5.5} {m}{n}";

#[derive(Deserialize, Debug, Clone)]
pub struct LogSettings {
    pub log_path: String,
    pub log_level: String,
    pub log_file_name: String,
    pub log_overwrite: bool,
}

pub fn setup_logging(log_level: &str, log_file_path: &Path, console: bool) -> Result<Config> {
    let log_level = get_logging_level(log_level);
    let log_file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FILE_PATTERN)))
        .build(log_file_path)
        .map_err(|e| OutputError::io(log_file_path, e))?;

    let mut builder = Config::builder().appender(Appender::builder().build("file", Box::new(log_file)));
    let mut root = Root::builder().appender("file");
    if console {
        let stderr = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("console", Box::new(stderr)));
        root = root.appender("console");
    }
    builder
        .build(root.build(log_level))
        .map_err(|e| OutputError::Logger(e.to_string()))
}

fn get_logging_level(log_level: &str) -> LevelFilter {
    match log_level {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Picks the log file inside `<config_path>/<log_path>/logs`. When an old log exists and
/// overwriting is off, the new file gets a timestamp suffix instead.
pub fn log_file_path(config_path: &Path, log_settings: &LogSettings) -> Result<PathBuf> {
    let log_path = config_path.join(&log_settings.log_path).join("logs");
    if !log_path.exists() {
        fs::create_dir_all(&log_path).map_err(|e| OutputError::io(&log_path, e))?;
    }

    let log_file_path = log_path.join(&log_settings.log_file_name);
    if !log_file_path.exists() {
        return Ok(log_file_path);
    }
    if log_settings.log_overwrite {
        fs::remove_file(&log_file_path).map_err(|e| OutputError::io(&log_file_path, e))?;
        return Ok(log_file_path);
    }
    let stem = log_settings
        .log_file_name
        .split('.')
        .next()
        .unwrap_or("aquaconn");
    let suffix = Utc::now().format("_%d%m%Y_%H%M%S");
    Ok(log_path.join(format!("{}{}.log", stem, suffix)))
}

/// Starts logging for the whole process and returns the file being written to.
pub fn initiate_logger(
    config_path: &Path,
    log_settings: &LogSettings,
    console: bool,
) -> Result<PathBuf> {
    let log_file_path = log_file_path(config_path, log_settings)?;
    let logger_config = setup_logging(&log_settings.log_level, &log_file_path, console)?;
    log4rs::init_config(logger_config).map_err(|e| OutputError::Logger(e.to_string()))?;
    Ok(log_file_path)
}
