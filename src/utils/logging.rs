//! File logging for tfm.
//!
//! The terminal belongs to the UI while tfm runs, so tracing output goes to a
//! timestamped file under the user cache directory:
//! `<cache>/tfm/logs/tfm-YYYYmmdd-HHMMSS.log`.
//!
//! The level comes from `[general] log_level`; the `TFM_LOG` environment
//! variable, when set, replaces it with a full filter directive.

use chrono::{Local, NaiveDateTime};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use std::fs::{self, File};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;

pub const LOG_ENV: &str = "TFM_LOG";

pub fn log_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("tfm").join("logs"))
}

pub fn log_file_name(at: NaiveDateTime) -> String {
    format!("tfm-{}.log", at.format("%Y%m%d-%H%M%S"))
}

/// Filter from the env directive if it parses, else from the configured level.
/// An unknown configured level means `info`.
pub fn build_filter(configured: &str, env: Option<&str>) -> EnvFilter {
    if let Some(directive) = env
        && let Ok(filter) = EnvFilter::try_new(directive)
    {
        return filter;
    }
    let level = LevelFilter::from_str(configured.trim()).unwrap_or(LevelFilter::INFO);
    EnvFilter::new(level.to_string())
}

/// Installs the global file subscriber.
///
/// Returns the log file path, or `None` when the file could not be created; in
/// that case nothing is logged and startup goes on.
pub fn init(configured: &str) -> Option<PathBuf> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join(log_file_name(Local::now().naive_local()));
    let file = File::create(&path).ok()?;

    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(configured, env.as_deref());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(path)
}
