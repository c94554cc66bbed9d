use std::path::PathBuf;

use eyre::Context;

use crate::logging::{DEFAULT_FLUSH_THRESHOLD, DEFAULT_TIME_FORMAT};

pub const ENV_DIR: &str = "XLOG_DIR";
pub const ENV_FLUSH_THRESHOLD: &str = "XLOG_FLUSH_THRESHOLD";
pub const ENV_CONSOLE: &str = "XLOG_CONSOLE";
pub const ENV_TIME_FORMAT: &str = "XLOG_TIME_FORMAT";

/// Sink configuration, fixed once a logger is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    pub console: bool,
    pub use_ansi: bool,
    /// Directory for the log file; `None` disables the file sink.
    pub file_dir: Option<PathBuf>,
    pub flush_threshold: usize,
    pub time_format: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: false,
            use_ansi: true,
            file_dir: None,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl LoggerConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, which maps variable names to values.
    ///
    /// `XLOG_DIR` enables the file sink (an empty value means the default
    /// data directory), `XLOG_CONSOLE` accepts `1/0/true/false/yes/no/on/off`.
    pub fn from_lookup<F>(lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DIR) {
            config.file_dir = if dir.trim().is_empty() {
                Some(default_log_dir(&lookup).ok_or_else(|| {
                    eyre::eyre!("{} is empty and no home directory is known", ENV_DIR)
                })?)
            } else {
                Some(PathBuf::from(dir))
            };
        }

        if let Some(threshold) = lookup(ENV_FLUSH_THRESHOLD) {
            config.flush_threshold = threshold
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Invalid {} value {:?}", ENV_FLUSH_THRESHOLD, threshold))?;
        }

        if let Some(console) = lookup(ENV_CONSOLE) {
            config.console = parse_flag(&console)
                .ok_or_else(|| eyre::eyre!("Invalid {} value {:?}", ENV_CONSOLE, console))?;
        }

        if let Some(time_format) = lookup(ENV_TIME_FORMAT) {
            config.time_format = time_format;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(not(target_os = "windows"))]
fn home_dir<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<PathBuf> {
    lookup("HOME").map(PathBuf::from)
}

#[cfg(target_os = "windows")]
fn home_dir<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<PathBuf> {
    lookup("USERPROFILE").map(PathBuf::from)
}

fn data_dir<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<PathBuf> {
    let data_dir = match lookup("XDG_DATA_HOME") {
        Some(dir) => PathBuf::from(dir),
        None => home_dir(lookup)?.join(".local").join("share"),
    };

    Some(data_dir.join("xlog"))
}

fn default_log_dir<F: Fn(&str) -> Option<String>>(lookup: &F) -> Option<PathBuf> {
    data_dir(lookup).map(|dir| dir.join("logs"))
}

/// `$XDG_DATA_HOME/xlog/logs`, falling back to `~/.local/share/xlog/logs`.
pub fn log_dir() -> Option<PathBuf> {
    default_log_dir(&|key: &str| std::env::var(key).ok())
}
