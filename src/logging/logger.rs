use core::fmt;
use std::{
    panic::Location,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use eyre::{bail, Context};
use log::LevelFilter;

use super::{
    bridge::LogBridge,
    formatters::DefaultFormatter,
    record::CallSite,
    sinks::{BufferedFileSink, StdConsole},
    Console, LogFormatter, LogHandler, LogRecord, Severity,
};
use crate::config::LoggerConfig;

/// Routes each logging call to the console and the buffered file sink.
///
/// Every call runs to completion on the caller's thread. The logger holds no
/// lock of its own; share it behind a `Mutex` (or use [`Logger::init`]) when
/// several threads log.
pub struct Logger {
    console: Option<Box<dyn Console>>,
    file: Option<BufferedFileSink>,
    formatter: Box<dyn LogFormatter>,
}

impl Logger {
    pub fn new(
        console: Option<Box<dyn Console>>,
        file: Option<BufferedFileSink>,
        formatter: Box<dyn LogFormatter>,
    ) -> Self {
        Self {
            console,
            file,
            formatter,
        }
    }

    /// Registers this logger behind the `log` crate facade.
    ///
    /// The returned guard closes the logger when dropped; keep it alive until
    /// the application shuts down.
    pub fn init(self) -> eyre::Result<LoggingGuard> {
        let shared = Arc::new(Mutex::new(self));

        log::set_boxed_logger(Box::new(LogBridge::new(Arc::clone(&shared))))
            .context("Failed registering boxed logger")?;
        log::set_max_level(LevelFilter::Info);

        Ok(LoggingGuard { logger: shared })
    }

    #[track_caller]
    pub fn log(&mut self, message: impl fmt::Display) -> eyre::Result<()> {
        self.emit(Severity::Info, &message.to_string())
    }

    #[track_caller]
    pub fn warning(&mut self, message: impl fmt::Display) -> eyre::Result<()> {
        self.emit(Severity::Warning, &message.to_string())
    }

    #[track_caller]
    pub fn error(&mut self, message: impl fmt::Display) -> eyre::Result<()> {
        self.emit(Severity::Error, &message.to_string())
    }

    #[track_caller]
    pub fn log_fmt(&mut self, severity: Severity, args: fmt::Arguments<'_>) -> eyre::Result<()> {
        self.emit_fmt(severity, args)
    }

    pub(crate) fn emit_from(
        &mut self,
        severity: Severity,
        message: &str,
        call_site: CallSite<'_>,
    ) -> eyre::Result<()> {
        if !severity.is_supported() {
            return Ok(());
        }

        // A broken console must not starve the file sink.
        if let Some(console) = self.console.as_mut() {
            if let Err(err) = console.write(severity, message) {
                tracing::warn!(error = %err, "Failed writing to console");
            }
        }

        let Some(sink) = self.file.as_mut() else {
            return Ok(());
        };

        let record = LogRecord::capture(severity, message, call_site);
        match self.formatter.format(&record) {
            Some(line) => sink.append(&line),
            None => Ok(()),
        }
    }

    /// Forces buffered lines to the file without waiting for the threshold.
    pub fn flush(&mut self) -> eyre::Result<()> {
        match self.file.as_mut() {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }

    /// Flushes and releases the log file. Calling it again does nothing.
    pub fn close(&mut self) -> eyre::Result<()> {
        match self.file.as_mut() {
            Some(sink) => sink.close(),
            None => Ok(()),
        }
    }

    pub fn is_console_enabled(&self) -> bool {
        self.console.is_some()
    }

    pub fn is_file_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn file_sink(&self) -> Option<&BufferedFileSink> {
        self.file.as_ref()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_ref().and_then(BufferedFileSink::path)
    }
}

impl LogHandler for Logger {
    #[track_caller]
    fn emit(&mut self, severity: Severity, message: &str) -> eyre::Result<()> {
        self.emit_from(severity, message, CallSite::Tracked(Location::caller()))
    }
}

/// Keeps a logger registered with [`Logger::init`] alive and closes it on drop.
pub struct LoggingGuard {
    logger: Arc<Mutex<Logger>>,
}

impl LoggingGuard {
    /// Closes the logger now instead of waiting for the guard to drop.
    pub fn close(self) -> eyre::Result<()> {
        self.close_logger()
    }

    pub fn file_path(&self) -> Option<PathBuf> {
        self.logger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .file_path()
            .map(Path::to_path_buf)
    }

    fn close_logger(&self) -> eyre::Result<()> {
        self.logger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Err(err) = self.close_logger() {
            tracing::warn!(error = %err, "failed closing logger on shutdown");
        }
    }
}

pub struct Builder {
    config: LoggerConfig,
    console: Option<Box<dyn Console>>,
    formatter_builder: Box<dyn Fn(&LoggerConfig) -> Box<dyn LogFormatter>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::from_config(LoggerConfig::default())
    }

    pub fn from_config(config: LoggerConfig) -> Self {
        Self {
            config,
            console: None,
            formatter_builder: Box::new(|config: &LoggerConfig| -> Box<dyn LogFormatter> {
                Box::new(DefaultFormatter::new(config.time_format.clone()))
            }),
        }
    }

    pub fn with_file_sink(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.file_dir = Some(dir.into());
        self
    }

    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.config.flush_threshold = threshold;
        self
    }

    pub fn with_console_sink(mut self) -> Self {
        self.config.console = true;
        self
    }

    /// Enables the console sink with a custom console implementation.
    pub fn with_console(mut self, console: impl Console + 'static) -> Self {
        self.config.console = true;
        self.console = Some(Box::new(console));
        self
    }

    pub fn with_time_format(mut self, time_format: impl Into<String>) -> Self {
        self.config.time_format = time_format.into();
        self
    }

    pub fn with_ansi(mut self, use_ansi: bool) -> Self {
        self.config.use_ansi = use_ansi;
        self
    }

    pub fn with_formatter<F>(mut self, formatter_builder: F) -> Self
    where
        F: Fn(&LoggerConfig) -> Box<dyn LogFormatter> + 'static,
    {
        self.formatter_builder = Box::new(formatter_builder);
        self
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Opens the configured sinks and hands back a ready logger.
    pub fn build(self) -> eyre::Result<Logger> {
        if self.config.flush_threshold == 0 {
            bail!("flush threshold must be at least 1");
        }

        let file = match &self.config.file_dir {
            Some(dir) => {
                let mut sink = BufferedFileSink::new(self.config.flush_threshold)?;
                sink.open(dir).context("Failed constructing file sink")?;
                Some(sink)
            }
            None => None,
        };

        let console = match (self.config.console, self.console) {
            (false, _) => None,
            (true, Some(console)) => Some(console),
            (true, None) => Some(Box::new(StdConsole::new(self.config.use_ansi)) as Box<dyn Console>),
        };

        let formatter = (self.formatter_builder)(&self.config);
        Ok(Logger::new(console, file, formatter))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
