use core::fmt;

mod bridge;
mod formatters;
mod logger;
mod macros;
mod record;
mod severity;
mod sinks;

pub use bridge::LogBridge;
pub use formatters::{DefaultFormatter, DEFAULT_TIME_FORMAT};
pub use logger::{Builder, Logger, LoggingGuard};
pub use record::LogRecord;
pub use severity::Severity;
pub use sinks::{
    log_file_name, BufferedFileSink, MemoryConsole, StdConsole, DEFAULT_FLUSH_THRESHOLD,
    WRITE_BUFFER_CAPACITY,
};

pub trait LogFormatter: Sync + Send {
    /// Renders a record, or `None` when the severity produces no output.
    fn format(&self, record: &LogRecord) -> Option<String>;
}

/// Interactive console with one entry point per severity.
pub trait Console: Send {
    fn info(&mut self, message: &str) -> eyre::Result<()>;
    fn warning(&mut self, message: &str) -> eyre::Result<()>;
    fn error(&mut self, message: &str) -> eyre::Result<()>;

    fn write(&mut self, severity: Severity, message: &str) -> eyre::Result<()> {
        match severity {
            Severity::Info => self.info(message),
            Severity::Warning => self.warning(message),
            Severity::Error => self.error(message),
            Severity::Exception => Ok(()),
        }
    }
}

/// The capability a host logging contract is reduced to.
pub trait LogHandler {
    #[track_caller]
    fn emit(&mut self, severity: Severity, message: &str) -> eyre::Result<()>;

    /// Tags only exist to satisfy host contracts and are dropped.
    #[track_caller]
    fn emit_tagged(&mut self, severity: Severity, _tag: &str, message: &str) -> eyre::Result<()> {
        self.emit(severity, message)
    }

    #[track_caller]
    fn emit_fmt(&mut self, severity: Severity, args: fmt::Arguments<'_>) -> eyre::Result<()> {
        match args.as_str() {
            Some(message) => self.emit(severity, message),
            None => self.emit(severity, &args.to_string()),
        }
    }
}
