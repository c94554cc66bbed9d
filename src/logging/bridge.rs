//! Bridge from the `log` crate facade to a [`Logger`].

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex, PoisonError,
};

use log::{Log, Metadata, Record};

use super::{record::CallSite, Logger, Severity};

/// `log::Log` implementation that serializes every call onto one logger.
///
/// `Debug` and `Trace` records are not enabled. Errors cannot travel back
/// through `log::Log::log`, so the first one is reported on stderr and the
/// rest only as `tracing` events.
pub struct LogBridge {
    logger: Arc<Mutex<Logger>>,
    reported: AtomicBool,
}

impl LogBridge {
    pub fn new(logger: Arc<Mutex<Logger>>) -> Self {
        Self {
            logger,
            reported: AtomicBool::new(false),
        }
    }

    fn report(&self, err: eyre::Report) {
        tracing::error!(error = %err, "log bridge failed writing a record");

        if !self.reported.swap(true, Ordering::Relaxed) {
            eprintln!("xlog: {:?}", err);
        }
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata) -> bool {
        Severity::from_log_level(metadata.level()).is_some()
    }

    fn log(&self, record: &Record) {
        let Some(severity) = Severity::from_log_level(record.level()) else {
            return;
        };

        let call_site = match (record.file(), record.line()) {
            (Some(file), Some(line)) => CallSite::Reported { file, line },
            _ => CallSite::Unknown,
        };

        let message = record.args().to_string();
        let result = self
            .logger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .emit_from(severity, &message, call_site);

        if let Err(err) = result {
            self.report(err);
        }
    }

    fn flush(&self) {
        let result = self
            .logger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .flush();

        if let Err(err) = result {
            self.report(err);
        }
    }
}
