use core::fmt;

/// Severity of a log record.
///
/// `Exception` is accepted everywhere a severity is but never produces output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Exception,
}

impl Severity {
    /// Prefix used in a formatted line, `None` for severities that are never written.
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Severity::Info => Some("INFO"),
            Severity::Warning => Some("WARNING"),
            Severity::Error => Some("ERROR"),
            Severity::Exception => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.prefix().is_some()
    }

    pub fn captures_stack_trace(&self) -> bool {
        matches!(self, Severity::Error)
    }

    pub fn from_log_level(level: log::Level) -> Option<Self> {
        match level {
            log::Level::Error => Some(Severity::Error),
            log::Level::Warn => Some(Severity::Warning),
            log::Level::Info => Some(Severity::Info),
            log::Level::Debug | log::Level::Trace => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix().unwrap_or("EXCEPTION"))
    }
}
