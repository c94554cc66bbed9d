use super::{LogFormatter, LogRecord};

pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S";

/// Renders `[HH:MM:SS] LEVEL: message`, followed by the trace block for errors.
#[derive(Debug, Clone)]
pub struct DefaultFormatter {
    time_format: String,
}

impl DefaultFormatter {
    pub fn new(time_format: impl Into<String>) -> Self {
        Self {
            time_format: time_format.into(),
        }
    }

    fn timestamp(&self, record: &LogRecord) -> String {
        format!("[{}]", record.timestamp.format(&self.time_format))
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_FORMAT)
    }
}

impl LogFormatter for DefaultFormatter {
    fn format(&self, record: &LogRecord) -> Option<String> {
        let level = record.severity.prefix()?;
        let line = format!("{} {}: {}", self.timestamp(record), level, record.message);

        match &record.stack_trace {
            Some(trace) => Some(format!("{}\n{}", line, trace)),
            None => Some(line),
        }
    }
}
