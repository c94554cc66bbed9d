use core::fmt;
use std::{
    backtrace::{Backtrace, BacktraceStatus},
    panic::Location,
};

use chrono::{DateTime, Local};

use super::Severity;

/// Symbol prefixes that belong to the logging plumbing rather than to the caller.
const INTERNAL_FRAMES: &[&str] = &[
    "std::backtrace",
    "xlog::logging::",
    "<xlog::logging::",
    "log::",
    "<log::",
];

/// Frames below this one belong to the runtime start-up code.
const RUNTIME_BOUNDARY: &str = "__rust_begin_short_backtrace";

const TRACE_INDENT: &str = "    ";

/// Where a logging call came from.
#[derive(Debug, Clone, Copy)]
pub enum CallSite<'a> {
    /// Location tracked through `#[track_caller]`.
    Tracked(&'static Location<'static>),
    /// Location reported by a facade such as the `log` crate.
    Reported { file: &'a str, line: u32 },
    Unknown,
}

impl fmt::Display for CallSite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallSite::Tracked(location) => {
                write!(f, "{}:{}:{}", location.file(), location.line(), location.column())
            }
            CallSite::Reported { file, line } => write!(f, "{}:{}", file, line),
            CallSite::Unknown => f.write_str("<unknown>"),
        }
    }
}

impl From<&'static Location<'static>> for CallSite<'_> {
    fn from(location: &'static Location<'static>) -> Self {
        CallSite::Tracked(location)
    }
}

/// A single logging call, alive only until it is rendered.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub severity: Severity,
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub stack_trace: Option<String>,
}

impl LogRecord {
    /// Captures a record for `severity`, taking a stack snapshot for errors.
    ///
    /// `caller` is the location of the public logging call; it heads the
    /// trace block so the block is never empty, even without debug symbols.
    pub fn capture<'a>(
        severity: Severity,
        message: impl Into<String>,
        caller: impl Into<CallSite<'a>>,
    ) -> Self {
        let caller = caller.into();
        let stack_trace = severity
            .captures_stack_trace()
            .then(|| stack_trace_from(caller));

        Self {
            severity,
            timestamp: Local::now(),
            message: message.into(),
            stack_trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    symbol: String,
    location: Option<String>,
}

fn stack_trace_from(caller: CallSite<'_>) -> String {
    let mut block = format!("{}called from {}", TRACE_INDENT, caller);

    let backtrace = Backtrace::force_capture();
    if backtrace.status() == BacktraceStatus::Captured {
        for frame in caller_frames(&backtrace.to_string()) {
            block.push('\n');
            block.push_str(TRACE_INDENT);
            match frame.location {
                Some(location) => block.push_str(&format!("at {} ({})", frame.symbol, location)),
                None => block.push_str(&format!("at {}", frame.symbol)),
            }
        }
    }

    block
}

/// Drops the logger's own frames from the top and the runtime frames from the bottom.
fn caller_frames(rendered: &str) -> Vec<Frame> {
    let frames = parse_frames(rendered);

    let start = frames
        .iter()
        .rposition(|f| is_internal(&f.symbol))
        .map_or(0, |i| i + 1);

    frames
        .into_iter()
        .skip(start)
        .take_while(|f| !f.symbol.contains(RUNTIME_BOUNDARY))
        .collect()
}

fn is_internal(symbol: &str) -> bool {
    // Unit tests live inside the crate but are callers, not plumbing.
    if symbol.contains("::tests::") {
        return false;
    }
    INTERNAL_FRAMES.iter().any(|prefix| symbol.starts_with(prefix))
}

/// Parses the `Display` output of a captured `Backtrace`:
///
/// ```text
///    3: my_app::run
///              at ./src/main.rs:10:5
/// ```
fn parse_frames(rendered: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();

    for line in rendered.lines() {
        let trimmed = line.trim();

        if let Some(location) = trimmed.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut() {
                if frame.location.is_none() {
                    frame.location = Some(location.to_string());
                }
            }
            continue;
        }

        if let Some((index, symbol)) = trimmed.split_once(": ") {
            if !index.is_empty() && index.chars().all(|c| c.is_ascii_digit()) {
                frames.push(Frame {
                    symbol: symbol.to_string(),
                    location: None,
                });
            }
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "   0: std::backtrace_rs::backtrace::libunwind::trace
             at /rustc/abc/library/std/src/../../backtrace/src/backtrace/libunwind.rs:116:5
   1: std::backtrace::Backtrace::force_capture
             at /rustc/abc/library/std/src/backtrace.rs:312:9
   2: xlog::logging::record::stack_trace_from
             at ./src/logging/record.rs:60:21
   3: <xlog::logging::logger::Logger as xlog::logging::LogHandler>::emit
             at ./src/logging/logger.rs:120:9
   4: my_app::startup::connect
             at ./src/startup.rs:42:13
   5: my_app::main
             at ./src/main.rs:7:5
   6: core::ops::function::FnOnce::call_once
             at /rustc/abc/library/core/src/ops/function.rs:250:5
   7: std::sys::backtrace::__rust_begin_short_backtrace
             at /rustc/abc/library/std/src/sys/backtrace.rs:152:18
   8: std::rt::lang_start_internal
   9: main
";

    #[test]
    fn test_parse_frames() {
        let frames = parse_frames(RENDERED);
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[4].symbol, "my_app::startup::connect");
        assert_eq!(frames[4].location.as_deref(), Some("./src/startup.rs:42:13"));
        assert_eq!(frames[8].location, None);
    }

    #[test]
    fn test_caller_frames_skip_plumbing_and_runtime() {
        let frames = caller_frames(RENDERED);
        let symbols: Vec<&str> = frames.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(
            symbols,
            vec![
                "my_app::startup::connect",
                "my_app::main",
                "core::ops::function::FnOnce::call_once"
            ]
        );
    }

    #[test]
    fn test_test_frames_are_not_internal() {
        assert!(!is_internal("xlog::logging::logger::tests::test_error"));
        assert!(is_internal("xlog::logging::logger::Logger::error"));
        assert!(is_internal("log::__private_api::log_impl"));
        assert!(!is_internal("logger_app::main"));
    }

    #[test]
    fn test_error_record_has_trace() {
        let record = LogRecord::capture(Severity::Error, "boom", Location::caller());
        let trace = record.stack_trace.expect("error records carry a trace");
        assert!(trace.starts_with("    called from "));
        assert!(trace.contains("record.rs"));
    }

    #[test]
    fn test_reported_call_site() {
        let site = CallSite::Reported {
            file: "src/net.rs",
            line: 88,
        };
        let record = LogRecord::capture(Severity::Error, "refused", site);
        let trace = record.stack_trace.unwrap();
        assert!(trace.starts_with("    called from src/net.rs:88"));
    }

    #[test]
    fn test_non_error_records_have_no_trace() {
        let info = LogRecord::capture(Severity::Info, "hello", Location::caller());
        let warning = LogRecord::capture(Severity::Warning, "careful", Location::caller());
        assert!(info.stack_trace.is_none());
        assert!(warning.stack_trace.is_none());
        assert_eq!(info.message, "hello");
    }
}
