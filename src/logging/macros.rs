//! Formatting shorthands over [`LogHandler::emit_fmt`](crate::logging::LogHandler::emit_fmt).
//!
//! Each macro evaluates to the `eyre::Result<()>` of the call.

#[macro_export]
macro_rules! log_format {
    ($logger:expr, $severity:expr, $($arg:tt)*) => {{
        use $crate::logging::LogHandler as _;
        $logger.emit_fmt($severity, format_args!($($arg)*))
    }};
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)*) => { $crate::log_format!($logger, $crate::logging::Severity::Info, $($arg)*) };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $($arg:tt)*) => { $crate::log_format!($logger, $crate::logging::Severity::Warning, $($arg)*) };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)*) => { $crate::log_format!($logger, $crate::logging::Severity::Error, $($arg)*) };
}
