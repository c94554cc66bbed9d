//! Small logging facility with an interactive console sink and a
//! line-batched file sink.
//!
//! ```no_run
//! use xlog::logging::Builder;
//!
//! # fn main() -> eyre::Result<()> {
//! let mut logger = Builder::new()
//!     .with_file_sink("logs")
//!     .with_flush_threshold(5)
//!     .with_console_sink()
//!     .build()?;
//!
//! logger.log("service started")?;
//! logger.warning("cache is cold")?;
//! logger.error("upstream refused the connection")?;
//! logger.close()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;

pub use config::LoggerConfig;
pub use logging::{Builder, LogHandler, Logger, Severity};
