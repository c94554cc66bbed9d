use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::{DateTime, Local};
use eyre::{bail, eyre, Context};
use yansi::{Condition, Paint};

use super::{Console, Severity};

pub const DEFAULT_FLUSH_THRESHOLD: usize = 5;

/// In-memory buffer size of an open file sink.
pub const WRITE_BUFFER_CAPACITY: usize = 64 * 1024;

/// Builds the `yyyyMMddHHmmss.log` file name for a sink opened at `now`.
pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}.log", now.format("%Y%m%d%H%M%S"))
}

enum State {
    Uninitialized,
    Open(BufWriter<File>),
    Closed,
}

/// File sink that batches lines in memory and flushes every `threshold` lines.
///
/// Lines are held in a [`WRITE_BUFFER_CAPACITY`] byte buffer. A batch that
/// outgrows it reaches the file early, before `threshold` is hit.
///
/// Lifecycle is `Uninitialized -> Open -> Closed`. Appending before `open` is
/// an error; appending after `close` is ignored. Closing is idempotent and
/// also happens on drop, so buffered lines survive a normal shutdown.
pub struct BufferedFileSink {
    state: State,
    path: Option<PathBuf>,
    threshold: usize,
    pending: usize,
    flushes: u64,
}

impl BufferedFileSink {
    pub fn new(threshold: usize) -> eyre::Result<Self> {
        if threshold == 0 {
            bail!("flush threshold must be at least 1");
        }

        Ok(Self {
            state: State::Uninitialized,
            path: None,
            threshold,
            pending: 0,
            flushes: 0,
        })
    }

    /// Creates `dir` if needed and opens a fresh, time-stamped log file in it.
    pub fn open(&mut self, dir: impl AsRef<Path>) -> eyre::Result<&Path> {
        match self.state {
            State::Uninitialized => {}
            State::Open(_) => bail!("file sink is already open at {}", self.describe_path()),
            State::Closed => bail!("file sink was closed and cannot be reopened"),
        }

        let dir = dir.as_ref();
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed creating log directory {}", dir.display()))?;

        let path = dir.join(log_file_name(Local::now()));
        let file = File::create(&path)
            .with_context(|| format!("Failed opening or creating log file {}", path.display()))?;

        tracing::debug!(path = %path.display(), threshold = self.threshold, "file sink opened");

        self.state = State::Open(BufWriter::with_capacity(WRITE_BUFFER_CAPACITY, file));
        Ok(self.path.insert(path).as_path())
    }

    /// Buffers one record and flushes once `threshold` records are pending.
    pub fn append(&mut self, line: &str) -> eyre::Result<()> {
        let writer = match &mut self.state {
            State::Open(writer) => writer,
            State::Uninitialized => return Err(eyre!("file sink not initialized")),
            State::Closed => return Ok(()),
        };

        writeln!(writer, "{}", line)
            .with_context(|| format!("Failed writing to log file {}", self.describe_path()))?;
        self.pending += 1;

        if self.pending >= self.threshold {
            self.flush()?;
        }

        Ok(())
    }

    /// Pushes buffered lines to the file regardless of how many are pending.
    pub fn flush(&mut self) -> eyre::Result<()> {
        let writer = match &mut self.state {
            State::Open(writer) => writer,
            State::Uninitialized => return Err(eyre!("file sink not initialized")),
            State::Closed => return Ok(()),
        };

        writer
            .flush()
            .with_context(|| format!("Failed flushing log file {}", self.describe_path()))?;
        self.pending = 0;
        self.flushes += 1;

        Ok(())
    }

    /// Flushes, syncs and releases the file. Safe to call any number of times.
    pub fn close(&mut self) -> eyre::Result<()> {
        let state = std::mem::replace(&mut self.state, State::Closed);
        let State::Open(mut writer) = state else {
            return Ok(());
        };

        self.pending = 0;
        writer
            .flush()
            .with_context(|| format!("Failed flushing log file {}", self.describe_path()))?;
        writer
            .get_ref()
            .sync_all()
            .with_context(|| format!("Failed syncing log file {}", self.describe_path()))?;

        tracing::debug!(path = %self.describe_path(), flushes = self.flushes, "file sink closed");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Records appended since the last flush.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    fn describe_path(&self) -> String {
        self.path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<unopened>".to_string())
    }
}

impl Drop for BufferedFileSink {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(error = %err, "failed closing file sink on drop");
        }
    }
}

/// Console writing info to stdout and warnings/errors to stderr.
pub struct StdConsole {
    use_ansi: bool,
}

impl StdConsole {
    pub fn new(use_ansi: bool) -> Self {
        Self { use_ansi }
    }

    fn when(&self, condition: Condition) -> Condition {
        if self.use_ansi {
            condition
        } else {
            Condition::NEVER
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Console for StdConsole {
    fn info(&mut self, message: &str) -> eyre::Result<()> {
        let mut writer = std::io::stdout().lock();

        writeln!(writer, "{}", message)?;
        writer.flush().context("Can't flush stdout")
    }

    fn warning(&mut self, message: &str) -> eyre::Result<()> {
        let mut writer = std::io::stderr().lock();
        let painted = message.yellow().whenever(self.when(Condition::STDERR_IS_TTY));

        writeln!(writer, "{}", painted)?;
        writer.flush().context("Can't flush stderr")
    }

    fn error(&mut self, message: &str) -> eyre::Result<()> {
        let mut writer = std::io::stderr().lock();
        let painted = message.red().bold().whenever(self.when(Condition::STDERR_IS_TTY));

        writeln!(writer, "{}", painted)?;
        writer.flush().context("Can't flush stderr")
    }
}

/// Console that keeps every write in memory, for embedding applications' tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryConsole {
    writes: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemoryConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(Severity, String)> {
        self.writes
            .lock()
            .map(|w| w.clone())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.lock().map(|w| w.is_empty()).unwrap_or(true)
    }

    fn push(&self, severity: Severity, message: &str) -> eyre::Result<()> {
        let mut writes = self.writes.lock().map_err(|e| eyre!(e.to_string()))?;
        writes.push((severity, message.to_string()));
        Ok(())
    }
}

impl Console for MemoryConsole {
    fn info(&mut self, message: &str) -> eyre::Result<()> {
        self.push(Severity::Info, message)
    }

    fn warning(&mut self, message: &str) -> eyre::Result<()> {
        self.push(Severity::Warning, message)
    }

    fn error(&mut self, message: &str) -> eyre::Result<()> {
        self.push(Severity::Error, message)
    }
}
