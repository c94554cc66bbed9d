use std::{fs, path::Path};

use tempfile::TempDir;
use xlog::{
    logging::{Builder, MemoryConsole},
    LogHandler, LoggerConfig, Severity,
};

fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn auto_flush_at_threshold_before_close() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = Builder::new()
        .with_file_sink(temp_dir.path())
        .with_flush_threshold(2)
        .build()
        .unwrap();
    let path = logger.file_path().unwrap().to_path_buf();

    logger.log("a").unwrap();
    logger.log("b").unwrap();

    assert_eq!(lines(&path).len(), 2);
}

#[test]
fn close_forces_partial_batch_to_disk() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = Builder::new()
        .with_file_sink(temp_dir.path())
        .build()
        .unwrap();
    let path = logger.file_path().unwrap().to_path_buf();

    logger.log("one").unwrap();
    logger.log("two").unwrap();
    logger.log("three").unwrap();
    logger.close().unwrap();

    let lines = lines(&path);
    assert_eq!(lines.len(), 3);
    assert!(lines[2].ends_with("INFO: three"));
}

#[test]
fn dropping_the_logger_keeps_buffered_lines() {
    let temp_dir = TempDir::new().unwrap();
    let path = {
        let mut logger = Builder::new()
            .with_file_sink(temp_dir.path())
            .with_flush_threshold(50)
            .build()
            .unwrap();
        logger.warning("shutting down").unwrap();
        logger.file_path().unwrap().to_path_buf()
    };

    assert_eq!(lines(&path).len(), 1);
}

#[test]
fn file_lives_in_configured_directory() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().join("app").join("logs");
    let logger = Builder::new().with_file_sink(&dir).build().unwrap();

    let sink = logger.file_sink().unwrap();
    let name = sink.file_name().unwrap();

    assert_eq!(sink.dir(), Some(dir.as_path()));
    assert_eq!(name.len(), "yyyyMMddHHmmss.log".len());
    assert!(name.ends_with(".log"));
    assert!(name[..14].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(sink.threshold(), 5);
}

#[test]
fn error_record_spans_several_lines() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = Builder::new()
        .with_file_sink(temp_dir.path())
        .with_flush_threshold(1)
        .build()
        .unwrap();
    let path = logger.file_path().unwrap().to_path_buf();

    logger.error("checksum mismatch").unwrap();

    let lines = lines(&path);
    assert!(lines.len() >= 2);
    assert!(lines[0].contains("ERROR: checksum mismatch"));
    assert!(lines[1].contains("called from tests"));
    assert!(lines[1..].iter().all(|l| l.starts_with("    ")));
}

#[test]
fn console_only_creates_no_file() {
    // Every default location points into the temp dir, so a file sink that
    // switched itself on would leave a file there.
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_string_lossy().into_owned();
    let config = LoggerConfig::from_lookup(|key: &str| match key {
        "XDG_DATA_HOME" | "HOME" | "USERPROFILE" => Some(root.clone()),
        "XLOG_CONSOLE" => Some("1".to_string()),
        _ => None,
    })
    .unwrap();
    assert!(config.file_dir.is_none());

    let console = MemoryConsole::new();
    let mut logger = Builder::from_config(config)
        .with_console(console.clone())
        .build()
        .unwrap();

    logger.log("hello").unwrap();
    logger.error("oops").unwrap();
    logger.close().unwrap();

    assert!(!logger.is_file_enabled());
    assert!(logger.file_path().is_none());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    assert_eq!(console.writes().len(), 2);
}

#[test]
fn disabled_console_never_written() {
    let temp_dir = TempDir::new().unwrap();
    let console = MemoryConsole::new();
    let config = LoggerConfig {
        console: false,
        file_dir: Some(temp_dir.path().to_path_buf()),
        ..LoggerConfig::default()
    };
    let mut logger = Builder::from_config(config).build().unwrap();

    for severity in [
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Exception,
    ] {
        logger.emit(severity, "quiet").unwrap();
    }

    assert!(!logger.is_console_enabled());
    assert!(console.is_empty());
}

#[test]
fn formatted_macros_reach_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = Builder::new()
        .with_file_sink(temp_dir.path())
        .with_flush_threshold(2)
        .build()
        .unwrap();
    let path = logger.file_path().unwrap().to_path_buf();

    xlog::log_info!(logger, "{} bytes", 512).unwrap();
    xlog::log_warning!(logger, "{}ms", 950).unwrap();

    let lines = lines(&path);
    assert!(lines[0].ends_with("INFO: 512 bytes"));
    assert!(lines[1].ends_with("WARNING: 950ms"));
}

#[test]
fn unwritable_directory_fails_build() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("not-a-dir");
    fs::write(&blocker, b"file in the way").unwrap();

    let result = Builder::new().with_file_sink(blocker.join("logs")).build();
    assert!(result.is_err());
}
