//! End-to-end tests for the logger lifecycle
//!
//! Each test runs one or more full process "sessions" against a temporary
//! log directory: build, log, export, shut down, build again.

use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use logkeep_core::{
    Admission, LogError, LoggerBuilder, LoggerConfig, LoggerSlot, ShutdownOutcome,
};
use tempfile::TempDir;
use zip::ZipArchive;

fn lines_of(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .split('\n')
        .skip(1)
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Session Tests
// ============================================================================

#[test]
fn test_lines_appear_after_flush_cycle() {
    let temp = TempDir::new().unwrap();
    let logger = LoggerBuilder::new(temp.path())
        .flush_interval(Duration::from_millis(20))
        .build()
        .unwrap();

    for i in 0..10 {
        logger.log_with_tag("test", &format!("message {}", i));
    }

    // Wait for the periodic cycle without shutting down
    let deadline = Instant::now() + Duration::from_secs(5);
    while logger.stats().written < 13 {
        assert!(Instant::now() < deadline, "flush cycle never ran");
        thread::sleep(Duration::from_millis(10));
    }

    let lines = lines_of(logger.current_file());
    assert_eq!(lines.len(), 13);
    for (i, line) in lines[3..].iter().enumerate() {
        assert!(line.ends_with(&format!("[test]: message {}", i)));
    }
    assert_eq!(logger.shutdown(), ShutdownOutcome::Flushed);
}

#[test]
fn test_consecutive_sessions_respect_retention() {
    let temp = TempDir::new().unwrap();
    let mut seen = Vec::new();

    // File names have second precision; space the sessions so each gets its own file.
    for session in 0..3 {
        if session > 0 {
            thread::sleep(Duration::from_millis(1100));
        }
        let logger = LoggerBuilder::new(temp.path())
            .max_age_days(1)
            .min_keep_count(2)
            .build()
            .unwrap();
        logger.log(&format!("session {}", session));
        seen.push(logger.current_file().to_path_buf());
        logger.shutdown();
    }

    // All three files are younger than a day, so none are pruned
    thread::sleep(Duration::from_millis(1100));
    let files = LoggerBuilder::new(temp.path()).build().unwrap();
    let listed = files.log_files();
    files.shutdown();
    for path in &seen {
        assert!(listed.contains(path));
    }
    assert_eq!(listed.len(), 4);
}

#[test]
fn test_export_roundtrip() {
    let temp = TempDir::new().unwrap();
    let logger = LoggerBuilder::new(temp.path()).build().unwrap();
    logger.log_with_tag("export", "payload");
    logger.shutdown();

    let archive_path = logger.request_archive().unwrap();
    let mut archive = ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    assert_eq!(archive.len(), 1);

    let name = logger
        .current_file()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();
    let mut zipped = String::new();
    archive
        .by_name(&name)
        .unwrap()
        .read_to_string(&mut zipped)
        .unwrap();
    assert_eq!(zipped, fs::read_to_string(logger.current_file()).unwrap());
}

#[test]
fn test_next_session_removes_stale_archive() {
    let temp = TempDir::new().unwrap();
    let logger = LoggerBuilder::new(temp.path()).build().unwrap();
    logger.shutdown();
    let archive = logger.request_archive().unwrap();
    assert!(archive.exists());

    let next = LoggerBuilder::new(temp.path()).build().unwrap();
    assert!(!archive.exists());
    next.shutdown();
}

#[test]
fn test_config_file_drives_builder() {
    let temp = TempDir::new().unwrap();
    let config_path = temp.path().join("logkeep.json");
    let log_dir = temp.path().join("logs");
    let json = serde_json::json!({
        "directory": log_dir,
        "app_tag": "cfg",
        "buffer_capacity": 5,
    });
    fs::write(&config_path, json.to_string()).unwrap();

    let config = LoggerConfig::from_json_file(&config_path).unwrap();
    let logger = LoggerBuilder::from_config(config)
        .flush_interval(Duration::from_secs(60))
        .build()
        .unwrap();

    // Banner takes three of the five slots
    logger.log("one");
    logger.log("two");
    assert_eq!(logger.append("three"), Admission::Dropped);
    logger.shutdown();

    let lines = lines_of(logger.current_file());
    assert_eq!(lines.len(), 5);
    assert!(lines[4].ends_with("[cfg]: two"));
    assert_eq!(logger.stats().dropped, 1);
    assert_eq!(logger.directory(), log_dir);
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_many_threads_share_one_logger() {
    let temp = TempDir::new().unwrap();
    let logger = Arc::new(
        LoggerBuilder::new(temp.path())
            .buffer_capacity(10_000)
            .flush_interval(Duration::from_millis(5))
            .build()
            .unwrap(),
    );

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..200 {
                    logger.log_with_tag(&format!("t{}", t), &i.to_string());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.shutdown();

    let stats = logger.stats();
    assert_eq!(stats.dropped, 0);
    assert_eq!(stats.written, 3 + 8 * 200);
    assert_eq!(lines_of(logger.current_file()).len(), 3 + 8 * 200);
}

// ============================================================================
// Slot Tests
// ============================================================================

static SLOT: LoggerSlot = LoggerSlot::new();

#[test]
fn test_static_slot() {
    assert!(matches!(SLOT.get(), Err(LogError::NotInitialized)));

    let temp = TempDir::new().unwrap();
    let logger = LoggerBuilder::new(temp.path()).build().unwrap();
    SLOT.install(logger).unwrap();

    SLOT.get().unwrap().log("from static");
    assert_eq!(SLOT.get().unwrap().shutdown(), ShutdownOutcome::Flushed);
    assert!(lines_of(SLOT.get().unwrap().current_file())
        .last()
        .unwrap()
        .ends_with("from static"));
}
