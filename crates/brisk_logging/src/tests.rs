use std::{io, sync::Arc};

use brisk_common::{collections::DynArr, dynarr};
use parking_lot::Mutex;

use super::*;

const TEST_CAT: LogCategory = LogCategory::new_with_sub("Test", "Logger");

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn quiet_logger() -> (Logger, SharedBuffer) {
    let logger = Logger::new();
    logger.set_log_to_console(false);
    let buffer = SharedBuffer::default();
    assert!(logger.add_writer(Box::new(buffer.clone())).is_ok());
    (logger, buffer)
}

#[test]
fn category_display() {
    assert_eq!(LogCategory::new("Main").to_string(), "Main");
    assert_eq!(TEST_CAT.to_string(), "Test(Logger)");
}

#[test]
fn level_ordering_and_filter() {
    assert!(LogLevel::Severe < LogLevel::Debug);

    let (logger, buffer) = quiet_logger();
    logger.set_max_level(LogLevel::Warning);
    assert_eq!(logger.max_level(), LogLevel::Warning);
    assert!(logger.is_enabled(LogLevel::Error));
    assert!(!logger.is_enabled(LogLevel::Info));

    log_info!(logger, TEST_CAT, "hidden {}", 1);
    log_warning!(logger, TEST_CAT, "shown {}", 2);
    logger.flush();

    let out = buffer.contents();
    assert!(!out.contains("hidden 1"));
    assert!(out.contains("shown 2"));
    assert!(out.contains("[Test(Logger)]"));
}

#[test]
fn messages_are_cached_until_flush() {
    let (logger, buffer) = quiet_logger();
    log_info!(logger, TEST_CAT, "cached");
    assert!(buffer.contents().is_empty());

    logger.flush();
    assert!(buffer.contents().ends_with("cached\n"));
}

#[test]
fn always_flush_writes_immediately() {
    let (logger, buffer) = quiet_logger();
    logger.set_always_flush(true);
    log_info!(logger, TEST_CAT, "now");
    assert!(buffer.contents().contains("now"));
}

#[test]
fn large_cache_flushes_itself() {
    let (logger, buffer) = quiet_logger();
    let line = "x".repeat(128);
    for _ in 0..64 {
        log_info!(logger, TEST_CAT, "{line}");
    }
    assert!(!buffer.contents().is_empty());
}

#[test]
fn location_only_for_errors_and_debug() {
    let (logger, buffer) = quiet_logger();
    log_error!(logger, TEST_CAT, "bad");
    log_info!(logger, TEST_CAT, "fine");
    logger.flush();

    let out = buffer.contents();
    let mut lines = out.lines();
    let error_line = lines.next().unwrap_or_default();
    let info_line = lines.next().unwrap_or_default();
    assert!(error_line.contains(file!()));
    assert!(error_line.contains("location_only_for_errors_and_debug"));
    assert!(!info_line.contains(file!()));
}

#[test]
fn writer_slots_are_limited() {
    let logger = Logger::new();
    logger.set_log_to_console(false);
    for idx in 0..8 {
        assert_eq!(logger.add_writer(Box::new(io::sink())).ok(), Some(idx));
    }
    assert!(logger.add_writer(Box::new(io::sink())).is_err());

    assert!(logger.remove_writer(3).is_some());
    assert!(logger.remove_writer(3).is_none());
    assert!(logger.remove_writer(100).is_none());
    assert_eq!(logger.add_writer(Box::new(io::sink())).ok(), Some(3));
}

#[test]
fn removed_writer_receives_cached_messages() {
    let (logger, buffer) = quiet_logger();
    log_info!(logger, TEST_CAT, "before removal");
    assert!(logger.remove_writer(0).is_some());
    assert!(buffer.contents().contains("before removal"));

    log_info!(logger, TEST_CAT, "after removal");
    logger.flush();
    assert!(!buffer.contents().contains("after removal"));
}

#[test]
fn history_keeps_every_message() {
    let (logger, _buffer) = quiet_logger();
    log_info!(logger, TEST_CAT, "not kept");
    logger.set_keep_history(true);
    log_info!(logger, TEST_CAT, "first");
    log_warning!(logger, TEST_CAT, "second");

    assert_eq!(logger.history_len(), 2);
    let history = logger.history();
    assert!(history[0].ends_with("first\n"));
    assert!(history[1].ends_with("second\n"));

    let mut dump = Vec::new();
    assert!(logger.dump_history(&mut dump).is_ok());
    let dump = String::from_utf8_lossy(&dump);
    assert!(dump.contains("first") && dump.contains("second"));
    assert!(!dump.contains("not kept"));

    logger.set_keep_history(false);
    assert_eq!(logger.history_len(), 0);
    assert!(logger.history().is_empty());
}

#[test]
fn drop_flushes() {
    let (logger, buffer) = quiet_logger();
    log_info!(logger, TEST_CAT, "last words");
    drop(logger);
    assert!(buffer.contents().contains("last words"));
}

#[test]
fn settings_apply() {
    let settings = LoggerSettings::new()
        .with_max_level(LogLevel::Error)
        .with_log_to_console(false)
        .with_keep_history(true)
        .with_always_flush(true);

    let logger = match Logger::with_settings(&settings) {
        Ok(logger) => logger,
        Err(err) => panic!("failed to create logger: {err}"),
    };
    assert_eq!(logger.max_level(), LogLevel::Error);

    log_info!(logger, TEST_CAT, "filtered");
    log_error!(logger, TEST_CAT, "kept");
    assert_eq!(logger.history_len(), 1);
}

#[test]
fn settings_log_file() {
    let path = std::env::temp_dir().join(format!("brisk_logging_test_{}.log", std::process::id()));
    let settings = LoggerSettings::new()
        .with_log_to_console(false)
        .with_log_file(Some(path.clone()));
    assert_eq!(settings.log_file(), Some(path.as_path()));

    {
        let logger = match Logger::with_settings(&settings) {
            Ok(logger) => logger,
            Err(err) => panic!("failed to create logger: {err}"),
        };
        log_info!(logger, TEST_CAT, "into the file");
    }

    let contents = std::fs::read_to_string(&path).unwrap_or_default();
    _ = std::fs::remove_file(&path);
    assert!(contents.contains("into the file"));
}

#[test]
fn bad_log_file_reports_io_error() {
    let settings = LoggerSettings::new()
        .with_log_to_console(false)
        .with_log_file(Some(std::env::temp_dir().join("brisk_missing_dir").join("nested").join("log.txt")));
    match Logger::with_settings(&settings) {
        Err(LoggerError::Io(_)) => {},
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("creating a file in a missing directory should fail"),
    }
}

#[test]
fn dynarr_info_output() {
    let (logger, buffer) = quiet_logger();
    let mut arr: DynArr<u32> = DynArr::with_capacity(8);
    arr.extend_from_slice(&[1, 2, 3]);
    log_dynarr_info(&logger, TEST_CAT, "numbers", &arr);
    logger.flush();

    let out = buffer.contents();
    assert!(out.contains("Name: numbers"));
    assert!(out.contains("Size: 3, Size (in bytes): 12"));
    assert!(out.contains("Capacity: 8, Capacity (in bytes): 32"));
    assert!(out.contains(&format!("{:p}", &arr[0])));
    assert!(out.contains(&format!("{:p}", &arr[2])));
}

#[test]
fn dynarr_contents_output() {
    let (logger, buffer) = quiet_logger();
    let arr = dynarr!["a", "b", "c"];
    log_dynarr_contents(&logger, TEST_CAT, "letters", &arr);

    let empty: DynArr<i32> = DynArr::new_unallocated();
    log_dynarr_contents(&logger, TEST_CAT, "nothing", &empty);
    logger.flush();

    let out = buffer.contents();
    assert!(out.contains("Elements: a b c"));
    assert!(out.contains("Memory range: (empty)"));
}

#[test]
fn logger_is_shared_between_threads() {
    let (logger, buffer) = quiet_logger();
    std::thread::scope(|scope| {
        for idx in 0..4 {
            let logger = &logger;
            scope.spawn(move || log_info!(logger, TEST_CAT, "thread {idx}"));
        }
    });
    logger.flush();

    let out = buffer.contents();
    for idx in 0..4 {
        assert!(out.contains(&format!("thread {idx}")));
    }
}
