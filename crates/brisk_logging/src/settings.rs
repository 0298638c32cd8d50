use std::path::{Path, PathBuf};

use crate::LogLevel;

/// Logger settings
#[derive(Clone, Debug)]
pub struct LoggerSettings {
    pub(crate) max_level      : LogLevel,
    pub(crate) always_flush   : bool,
    pub(crate) log_to_console : bool,
    pub(crate) keep_history   : bool,
    pub(crate) log_file       : Option<PathBuf>,
}

impl LoggerSettings {
    /// Create the default settings: log everything to the console only, without history.
    pub fn new() -> Self {
        Self {
            max_level: LogLevel::Debug,
            always_flush: false,
            log_to_console: true,
            keep_history: false,
            log_file: None,
        }
    }

    /// Set the maximum level that will be logged
    pub fn with_max_level(mut self, level: LogLevel) -> Self {
        self.max_level = level;
        self
    }

    /// Set whether every message is flushed immediately
    pub fn with_always_flush(mut self, always_flush: bool) -> Self {
        self.always_flush = always_flush;
        self
    }

    /// Set whether messages are written to the console
    pub fn with_log_to_console(mut self, log_to_console: bool) -> Self {
        self.log_to_console = log_to_console;
        self
    }

    /// Set whether the logger keeps a copy of every message
    pub fn with_keep_history(mut self, keep_history: bool) -> Self {
        self.keep_history = keep_history;
        self
    }

    /// Set the file messages are written to, in addition to the console.
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }

    pub fn max_level(&self) -> LogLevel {
        self.max_level
    }

    pub fn always_flush(&self) -> bool {
        self.always_flush
    }

    pub fn log_to_console(&self) -> bool {
        self.log_to_console
    }

    pub fn keep_history(&self) -> bool {
        self.keep_history
    }

    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self::new()
    }
}
