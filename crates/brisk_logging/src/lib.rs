//! Logging for brisk.
//!
//! A [`Logger`] is an explicit handle: create one, configure it with [`LoggerSettings`] and pass it by reference to
//! whoever needs to log. Messages are cached and written to the console and up to 8 extra writers (log files, buffers, ...).

use core::{
    fmt::{self, Arguments, Display, Write as _},
    sync::atomic::{self, AtomicU8},
};
use std::{
    error::Error,
    fs::File,
    io::{self, Write},
    panic::Location,
    path::Path,
};

use brisk_common::{collections::DynArr, time::{get_timestamp, TimeStamp}, KiB};
use parking_lot::Mutex;

mod settings;
pub use settings::*;

mod dynarr_info;
pub use dynarr_info::*;

#[doc(hidden)]
pub use brisk_base::func_name;
#[doc(hidden)]
pub use brisk_common::time;

#[cfg(test)]
mod tests;

/// Logging level
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum LogLevel {
    /// Severe error: will probably result in a crash
    Severe,
    /// Error: may not result in a crash
    Error,
    /// Warning: While not as bad as an error, it may result to something like a performance regression
    Warning,
    /// General info
    Info,
    /// Verbose info
    Verbose,
    /// Debug info (includes verbose info)
    Debug,
}

impl LogLevel {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => LogLevel::Severe,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Verbose,
            _ => LogLevel::Debug,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Severe  => f.write_str("\x1B[1m\x1B[41m\x1B[30m[SEVERE ]\x1B[0m"),
            LogLevel::Error   => f.write_str(               "\x1B[91m[ERROR  ]\x1B[0m"),
            LogLevel::Warning => f.write_str(               "\x1B[93m[WARNING]\x1B[0m"),
            LogLevel::Info    => f.write_str(               "\x1B[37m[INFO   ]\x1B[0m"),
            LogLevel::Verbose => f.write_str(               "\x1B[90m[VERBOSE]\x1B[0m"),
            LogLevel::Debug   => f.write_str(               "\x1B[94m[DEBUG  ]\x1B[0m"),
        }
    }
}

/// Log category
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LogCategory {
    category     : &'static str,
    sub_category : Option<&'static str>
}

impl LogCategory {
    pub const fn new(name: &'static str) -> Self {
        Self { category: name, sub_category: None }
    }

    pub const fn new_with_sub(name: &'static str, sub_name: &'static str) -> Self {
        Self { category: name, sub_category: Some(sub_name) }
    }
}

impl Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_category {
            Some(sub) => write!(f, "{}({sub})", self.category),
            None => f.write_str(self.category),
        }
    }
}

/// Additional info about where the log occurred
#[derive(Clone, Copy, Debug)]
pub struct LogLocation {
    file : &'static str,
    line : u32,
    func : &'static str,
    time : TimeStamp,
}

impl LogLocation {
    /// Creates a new log location
    pub const fn new(file: &'static str, line: u32, func: &'static str, time: TimeStamp) -> Self {
        Self { file, line, func, time }
    }

    /// Creates a log location pointing at the caller, stamped with the current time.
    ///
    /// The function name is not known this way and is left empty.
    #[track_caller]
    pub fn caller() -> Self {
        let loc = Location::caller();
        Self::new(loc.file(), loc.line(), "", get_timestamp())
    }

    /// Get the file name where the log occurred
    pub const fn file(&self) -> &str {
        self.file
    }

    /// Get the line where the log occurred
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Get the function where the log occurred
    pub const fn function(&self) -> &str {
        self.func
    }

    /// Get the timestamp when the log occurred
    pub const fn timestamp(&self) -> TimeStamp {
        self.time
    }
}

struct LogLocationFormatter<'a> {
    loc   : &'a LogLocation,
    level : LogLevel
}

impl<'a> LogLocationFormatter<'a> {
    fn new(loc: &'a LogLocation, level: LogLevel) -> Self {
        Self { loc, level }
    }
}

impl Display for LogLocationFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.level {
            LogLevel::Severe |
            LogLevel::Error |
            LogLevel::Debug => {
                write!(f, " ({}:{}", self.loc.file(), self.loc.line())?;
                if !self.loc.function().is_empty() {
                    write!(f, ": {}", self.loc.function())?;
                }
                f.write_str(")")
            },
            LogLevel::Warning |
            LogLevel::Info |
            LogLevel::Verbose => Ok(()),
        }
    }
}

/// Create a [`LogLocation`] for the current file, line and function.
#[macro_export]
macro_rules! log_location {
    () => {
        $crate::LogLocation::new(file!(), line!(), $crate::func_name!(), $crate::time::get_timestamp())
    };
}

/// Error returned when configuring a [`Logger`].
#[derive(Debug)]
pub enum LoggerError {
    /// A log file could not be created.
    Io(io::Error),
    /// All writer slots of the logger are in use.
    TooManyWriters,
}

impl Display for LoggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoggerError::Io(err) => write!(f, "failed to open log file: {err}"),
            LoggerError::TooManyWriters => write!(f, "the logger supports at most {} writers", LoggerState::MAX_WRITERS),
        }
    }
}

impl Error for LoggerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoggerError::Io(err) => Some(err),
            LoggerError::TooManyWriters => None,
        }
    }
}

impl From<io::Error> for LoggerError {
    fn from(err: io::Error) -> Self {
        LoggerError::Io(err)
    }
}

/// A writer the logger can output to.
pub type LogWriter = Box<dyn io::Write + Send>;

struct LoggerState {
    writers:        [Option<LogWriter>; Self::MAX_WRITERS],
    cache:          String,
    history:        Option<DynArr<String>>,
    always_flush:   bool,
    log_to_console: bool,
}

impl LoggerState {
    const MAX_WRITERS: usize = 8;
    const CACHE_FLUSH_LIMIT: usize = KiB(4);

    fn new() -> Self {
        Self {
            writers: Default::default(),
            cache: String::new(),
            history: None,
            always_flush: false,
            log_to_console: true,
        }
    }

    fn format_message(&mut self, fmt_args: Arguments<'_>) {
        if self.cache.capacity() == 0 {
            self.cache.reserve(Self::CACHE_FLUSH_LIMIT);
        }

        let start = self.cache.len();
        // Writing into a `String` only fails if a `Display` impl reports an error, the partial message is kept as is.
        _ = self.cache.write_fmt(fmt_args);

        if let Some(history) = &mut self.history {
            history.push(self.cache[start..].to_string());
        }
        self.flush_when_needed();
    }

    fn flush_when_needed(&mut self) {
        if self.always_flush || self.cache.len() > Self::CACHE_FLUSH_LIMIT {
            self.flush();
        }
    }

    fn flush(&mut self) {
        if self.cache.is_empty() {
            return;
        }

        if self.log_to_console {
            let mut stdout = io::stdout().lock();
            _ = stdout.write_all(self.cache.as_bytes());
            _ = stdout.flush();
        }

        for writer in self.writers.iter_mut().flatten() {
            _ = writer.write_all(self.cache.as_bytes());
            _ = writer.flush();
        }
        self.cache.clear();
    }
}

/// Logger
///
/// Supports up to 8 writers, e.g. terminal, file, in-memory buffer, external tool, etc
pub struct Logger {
    state: Mutex<LoggerState>,
    max_log_level: AtomicU8,
}

impl Logger {
    /// Create a logger that writes everything up to [`LogLevel::Debug`] to the console.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LoggerState::new()),
            max_log_level: AtomicU8::new(LogLevel::Debug as u8),
        }
    }

    /// Create a logger configured by `settings`.
    pub fn with_settings(settings: &LoggerSettings) -> Result<Self, LoggerError> {
        let logger = Self::new();
        logger.apply_settings(settings)?;
        Ok(logger)
    }

    /// Apply `settings` to the logger.
    ///
    /// A log file in the settings is added as an additional writer, any writer added before stays registered.
    pub fn apply_settings(&self, settings: &LoggerSettings) -> Result<(), LoggerError> {
        self.set_max_level(settings.max_level());
        self.set_always_flush(settings.always_flush());
        self.set_log_to_console(settings.log_to_console());
        self.set_keep_history(settings.keep_history());
        if let Some(path) = settings.log_file() {
            self.add_log_file(path)?;
        }
        Ok(())
    }

    /// Set the maximum log level (severe == lowest, debug == highest)
    pub fn set_max_level(&self, level: LogLevel) {
        self.max_log_level.store(level as u8, atomic::Ordering::Relaxed)
    }

    /// Get the maximum log level
    pub fn max_level(&self) -> LogLevel {
        LogLevel::from_raw(self.max_log_level.load(atomic::Ordering::Relaxed))
    }

    /// Check if a message at `level` would be logged
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level as u8 <= self.max_log_level.load(atomic::Ordering::Relaxed)
    }

    /// Set whether the logger should flush after each write
    pub fn set_always_flush(&self, always_flush: bool) {
        let mut state = self.state.lock();
        state.always_flush = always_flush;
        state.flush_when_needed();
    }

    /// Set whether the logger should log it's output to console
    pub fn set_log_to_console(&self, log_to_console: bool) {
        let mut state = self.state.lock();

        // Make sure to flush first, cause all messages before wanted/didn't want to be log to be written to console
        state.flush();
        state.log_to_console = log_to_console;
    }

    /// Set whether the logger should keep a copy of every message it logs.
    ///
    /// Disabling the history discards it.
    pub fn set_keep_history(&self, keep_history: bool) {
        let mut state = self.state.lock();
        match (keep_history, state.history.is_some()) {
            (true, false) => state.history = Some(DynArr::new()),
            (false, true) => state.history = None,
            _ => {},
        }
    }

    /// Get the number of messages in the history.
    pub fn history_len(&self) -> usize {
        self.state.lock().history.as_ref().map_or(0, |history| history.len())
    }

    /// Get a copy of the message history.
    pub fn history(&self) -> DynArr<String> {
        match &self.state.lock().history {
            Some(history) => history.clone(),
            None => DynArr::new_unallocated(),
        }
    }

    /// Write every message in the history to `writer`.
    pub fn dump_history<W: io::Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let state = self.state.lock();
        if let Some(history) = &state.history {
            for message in history {
                writer.write_all(message.as_bytes())?;
            }
        }
        writer.flush()
    }

    /// Add a writer.
    ///
    /// Returns `Ok(index)` if space was available. This index can be used to remove the writer later on.
    ///
    /// Otherwise returns an `Err` with the provided writer
    pub fn add_writer(&self, writer: LogWriter) -> Result<usize, LogWriter> {
        let mut state = self.state.lock();

        let empty = state.writers.iter_mut().enumerate().find(|(_, slot)| slot.is_none());
        match empty {
            Some((id, slot)) => {
                *slot = Some(writer);
                Ok(id)
            },
            None => Err(writer),
        }
    }

    /// Create (or truncate) the file at `path` and add it as a writer.
    pub fn add_log_file<P: AsRef<Path>>(&self, path: P) -> Result<usize, LoggerError> {
        let file = File::create(path)?;
        self.add_writer(Box::new(file)).map_err(|_| LoggerError::TooManyWriters)
    }

    /// Remove a writer from the logger
    pub fn remove_writer(&self, index: usize) -> Option<LogWriter> {
        let mut state = self.state.lock();
        // Anything still cached was meant for this writer as well.
        state.flush();
        state.writers.get_mut(index)?.take()
    }

    /// Log a message
    pub fn log(&self, category: LogCategory, level: LogLevel, loc: LogLocation, text: &str) {
        self.log_fmt(category, level, loc, format_args!("{text}"));
    }

    /// Log a formatted message
    pub fn log_fmt(&self, category: LogCategory, level: LogLevel, loc: LogLocation, format: Arguments<'_>) {
        if self.is_enabled(level) {
            let loc_formatter = LogLocationFormatter::new(&loc, level);
            let timestamp = loc.timestamp();
            self.state.lock().format_message(format_args!("\x1B[38m{timestamp}\x1B[0m {level} [{category}]{loc_formatter}: {format}\n"));
        }
    }

    /// Write all cached messages out
    pub fn flush(&self) {
        self.state.lock().flush()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Log a message at the given level: `log!(logger, category, level, "format {}", args)`.
#[macro_export]
macro_rules! log {
    ($logger:expr, $category:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_fmt($category, $level, $crate::log_location!(), format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_severe {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Severe, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Error, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warning {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Warning, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_verbose {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Verbose, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $category:expr, $($arg:tt)+) => {
        $crate::log!($logger, $category, $crate::LogLevel::Debug, $($arg)+)
    };
}
