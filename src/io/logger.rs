//! Minimal stderr backend for the `log` facade
//!
//! Lines are written as `[LEVEL] target: message`. Write failures are ignored
//! so that logging never fails the operation being logged.

use std::io::Write;

use log::{LevelFilter, Log, Metadata, Record};

/// Logger writing level-tagged lines to stderr
#[derive(Debug)]
pub struct StderrLogger {
    level: LevelFilter,
}

impl StderrLogger {
    /// Logger accepting records up to `level`
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "{}", format_record(record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Render a record as `[LEVEL] target: message`
pub fn format_record(record: &Record<'_>) -> String {
    format!(
        "[{}] {}: {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Map `--quiet` and the `-v` count onto a level filter
///
/// Warnings are shown by default; each `-v` adds one level of detail.
pub const fn level_for(quiet: bool, verbosity: u8) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger; a second call keeps the first logger
pub fn init(level: LevelFilter) {
    let logger = Box::new(StderrLogger::new(level));
    if log::set_boxed_logger(logger).is_ok() {
        log::set_max_level(level);
    }
}
