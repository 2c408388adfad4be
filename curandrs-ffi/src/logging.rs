//! Verbosity control and the stderr logger.

use std::io::Write;

use libc::c_int;
use log::{Level, LevelFilter, Metadata, Record};

/// Host-facing verbosity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Quiet = 0,
    Error = 1,
    Warning = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
    DebugTrace = 6,
}

impl LogLevel {
    /// Out-of-range values clamp to the nearest level.
    pub fn from_raw(level: c_int) -> Self {
        match level {
            i32::MIN..=0 => LogLevel::Quiet,
            1 => LogLevel::Error,
            2 => LogLevel::Warning,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::DebugTrace,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace | LogLevel::DebugTrace => LevelFilter::Trace,
        }
    }
}

/// Writes every record to stderr as `LEVEL [curandrs] message`.
pub struct BindingLogger;

pub static BINDING_LOGGER: BindingLogger = BindingLogger;

impl log::Log for BindingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_record(record.level(), &record.args().to_string());
        // A closed stderr must not take the host down.
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_record(level: Level, message: &str) -> String {
    let mut line = format!("{:<5} [curandrs] {}", level, message.trim_end());
    line.push('\n');
    line
}

/// Install [`BINDING_LOGGER`] unless the process already has a logger.
pub fn install() -> bool {
    log::set_logger(&BINDING_LOGGER).is_ok()
}

pub fn apply(level: LogLevel) {
    log::set_max_level(level.filter());
}

/// Set the verbosity of every entry point.
#[no_mangle]
pub extern "C" fn curandrs_set_log_level(level: c_int) {
    apply(LogLevel::from_raw(level));
}
