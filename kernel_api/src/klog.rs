use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::println;

pub struct KernelLogger;

impl Log for KernelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tag = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        println!("[{}] {}: {}", tag, record.target(), record.args());
    }

    fn flush(&self) {}
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    static LOGGER: KernelLogger = KernelLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
