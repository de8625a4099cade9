use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Local;
use colored::Colorize;
use hal::{ButtonInput, HalResult, LedColor, LedOutput};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Replays press durations as sampled button levels.
pub struct ScriptedButton {
    levels: VecDeque<bool>,
    remaining: Arc<AtomicUsize>,
}

impl ScriptedButton {
    /// Each entry of `presses` is a hold time in samples, followed by one
    /// released sample and `gap` idle samples.
    pub fn new(presses: &[usize], gap: usize) -> Self {
        let mut levels = VecDeque::new();
        for &held in presses {
            levels.extend(std::iter::repeat(true).take(held));
            levels.extend(std::iter::repeat(false).take(gap + 1));
        }
        let remaining = Arc::new(AtomicUsize::new(levels.len()));
        Self { levels, remaining }
    }

    /// Samples not yet read.
    pub fn remaining(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.remaining)
    }
}

impl ButtonInput for ScriptedButton {
    fn read_pressed(&mut self) -> bool {
        let level = self.levels.pop_front();
        self.remaining.store(self.levels.len(), Ordering::Release);
        level.unwrap_or(false)
    }
}

/// Prints LED transitions to stdout.
pub struct ConsoleLeds;

impl LedOutput for ConsoleLeds {
    fn set(&mut self, color: LedColor, asserted: bool) -> HalResult<()> {
        let name = match color {
            LedColor::Red => color.name().red(),
            LedColor::Green => color.name().green(),
            LedColor::Blue => color.name().blue(),
        };
        let state = if asserted { "ON ".bold() } else { "off".dimmed() };
        println!("{} {name:>5} {state}", timestamp().dimmed());
        Ok(())
    }
}

pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    pub fn install(level: LevelFilter) -> Result<(), log::SetLoggerError> {
        let logger: &'static ConsoleLogger = Box::leak(Box::new(ConsoleLogger { level }));
        log::set_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow(),
            Level::Info => "INFO ".green(),
            Level::Debug => "DEBUG".cyan(),
            Level::Trace => "TRACE".normal(),
        };
        eprintln!("{} {level} {}", timestamp().dimmed(), record.args());
    }

    fn flush(&self) {}
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S%.3f").to_string()
}
