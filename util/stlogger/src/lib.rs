// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! `log` backend for test programs.
//!
//! Records go to stderr as `[<time> <target>:<line>] <message>`, coloured by
//! level unless the `color` feature is off.

use core::{fmt, str::FromStr};
use std::io::Write;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
pub use log::{debug, error, info, trace, warn};

/// Environment variable read by [`init_from_env`].
pub const LOG_ENV: &str = "SELFTEST_LOG";

/// Level used when nothing else is configured.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

#[cfg(feature = "color")]
macro_rules! color_fmt {
    ($color_code:expr, $($arg:tt)*) => {
        format_args!("\u{1B}[{}m{}\u{1B}[m", $color_code as u8, format_args!($($arg)*))
    };
}

#[repr(u8)]
#[allow(dead_code)]
#[derive(Clone, Copy)]
enum AnsiColor {
    Red = 31,
    Green = 32,
    Yellow = 33,
    Cyan = 36,
    White = 37,
    BrightBlack = 90,
}

impl AnsiColor {
    fn of(level: Level) -> Self {
        match level {
            Level::Error => AnsiColor::Red,
            Level::Warn => AnsiColor::Yellow,
            Level::Info => AnsiColor::Green,
            Level::Debug => AnsiColor::Cyan,
            Level::Trace => AnsiColor::BrightBlack,
        }
    }
}

struct TestLogger;

static LOGGER: TestLogger = TestLogger;

impl Log for TestLogger {
    #[inline]
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f");
        let line = render(
            record.level(),
            record.target(),
            record.line().unwrap_or(0),
            &time,
            record.args(),
        );
        let _ = print_line(&line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn render(
    level: Level,
    path: &str,
    line: u32,
    time: &dyn fmt::Display,
    args: &fmt::Arguments<'_>,
) -> String {
    let color = AnsiColor::of(level);
    cfg_if::cfg_if! {
        if #[cfg(feature = "color")] {
            format!(
                "{}",
                color_fmt!(
                    AnsiColor::White,
                    "[{time} {path}:{line}] {args}",
                    args = color_fmt!(color, "{}", args),
                )
            )
        } else {
            let _ = color;
            format!("[{time} {path}:{line}] {args}")
        }
    }
}

/// Writes one line to stderr, serialized with other log output.
pub fn print_line(line: &str) -> std::io::Result<()> {
    static LOCK: spin::Mutex<()> = spin::Mutex::new(());

    let _guard = LOCK.lock();
    let mut stderr = std::io::stderr().lock();
    writeln!(stderr, "{line}")
}

/// Installs the logger at [`DEFAULT_LEVEL`].
pub fn init_logger() -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(DEFAULT_LEVEL);
    Ok(())
}

/// Installs the logger at the level named by `SELFTEST_LOG`.
///
/// A logger installed earlier is kept; only the level changes.
pub fn init_from_env() {
    let _ = init_logger();
    if let Ok(level) = std::env::var(LOG_ENV) {
        set_log_level(&level);
    }
}

/// Parses a level name, case-insensitively.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(level.trim()).ok()
}

/// Sets the maximum level. Unknown names turn logging off.
pub fn set_log_level(level: &str) {
    log::set_max_level(parse_level(level).unwrap_or(LevelFilter::Off));
}
