// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Build and run configuration.
//!
//! Build-time switches are cargo features of this crate:
//!
//! | Feature        | Effect                                                        |
//! |----------------|---------------------------------------------------------------|
//! | `no-assert`    | `ensure!` and `if_asserting!` expand to nothing               |
//! | `obfuscate`    | failure messages carry no predicate, function or location     |
//! | `trace-throws` | debug builds print argument, assertion and limit failures     |
//! | `quiet`        | the diagnostic stream discards by default                     |
//!
//! Run-time settings for the runner are collected in [`Settings`].

use core::{
    cell::Cell,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::diag::Sink;

/// Maximum duration of a single unit test before it is reported as failed.
pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(2);

/// Environment variable overriding [`Settings::time_limit`], in milliseconds.
pub const TIME_LIMIT_ENV: &str = "SELFTEST_TIME_LIMIT_MS";

static TRACE_THROWS: AtomicBool =
    AtomicBool::new(cfg!(all(debug_assertions, feature = "trace-throws")));

std::thread_local! {
    static THREAD_TRACE: Cell<Option<bool>> = const { Cell::new(None) };
}

/// Whether raised errors are echoed to the diagnostic stream first.
///
/// A [`with_trace_throws`] override on this thread wins over the process
/// switch.
pub fn trace_throws() -> bool {
    THREAD_TRACE
        .with(Cell::get)
        .unwrap_or_else(|| TRACE_THROWS.load(Ordering::Relaxed))
}

/// Switches throw tracing on or off for the whole process.
pub fn set_trace_throws(enabled: bool) {
    TRACE_THROWS.store(enabled, Ordering::Relaxed);
}

/// Runs `f` with throw tracing forced on or off for this thread.
///
/// The previous override is restored when `f` returns or unwinds.
pub fn with_trace_throws<R>(enabled: bool, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<bool>);

    impl Drop for Restore {
        fn drop(&mut self) {
            THREAD_TRACE.with(|t| t.set(self.0));
        }
    }

    let _restore = Restore(THREAD_TRACE.with(|t| t.replace(Some(enabled))));
    f()
}

/// Runner settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Tests running longer than this are reported as failed.
    pub time_limit: Duration,
    /// Diagnostic stream for the run; `None` keeps the current one.
    pub sink: Option<Sink>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    pub const fn new() -> Self {
        Self {
            time_limit: DEFAULT_TIME_LIMIT,
            sink: None,
        }
    }

    /// Defaults, overridden by [`TIME_LIMIT_ENV`] when it holds a valid value.
    pub fn from_env() -> Self {
        let mut settings = Self::new();
        if let Ok(raw) = std::env::var(TIME_LIMIT_ENV) {
            match parse_time_limit(&raw) {
                Some(limit) => settings.time_limit = limit,
                None => warn!("ignoring {TIME_LIMIT_ENV}={raw:?}: expected milliseconds"),
            }
        }
        settings
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = limit;
        self
    }

    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.sink = Some(sink);
        self
    }
}

/// Parses a positive millisecond count.
pub fn parse_time_limit(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}
