// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Diagnostic stream.
//!
//! Failure messages are written here as whole lines. The stream is active
//! (standard error) unless the `quiet` feature makes it inert by default;
//! either can be overridden process-wide with [`set_default_sink`] or for the
//! current thread with [`with_sink`].

use core::cell::RefCell;
use std::{io::Write, sync::Arc};

use spin::{Mutex, RwLock};

/// Destination of diagnostic lines.
#[derive(Debug, Clone)]
pub enum Sink {
    /// Forward to standard error.
    Stderr,
    /// Drop every line.
    Discard,
    /// Keep lines in memory.
    Capture(Capture),
}

cfg_if::cfg_if! {
    if #[cfg(feature = "quiet")] {
        const BUILD_DEFAULT: Sink = Sink::Discard;
    } else {
        const BUILD_DEFAULT: Sink = Sink::Stderr;
    }
}

impl Default for Sink {
    fn default() -> Self {
        BUILD_DEFAULT
    }
}

impl Sink {
    fn write_line(&self, line: &str) {
        match self {
            Sink::Stderr => {
                let mut err = std::io::stderr().lock();
                let _ = writeln!(err, "{line}");
            }
            Sink::Discard => {}
            Sink::Capture(capture) => capture.push(line),
        }
    }
}

/// Shared in-memory line buffer.
#[derive(Debug, Clone, Default)]
pub struct Capture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }

    /// Snapshot of every captured line.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Whether any captured line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|l| l.contains(needle))
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

static DEFAULT_SINK: RwLock<Option<Sink>> = RwLock::new(None);

std::thread_local! {
    static THREAD_SINK: RefCell<Option<Sink>> = const { RefCell::new(None) };
}

/// Replaces the process-wide sink. `None` restores the build default.
pub fn set_default_sink(sink: Option<Sink>) {
    *DEFAULT_SINK.write() = sink;
}

/// The sink a line written now on this thread would go to.
pub fn current() -> Sink {
    THREAD_SINK
        .with(|s| s.borrow().clone())
        .or_else(|| DEFAULT_SINK.read().clone())
        .unwrap_or_default()
}

/// Writes one line to the current sink.
pub fn emit(line: &str) {
    current().write_line(line);
}

/// Runs `f` with `sink` as this thread's diagnostic stream.
///
/// The previous override is restored when `f` returns or unwinds.
pub fn with_sink<R>(sink: Sink, f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Sink>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            THREAD_SINK.with(|s| *s.borrow_mut() = previous);
        }
    }

    let previous = THREAD_SINK.with(|s| s.borrow_mut().replace(sink));
    let _restore = Restore(previous);
    f()
}
