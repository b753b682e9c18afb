// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Test runner.
//!
//! [`run_unit_tests`] drains the global registry and runs every test in
//! declaration order, one at a time on the calling thread. Each body runs
//! inside its own containment boundary: failed checks, returned errors and
//! panics of any payload type are reported and counted, and the run goes on
//! with the next test.

use core::{cell::Cell, time::Duration};
use std::{
    any::Any,
    error::Error as StdError,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};

use spin::Once;

use crate::{
    config::Settings,
    diag,
    error::Error,
    failure::TestFailure,
    registry::{Registry, TestCase},
};

/// Failure count of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunResult {
    pub failed: usize,
    pub total: usize,
}

impl RunResult {
    pub const fn passed(&self) -> usize {
        self.total.saturating_sub(self.failed)
    }

    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Why a test was marked failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    /// A check failed; the signaler reported it.
    Check,
    /// The body completed but took longer than the time limit.
    TooSlow(Duration),
    /// The body returned or panicked with an error value.
    Error(String),
    /// The body panicked with a text payload.
    Panic(String),
    /// The body panicked with a payload that has no message.
    UnknownPanic,
}

/// Outcome of a single test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed(FailReason),
}

impl TestOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, TestOutcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TestOutcome::Failed(_))
    }
}

/// Record of one executed test.
#[derive(Debug, Clone)]
pub struct TestReport {
    pub name: &'static str,
    pub outcome: TestOutcome,
    pub duration: Duration,
}

/// Every test of a run, in execution order.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub tests: Vec<TestReport>,
}

impl RunReport {
    pub fn result(&self) -> RunResult {
        RunResult {
            failed: self.tests.iter().filter(|t| t.outcome.is_failed()).count(),
            total: self.tests.len(),
        }
    }

    pub fn outcome_of(&self, name: &str) -> Option<&TestOutcome> {
        self.tests.iter().find(|t| t.name == name).map(|t| &t.outcome)
    }
}

/// Runs registered tests with the given settings.
#[derive(Debug, Clone, Default)]
pub struct Runner {
    settings: Settings,
}

impl Runner {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Drains `registry` and runs everything it held.
    pub fn run(&self, registry: &Registry) -> RunReport {
        self.run_cases(registry.drain())
    }

    /// Runs `cases` in order.
    pub fn run_cases(&self, cases: Vec<TestCase>) -> RunReport {
        let run = || {
            if cases.is_empty() {
                warn!("No unit tests registered");
                return RunReport::default();
            }

            let tests = cases
                .iter()
                .map(|case| {
                    let start = Instant::now();
                    let outcome = self.call_unit_test(case);
                    TestReport {
                        name: case.name,
                        outcome,
                        duration: start.elapsed(),
                    }
                })
                .collect();
            let report = RunReport { tests };
            let result = report.result();
            info!("{}/{} unit tests failed", result.failed, result.total);
            report
        };

        match self.settings.sink.clone() {
            Some(sink) => diag::with_sink(sink, run),
            None => run(),
        }
    }

    /// Runs one test inside its containment boundary.
    pub fn call_unit_test(&self, case: &TestCase) -> TestOutcome {
        install_panic_hook();
        debug!("running unit test {} ({}:{})", case.name, case.file, case.line);

        let start = Instant::now();
        let caught = {
            let _contained = Contained::enter();
            panic::catch_unwind(AssertUnwindSafe(case.func))
        };
        let elapsed = start.elapsed();

        let reason = match caught {
            Ok(Ok(())) if elapsed > self.settings.time_limit => {
                diag::emit(&format!(
                    "Unit test {} not complete within {}.",
                    case.name,
                    describe_limit(self.settings.time_limit)
                ));
                FailReason::TooSlow(elapsed)
            }
            Ok(Ok(())) => return TestOutcome::Passed,
            Ok(Err(failure)) => failure_reason(case.name, &failure),
            Err(payload) => panic_reason(case.name, payload),
        };
        TestOutcome::Failed(reason)
    }
}

fn failure_reason(name: &str, failure: &TestFailure) -> FailReason {
    match failure.message() {
        // Already reported by the signaler.
        None => FailReason::Check,
        Some(message) => {
            report_exception(name, &message);
            FailReason::Error(message)
        }
    }
}

fn panic_reason(name: &str, payload: Box<dyn Any + Send>) -> FailReason {
    if let Some(err) = payload.downcast_ref::<Error>() {
        let message = err.to_string();
        report_exception(name, &message);
        return FailReason::Error(message);
    }
    if let Some(err) = payload.downcast_ref::<Box<dyn StdError + Send + Sync>>() {
        let message = err.to_string();
        report_exception(name, &message);
        return FailReason::Error(message);
    }

    let text = payload
        .downcast_ref::<&'static str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned());
    match text {
        Some(text) => {
            diag::emit(&format!(
                "Exception thrown during unit test '{name}': \"{text}\"."
            ));
            FailReason::Panic(text)
        }
        None => {
            diag::emit(&format!(
                "Exception of unknown type thrown during unit test '{name}'."
            ));
            FailReason::UnknownPanic
        }
    }
}

fn report_exception(name: &str, message: &str) {
    diag::emit(&format!(
        "Exception thrown during unit test '{name}': {message}."
    ));
}

fn describe_limit(limit: Duration) -> String {
    if limit.subsec_nanos() == 0 {
        let secs = limit.as_secs();
        format!("{secs} second{}", if secs == 1 { "" } else { "s" })
    } else if limit.as_millis() == 0 {
        format!("{limit:?}")
    } else {
        format!("{} milliseconds", limit.as_millis())
    }
}

std::thread_local! {
    static CONTAINED: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as running a contained test body.
struct Contained {
    outer: bool,
}

impl Contained {
    fn enter() -> Self {
        Self {
            outer: CONTAINED.with(|c| c.replace(true)),
        }
    }
}

impl Drop for Contained {
    fn drop(&mut self) {
        CONTAINED.with(|c| c.set(self.outer));
    }
}

/// Keeps panics of contained test bodies off the default panic output.
///
/// Panics elsewhere go to whatever hook was installed before.
fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if CONTAINED.with(Cell::get) {
                if let Some(location) = info.location() {
                    debug!("unit test panicked at {location}");
                }
            } else {
                previous(info);
            }
        }));
    });
}

/// Runs every test in the global registry.
///
/// The registry is consumed: a second call in the same process finds
/// nothing to run.
pub fn run_unit_tests() -> RunResult {
    Runner::new(Settings::from_env())
        .run(Registry::global())
        .result()
}

/// Runs every registered test and returns whether all of them passed.
pub fn run_unit_tests_ok() -> bool {
    run_unit_tests().all_passed()
}
