// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Self-testing support for embedding in other crates.
//!
//! Three related facilities live here:
//!
//! - Structured failures: [`ensure!`], [`bad_arg!`], [`test_fail!`] and
//!   [`over_limit!`] compose a located diagnostic and return a typed
//!   [`Error`] from the enclosing function.
//! - Self-registering unit tests: [`def_test`] defines a test body and links
//!   it into [`UNIT_TESTS`]. Inside a body, [`check!`], [`check_str_eq!`] and
//!   [`check_throws!`] stop the test at the first failed check.
//! - A contained runner: [`run_unit_tests`] executes every registered test in
//!   declaration order. A failing, erroring or panicking test is counted and
//!   reported, and the run moves on.
//!
//! ```ignore
//! use selftest::{check, check_throws, def_test, Error};
//!
//! #[def_test]
//! fn parses_port() {
//!     check!(parse_port("80")? == 80);
//!     check_throws!(parse_port("0"), Error::InvalidArgument(_));
//! }
//!
//! fn main() {
//!     let result = selftest::run_unit_tests();
//!     std::process::exit(if result.all_passed() { 0 } else { 1 });
//! }
//! ```
//!
//! Containment relies on unwinding; binaries built with `panic = "abort"`
//! lose the run at the first panicking test.

#[macro_use]
extern crate log;

#[cfg(test)]
extern crate self as selftest;

pub mod config;
pub mod context;
pub mod diag;
pub mod error;
pub mod failure;
mod macros;
pub mod registry;
pub mod runner;
pub mod signal;

pub use config::Settings;
pub use context::DiagnosticContext;
pub use diag::{Capture, Sink};
pub use error::{Error, ErrorKind, FailureKind, Result};
pub use failure::{TestFailure, TestResult};
pub use registry::{Registry, TestCase, UNIT_TESTS};
pub use runner::{
    FailReason, RunReport, RunResult, Runner, TestOutcome, TestReport, run_unit_tests,
    run_unit_tests_ok,
};
pub use selftest_macros::def_test;

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{Registry, Runner, Settings, Sink, check, def_test};

    #[def_test]
    fn registered_from_inside_the_crate() {
        check!(1 + 1 == 2);
    }

    #[test]
    fn global_registry_holds_linked_tests() {
        let capture = crate::Capture::new();
        let runner = Runner::new(Settings::new().with_sink(Sink::Capture(capture.clone())));
        let report = runner.run(Registry::global());

        let names: Vec<_> = report.tests.iter().map(|t| t.name).collect();
        assert_eq!(names, ["registered_from_inside_the_crate"]);
        assert!(report.result().all_passed());
        assert!(Registry::global().is_empty());

        // Drained: a second run finds nothing and nothing fails.
        assert!(crate::run_unit_tests_ok());
        assert!(capture.is_empty());
    }
}
