// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Condition signaler.
//!
//! Composes the diagnostic for a failure and produces the value that carries
//! it out of the failing function. Messages have the form
//!
//! ```text
//! <file>:<line>:0: error: <label> '<predicate>' failed in <function>.
//! ```
//!
//! with each part left out when the context does not carry it.
//!
//! To stop in a debugger at every failure before it propagates, break on
//! `selftest::signal::compose`.

use core::fmt::Write;

use crate::{
    config, diag,
    context::DiagnosticContext,
    error::{Error, ErrorKind, FailureKind},
};

/// Signal that stops the current unit test.
///
/// Only [`terminate`] creates one. It has no payload: the message has been
/// written to the diagnostic stream already.
#[derive(Debug)]
pub struct Terminate {
    _private: (),
}

/// What [`thrower`] produced.
#[derive(Debug)]
pub enum Raised {
    Error(Error),
    Terminate(Terminate),
}

/// Builds the diagnostic message for a failure.
#[inline(never)]
pub fn compose(kind: FailureKind, ctx: &DiagnosticContext<'_>) -> String {
    let mut message = String::new();
    if let Some((file, line)) = ctx.location() {
        let _ = write!(message, "{file}:{line}:0: error: ");
    }
    message.push_str(kind.label());
    if let Some(predicate) = ctx.predicate {
        let _ = write!(message, " '{predicate}'");
    }
    message.push_str(" failed");
    if let Some(function) = ctx.function {
        let _ = write!(message, " in {function}");
    }
    message.push('.');
    message
}

/// Raises an application-visible failure.
///
/// The returned error is meant to be returned from the failing function
/// straight away. With throw tracing on, every kind except
/// [`ErrorKind::BadSelfTest`] is echoed to the diagnostic stream first.
pub fn raise(kind: ErrorKind, ctx: &DiagnosticContext<'_>) -> Error {
    raise_with(kind, ctx, config::trace_throws())
}

fn raise_with(kind: ErrorKind, ctx: &DiagnosticContext<'_>, trace: bool) -> Error {
    let message = compose(kind.into(), ctx);
    if trace && kind.traced() {
        diag::emit(&message);
    }
    Error::new(kind, message)
}

/// Fails the current unit test.
///
/// The message is written to the diagnostic stream immediately so it is
/// visible even if the process goes down before the runner reports.
pub fn terminate(ctx: &DiagnosticContext<'_>) -> Terminate {
    let message = compose(FailureKind::UnitTestFailure, ctx);
    diag::emit(&message);
    Terminate { _private: () }
}

/// Signals a failure of any kind.
pub fn thrower(kind: FailureKind, ctx: &DiagnosticContext<'_>) -> Raised {
    match kind.error_kind() {
        Some(kind) => Raised::Error(raise(kind, ctx)),
        None => Raised::Terminate(terminate(ctx)),
    }
}

/// Predicate text for a failed string comparison.
///
/// Multi-line values get a line diff appended.
#[doc(hidden)]
pub fn str_mismatch(left_expr: &str, right_expr: &str, left: &str, right: &str) -> String {
    let mut text = format!("{left_expr} == {right_expr} (\"{left}\" != \"{right}\")");
    if left.contains('\n') || right.contains('\n') {
        let _ = write!(text, "\n{}", pretty_assertions::StrComparison::new(left, right));
    }
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::diag::{Capture, Sink};

    fn captured<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        let capture = Capture::new();
        let out = diag::with_sink(Sink::Capture(capture.clone()), f);
        (out, capture.lines())
    }

    #[test]
    fn full_message() {
        let ctx = DiagnosticContext::located("x > 0", "check_x", "src/x.rs", 12);
        assert_eq!(
            compose(FailureKind::AssertionFailure, &ctx),
            "src/x.rs:12:0: error: Assertion 'x > 0' failed in check_x."
        );
    }

    #[test]
    fn missing_parts_are_left_out() {
        assert_eq!(
            compose(FailureKind::LimitExceeded, &DiagnosticContext::EMPTY),
            "Reasonable limit failed."
        );
        assert_eq!(
            compose(FailureKind::ArgumentError, &DiagnosticContext::predicate("too big")),
            "Argument test 'too big' failed."
        );
        let no_line = DiagnosticContext {
            line: Some(0),
            ..DiagnosticContext::located("p", "f", "a.rs", 1)
        };
        assert_eq!(
            compose(FailureKind::SelfTestFailure, &no_line),
            "Self test 'p' failed in f."
        );
    }

    #[test]
    fn raise_maps_kind_to_error_type() {
        let ctx = DiagnosticContext::EMPTY;
        assert!(matches!(raise(ErrorKind::BadArgument, &ctx), Error::InvalidArgument(_)));
        assert!(matches!(raise(ErrorKind::BadAssert, &ctx), Error::SelfTest(_)));
        assert!(matches!(raise(ErrorKind::BadSelfTest, &ctx), Error::SelfTest(_)));
        assert!(matches!(raise(ErrorKind::OverLimit, &ctx), Error::OverLimit(_)));
    }

    #[test]
    fn unit_test_failure_always_reaches_the_stream() {
        let (raised, lines) = captured(|| {
            thrower(FailureKind::UnitTestFailure, &DiagnosticContext::predicate("a == b"))
        });
        assert!(matches!(raised, Raised::Terminate(_)));
        assert_eq!(lines, ["Unit test 'a == b' failed."]);
    }

    #[test]
    fn throw_tracing_echoes_all_but_self_test() {
        let ctx = DiagnosticContext::predicate("p");
        let (_, quiet) = captured(|| raise_with(ErrorKind::BadArgument, &ctx, false));
        assert!(quiet.is_empty());

        let (_, traced) = captured(|| {
            for kind in [
                ErrorKind::BadArgument,
                ErrorKind::BadAssert,
                ErrorKind::BadSelfTest,
                ErrorKind::OverLimit,
            ] {
                let _ = raise_with(kind, &ctx, true);
            }
        });
        assert_eq!(
            traced,
            [
                "Argument test 'p' failed.",
                "Assertion 'p' failed.",
                "Reasonable limit 'p' failed."
            ]
        );
    }

    #[test]
    fn string_mismatch_embeds_both_values() {
        let text = str_mismatch("\"2\"", "fizz(2)", "2", "Fizz");
        let message = compose(FailureKind::UnitTestFailure, &DiagnosticContext::predicate(&text));
        assert_eq!(
            message,
            "Unit test '\"2\" == fizz(2) (\"2\" != \"Fizz\")' failed."
        );
    }

    #[test]
    fn multi_line_mismatch_carries_a_diff() {
        let text = str_mismatch("a", "b", "one\ntwo", "one\nthree");
        assert!(text.starts_with("a == b (\"one\ntwo\" != \"one\nthree\")\n"));
        assert!(text.lines().count() > 4);
    }
}
