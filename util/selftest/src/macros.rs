// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Call-site macros.
//!
//! The build switches are resolved here, where the macros are defined, so
//! that the features of this crate decide the expansion in every caller.
//!
//! Application macros ([`ensure!`], [`bad_arg!`], [`test_fail!`],
//! [`over_limit!`]) return `Err` from the enclosing function; its error type
//! must implement `From<selftest::Error>`. Check macros ([`check!`],
//! [`check_str_eq!`], [`check_throws!`]) belong in unit test bodies and
//! stop the test at the first failure.

/// Bare name of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __here() {}
        $crate::context::enclosing_function(::core::any::type_name_of_val(&__here))
    }};
}

#[cfg(not(feature = "obfuscate"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __context {
    ($text:expr) => {
        $crate::DiagnosticContext::located(
            $text,
            $crate::function_name!(),
            ::core::file!(),
            ::core::line!(),
        )
    };
}

#[cfg(feature = "obfuscate")]
#[doc(hidden)]
#[macro_export]
macro_rules! __context {
    ($text:expr) => {
        $crate::DiagnosticContext::EMPTY
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __raise {
    ($kind:ident, $text:expr) => {
        return ::core::result::Result::Err(::core::convert::From::from(
            $crate::signal::raise($crate::ErrorKind::$kind, &$crate::__context!($text)),
        ))
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __fail_unit_test {
    ($text:expr) => {
        return ::core::result::Result::Err($crate::TestFailure::terminated(
            $crate::signal::terminate(&$crate::__context!($text)),
        ))
    };
}

/// Returns an assertion failure if `pred` is false.
///
/// Compiled out, predicate included, with the `no-assert` feature.
#[cfg(not(feature = "no-assert"))]
#[macro_export]
macro_rules! ensure {
    ($pred:expr $(,)?) => {
        if !($pred) {
            $crate::__raise!(BadAssert, ::core::stringify!($pred));
        }
    };
}

#[cfg(feature = "no-assert")]
#[macro_export]
macro_rules! ensure {
    ($($tokens:tt)*) => {};
}

/// Keeps the enclosed statements only in builds with assertions.
#[cfg(not(feature = "no-assert"))]
#[macro_export]
macro_rules! if_asserting {
    ($($body:tt)*) => {
        { $($body)* }
    };
}

#[cfg(feature = "no-assert")]
#[macro_export]
macro_rules! if_asserting {
    ($($body:tt)*) => {};
}

/// Returns [`Error::InvalidArgument`](crate::Error::InvalidArgument).
#[macro_export]
macro_rules! bad_arg {
    ($msg:expr $(,)?) => {
        $crate::__raise!(BadArgument, ::core::convert::AsRef::<str>::as_ref(&$msg))
    };
}

/// Returns [`Error::SelfTest`](crate::Error::SelfTest).
#[macro_export]
macro_rules! test_fail {
    ($msg:expr $(,)?) => {
        $crate::__raise!(BadSelfTest, ::core::convert::AsRef::<str>::as_ref(&$msg))
    };
}

/// Returns [`Error::OverLimit`](crate::Error::OverLimit).
#[macro_export]
macro_rules! over_limit {
    ($msg:expr $(,)?) => {
        $crate::__raise!(OverLimit, ::core::convert::AsRef::<str>::as_ref(&$msg))
    };
}

/// Fails the current unit test if `pred` is false.
#[macro_export]
macro_rules! check {
    ($pred:expr $(,)?) => {
        if !($pred) {
            $crate::__fail_unit_test!(::core::stringify!($pred));
        }
    };
}

/// Fails the current unit test unless both sides render to the same string.
#[macro_export]
macro_rules! check_str_eq {
    ($left:expr, $right:expr $(,)?) => {
        match (
            ::std::string::ToString::to_string(&$left),
            ::std::string::ToString::to_string(&$right),
        ) {
            (left, right) => {
                if left != right {
                    $crate::__fail_unit_test!(&$crate::signal::str_mismatch(
                        ::core::stringify!($left),
                        ::core::stringify!($right),
                        &left,
                        &right,
                    ));
                }
            }
        }
    };
}

/// Fails the current unit test unless `expr` is an `Err` matching `pat`.
///
/// ```ignore
/// check_throws!(parse_port("0"), Error::InvalidArgument(_));
/// ```
#[macro_export]
macro_rules! check_throws {
    ($expr:expr, $pat:pat $(,)?) => {
        if !::core::matches!($expr, ::core::result::Result::Err($pat)) {
            $crate::__fail_unit_test!(::core::concat!(
                ::core::stringify!($expr),
                " should throw ",
                ::core::stringify!($pat)
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{
        Error, TestResult, config,
        diag::{self, Capture, Sink},
    };

    fn fizzbuzz(index: i32) -> crate::Result<String> {
        if index <= 0 {
            bad_arg!("Can't Fizz or Buzz with less than nothing!");
        }
        if_asserting! {
            if index > 1000 {
                over_limit!(format!("Too much Fizz: {index}"));
            }
        }

        let res = match (index % 3 == 0, index % 5 == 0) {
            (true, true) => "Fizz Buzz".to_owned(),
            (true, false) => "Fizz".to_owned(),
            (false, true) => "Buzz".to_owned(),
            (false, false) => index.to_string(),
        };
        ensure!(!res.is_empty());
        Ok(res)
    }

    fn always_asserts() -> crate::Result {
        ensure!(1 + 1 == 3);
        Ok(())
    }

    fn self_test_fails() -> crate::Result {
        test_fail!("TEST_FAIL");
    }

    fn captured(body: fn() -> TestResult) -> (TestResult, Vec<String>) {
        let capture = Capture::new();
        let result = config::with_trace_throws(false, || {
            diag::with_sink(Sink::Capture(capture.clone()), body)
        });
        (result, capture.lines())
    }

    #[test]
    fn application_macros_raise_typed_errors() {
        assert!(matches!(fizzbuzz(-3), Err(Error::InvalidArgument(_))));
        assert!(matches!(self_test_fails(), Err(Error::SelfTest(_))));
        assert_eq!(fizzbuzz(90).ok().as_deref(), Some("Fizz Buzz"));
    }

    #[cfg(not(feature = "no-assert"))]
    #[test]
    fn assertions_raise_logic_errors() {
        let err = always_asserts().unwrap_err();
        assert!(err.is_logic_error());
        assert!(matches!(fizzbuzz(43000), Err(Error::OverLimit(_))));
    }

    #[cfg(feature = "no-assert")]
    #[test]
    fn assertions_compile_out() {
        assert!(always_asserts().is_ok());
        assert!(fizzbuzz(43000).is_ok());
    }

    #[cfg(not(feature = "obfuscate"))]
    #[test]
    fn verbose_messages_carry_the_call_site() {
        let err = fizzbuzz(0).unwrap_err();
        let message = err.message();
        assert!(message.contains(file!()), "{message}");
        assert!(message.ends_with(
            ":0: error: Argument test 'Can't Fizz or Buzz with less than nothing!' failed in fizzbuzz."
        ));
    }

    #[cfg(feature = "obfuscate")]
    #[test]
    fn reduced_messages_carry_nothing() {
        assert_eq!(fizzbuzz(0).unwrap_err().message(), "Argument test failed.");
        assert_eq!(self_test_fails().unwrap_err().message(), "Self test failed.");
    }

    #[test]
    fn passing_checks_fall_through() {
        fn body() -> TestResult {
            check!(fizzbuzz(3)? == "Fizz");
            check_str_eq!("2", fizzbuzz(2)?);
            check_throws!(fizzbuzz(-1), Error::InvalidArgument(_));
            check_throws!(self_test_fails(), Error::SelfTest(_) | Error::OverLimit(_));
            Ok(())
        }
        let (result, lines) = captured(body);
        assert!(result.is_ok());
        assert!(lines.is_empty());
    }

    #[test]
    fn failing_check_terminates() {
        fn body() -> TestResult {
            check!(fizzbuzz(4)? == "Fizz");
            Ok(())
        }
        let (result, lines) = captured(body);
        assert!(result.unwrap_err().is_terminated());
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Unit test"));
    }

    #[test]
    fn string_mismatch_names_both_sides() {
        fn body() -> TestResult {
            check_str_eq!("99", fizzbuzz(99)?);
            Ok(())
        }
        let (result, lines) = captured(body);
        assert!(result.unwrap_err().is_terminated());
        if cfg!(not(feature = "obfuscate")) {
            assert!(lines[0].contains("'\"99\" == fizzbuzz(99)? (\"99\" != \"Fizz\")'"));
        }
    }

    #[test]
    fn throws_check_rejects_success() {
        fn body() -> TestResult {
            check_throws!(fizzbuzz(5), Error::InvalidArgument(_));
            Ok(())
        }
        let (result, lines) = captured(body);
        assert!(result.unwrap_err().is_terminated());
        if cfg!(not(feature = "obfuscate")) {
            assert!(lines[0].contains("'fizzbuzz(5) should throw Error::InvalidArgument(_)'"));
        }
    }

    #[test]
    fn throws_check_rejects_other_kinds() {
        fn body() -> TestResult {
            check_throws!(fizzbuzz(-5), Error::OverLimit(_));
            Ok(())
        }
        let (result, _) = captured(body);
        assert!(result.unwrap_err().is_terminated());
    }
}
