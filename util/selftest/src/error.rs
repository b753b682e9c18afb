// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Failure categories and the error values raised for them.
//!
//! Every failure reported through this crate belongs to one
//! [`FailureKind`]. Four of them reach application code as an [`Error`];
//! the fifth, [`FailureKind::UnitTestFailure`], only ever travels from a
//! check to the runner.

use core::fmt;

/// Category of a signalled failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A caller supplied an invalid argument.
    ArgumentError,
    /// An `ensure!` predicate was false.
    AssertionFailure,
    /// Internal self-test logic failed.
    SelfTestFailure,
    /// A check inside a unit test failed.
    UnitTestFailure,
    /// An operation went past a reasonable limit.
    LimitExceeded,
}

impl FailureKind {
    /// All kinds, in declaration order.
    pub const ALL: [FailureKind; 5] = [
        FailureKind::ArgumentError,
        FailureKind::AssertionFailure,
        FailureKind::SelfTestFailure,
        FailureKind::UnitTestFailure,
        FailureKind::LimitExceeded,
    ];

    /// Label used in composed diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            FailureKind::ArgumentError => "Argument test",
            FailureKind::AssertionFailure => "Assertion",
            FailureKind::SelfTestFailure => "Self test",
            FailureKind::UnitTestFailure => "Unit test",
            FailureKind::LimitExceeded => "Reasonable limit",
        }
    }

    /// The application-visible kind, or `None` for unit-test failures.
    pub const fn error_kind(self) -> Option<ErrorKind> {
        match self {
            FailureKind::ArgumentError => Some(ErrorKind::BadArgument),
            FailureKind::AssertionFailure => Some(ErrorKind::BadAssert),
            FailureKind::SelfTestFailure => Some(ErrorKind::BadSelfTest),
            FailureKind::UnitTestFailure => None,
            FailureKind::LimitExceeded => Some(ErrorKind::OverLimit),
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The failure kinds application code may raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadArgument,
    BadAssert,
    BadSelfTest,
    OverLimit,
}

impl ErrorKind {
    /// Whether a raise of this kind is echoed when throw tracing is on.
    pub const fn traced(self) -> bool {
        !matches!(self, ErrorKind::BadSelfTest)
    }
}

impl From<ErrorKind> for FailureKind {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::BadArgument => FailureKind::ArgumentError,
            ErrorKind::BadAssert => FailureKind::AssertionFailure,
            ErrorKind::BadSelfTest => FailureKind::SelfTestFailure,
            ErrorKind::OverLimit => FailureKind::LimitExceeded,
        }
    }
}

/// A raised failure. The payload is the composed diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Raised for [`ErrorKind::BadArgument`].
    #[error("{0}")]
    InvalidArgument(String),
    /// Raised for [`ErrorKind::BadAssert`] and [`ErrorKind::BadSelfTest`].
    #[error("{0}")]
    SelfTest(String),
    /// Raised for [`ErrorKind::OverLimit`].
    #[error("{0}")]
    OverLimit(String),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::BadArgument => Error::InvalidArgument(message),
            ErrorKind::BadAssert | ErrorKind::BadSelfTest => Error::SelfTest(message),
            ErrorKind::OverLimit => Error::OverLimit(message),
        }
    }

    /// The composed diagnostic message.
    pub fn message(&self) -> &str {
        match self {
            Error::InvalidArgument(m) | Error::SelfTest(m) | Error::OverLimit(m) => m,
        }
    }

    /// Whether this is an internal logic error (assertion or self-test).
    pub const fn is_logic_error(&self) -> bool {
        matches!(self, Error::SelfTest(_))
    }
}

/// Result type for operations that raise [`Error`].
pub type Result<T = ()> = core::result::Result<T, Error>;
