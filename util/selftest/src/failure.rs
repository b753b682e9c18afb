// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Outcome type of unit test bodies.

use core::fmt;
use std::error::Error as StdError;

use crate::signal::{Raised, Terminate};

/// Result of a unit test body.
pub type TestResult = Result<(), TestFailure>;

/// Why a unit test body stopped early.
///
/// Either a check failed (its message is already on the diagnostic stream)
/// or the body propagated an error with `?`. Any
/// `std::error::Error + Send + Sync` converts into it; `TestFailure`
/// deliberately does not implement `Error` itself.
pub struct TestFailure {
    repr: Repr,
}

enum Repr {
    Terminated,
    Raised(Box<dyn StdError + Send + Sync + 'static>),
}

impl TestFailure {
    /// A failed check.
    pub fn terminated(_signal: Terminate) -> Self {
        Self {
            repr: Repr::Terminated,
        }
    }

    /// Converts whatever the signaler produced.
    pub fn from_raised(raised: Raised) -> Self {
        match raised {
            Raised::Error(err) => err.into(),
            Raised::Terminate(signal) => Self::terminated(signal),
        }
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.repr, Repr::Terminated)
    }

    /// The propagated error, if this failure carries one.
    pub fn error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &self.repr {
            Repr::Terminated => None,
            Repr::Raised(err) => Some(err.as_ref()),
        }
    }

    /// Message of the propagated error.
    pub fn message(&self) -> Option<String> {
        self.error().map(ToString::to_string)
    }
}

impl<E> From<E> for TestFailure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self {
            repr: Repr::Raised(Box::new(err)),
        }
    }
}

impl fmt::Debug for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Terminated => f.write_str("TestFailure::Terminated"),
            Repr::Raised(err) => f.debug_tuple("TestFailure::Raised").field(err).finish(),
        }
    }
}
