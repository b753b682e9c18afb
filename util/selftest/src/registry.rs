// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Test registry.
//!
//! `#[def_test]` places one [`TestCase`] per test function into the
//! [`UNIT_TESTS`] link-time slice. The process-wide [`Registry`] takes those
//! over the first time it is touched, in source declaration order, and hands
//! them to the runner through [`Registry::drain`].

use linkme::distributed_slice;
use spin::{Mutex, Once};

use crate::failure::TestResult;

/// Body of a unit test.
pub type TestFn = fn() -> TestResult;

/// A registered unit test.
#[derive(Clone, Copy)]
pub struct TestCase {
    /// Display name, the function name unless overridden.
    pub name: &'static str,
    /// Module path of the declaration.
    pub module: &'static str,
    /// Source file of the declaration.
    pub file: &'static str,
    /// Line of the declaration.
    pub line: u32,
    /// The test body.
    pub func: TestFn,
}

impl TestCase {
    pub const fn new(
        name: &'static str,
        module: &'static str,
        file: &'static str,
        line: u32,
        func: TestFn,
    ) -> Self {
        Self {
            name,
            module,
            file,
            line,
            func,
        }
    }
}

impl core::fmt::Debug for TestCase {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TestCase")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("file", &self.file)
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

/// Every test declared with `#[def_test]` in the final binary.
#[distributed_slice]
pub static UNIT_TESTS: [TestCase];

/// Ordered container of tests waiting to run.
pub struct Registry {
    cases: Mutex<Vec<TestCase>>,
}

static GLOBAL: Registry = Registry::new();
static SEEDED: Once = Once::new();

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// An empty registry, independent of [`UNIT_TESTS`].
    pub const fn new() -> Self {
        Self {
            cases: Mutex::new(Vec::new()),
        }
    }

    /// The process-wide registry.
    ///
    /// On first access it receives every entry of [`UNIT_TESTS`].
    pub fn global() -> &'static Registry {
        SEEDED.call_once(|| {
            let declared = declaration_order(&UNIT_TESTS);
            debug!("{} unit tests linked", declared.len());
            GLOBAL.cases.lock().extend(declared);
        });
        &GLOBAL
    }

    /// Appends a test after everything registered so far.
    pub fn register(&self, case: TestCase) {
        self.cases.lock().push(case);
    }

    /// Takes every registered test, leaving the registry empty.
    pub fn drain(&self) -> Vec<TestCase> {
        core::mem::take(&mut *self.cases.lock())
    }

    pub fn len(&self) -> usize {
        self.cases.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.lock().is_empty()
    }
}

/// Orders link-time entries as they appear in the source.
///
/// Files keep the order in which the linker first placed them; entries of
/// one file are sorted by line, ties keeping their slice position.
pub fn declaration_order(cases: &[TestCase]) -> Vec<TestCase> {
    let mut files: Vec<&'static str> = Vec::new();
    let mut keyed: Vec<(usize, u32, TestCase)> = cases
        .iter()
        .map(|case| {
            let rank = match files.iter().position(|f| *f == case.file) {
                Some(rank) => rank,
                None => {
                    files.push(case.file);
                    files.len() - 1
                }
            };
            (rank, case.line, *case)
        })
        .collect();
    keyed.sort_by_key(|&(rank, line, _)| (rank, line));
    keyed.into_iter().map(|(_, _, case)| case).collect()
}
