// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 KylinSoft Co., Ltd. <https://www.kylinos.cn/>
// See LICENSES for license details.

//! Call-site context attached to a failure.

/// Where and why a failure was signalled.
///
/// Built at the point of failure by the crate's macros and consumed at once
/// by the signaler. Every field is optional: reduced builds (the `obfuscate`
/// feature) pass [`DiagnosticContext::EMPTY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiagnosticContext<'a> {
    pub predicate: Option<&'a str>,
    pub function: Option<&'static str>,
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

impl<'a> DiagnosticContext<'a> {
    pub const EMPTY: DiagnosticContext<'static> = DiagnosticContext {
        predicate: None,
        function: None,
        file: None,
        line: None,
    };

    /// Full context, as captured in verbose builds.
    pub const fn located(
        predicate: &'a str,
        function: &'static str,
        file: &'static str,
        line: u32,
    ) -> Self {
        Self {
            predicate: Some(predicate),
            function: Some(function),
            file: Some(file),
            line: Some(line),
        }
    }

    /// Context carrying only the predicate text.
    pub const fn predicate(predicate: &'a str) -> Self {
        Self {
            predicate: Some(predicate),
            function: None,
            file: None,
            line: None,
        }
    }

    /// The `(file, line)` pair, when both are known and the line is non-zero.
    pub fn location(&self) -> Option<(&'static str, u32)> {
        match (self.file, self.line) {
            (Some(file), Some(line)) if line != 0 => Some((file, line)),
            _ => None,
        }
    }
}

/// Reduces the type name of an item nested in a function to that
/// function's bare name.
///
/// `type_name` is expected to end in `::__here`, the marker item declared by
/// [`function_name!`](crate::function_name). Closure segments are skipped.
#[doc(hidden)]
pub fn enclosing_function(type_name: &'static str) -> &'static str {
    let mut path = type_name.strip_suffix("::__here").unwrap_or(type_name);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}
