// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Separator descriptors for iteration primitives.
//!
//! Every iterating writer on the [`Builder`](crate::Builder) interleaves
//! caller output with three tokens:
//!
//! ```text
//! prefix  elem  sep  elem  sep  elem  suffix
//! ```
//!
//! - the suffix is written only if at least one element was emitted
//! - the separator is written before every element except the first
//! - the prefix is written when the first element is emitted, or, with
//!   `fix_if_empty`, once up front even if nothing is emitted
//!
//! The second prefix policy is what `INSERT INTO t() VALUES` needs; the first
//! is what `SET a=1, b=2` needs.

/// Prefix, separator and suffix tokens for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Separator<'a> {
    /// Written before the first element.
    pub prefix:       &'a str,
    /// Written between elements.
    pub sep:          &'a str,
    /// Written after the last element.
    pub suffix:       &'a str,
    /// Write the prefix even when no element is emitted.
    pub fix_if_empty: bool
}

impl<'a> Separator<'a> {
    /// Separator token only.
    #[must_use]
    pub const fn new(sep: &'a str) -> Self {
        Self {
            prefix: "",
            sep,
            suffix: "",
            fix_if_empty: false
        }
    }

    /// Full descriptor.
    #[must_use]
    pub const fn fix(prefix: &'a str, sep: &'a str, suffix: &'a str, fix_if_empty: bool) -> Self {
        Self {
            prefix,
            sep,
            suffix,
            fix_if_empty
        }
    }
}

/// `,` with no prefix or suffix.
pub const COMMA: Separator<'static> = Separator::new(",");

/// Emission bookkeeping for one iteration over a separator.
pub(crate) struct Emission<'s, 'a> {
    sep: &'s Separator<'a>,
    n:   usize
}

impl<'s, 'a> Emission<'s, 'a> {
    /// Start an iteration, writing a fixed prefix if the policy asks for it.
    pub(crate) fn begin(sep: &'s Separator<'a>, out: &mut String) -> Self {
        if sep.fix_if_empty {
            out.push_str(sep.prefix);
        }
        Self {
            sep,
            n: 0
        }
    }

    /// Account for one emitted element and write the tokens preceding it.
    ///
    /// Returns the 1-based emission number.
    pub(crate) fn next(&mut self, out: &mut String) -> usize {
        self.n += 1;
        if self.n == 1 {
            if !self.sep.fix_if_empty {
                out.push_str(self.sep.prefix);
            }
        } else {
            out.push_str(self.sep.sep);
        }
        self.n
    }

    /// Close the iteration.
    pub(crate) fn finish(self, out: &mut String) -> usize {
        if self.n > 0 {
            out.push_str(self.sep.suffix);
        }
        self.n
    }
}
