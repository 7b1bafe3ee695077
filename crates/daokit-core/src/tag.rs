// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field tag mini-language.
//!
//! A tag is a semicolon-separated list of `key=value` or bare-keyword
//! segments. Whitespace around segments, keys and values is ignored.
//!
//! | Segment | Effect |
//! |---------|--------|
//! | `column=<name>` | Explicit column name, overrides the name mapper |
//! | `auto` | Auto-increment column, step 1 |
//! | `auto=<step>` | Auto-increment column with the given step |
//!
//! Unknown keys are ignored. Generated ids only ever count upward: a step
//! of zero or below, or one that does not parse as an integer, still marks
//! the column auto-increment but uses [`DEFAULT_AUTO_STEP`].
//!
//! ```rust
//! use daokit_core::Tag;
//!
//! assert_eq!(Tag::parse("auto=-2").auto_step, Some(1));
//! assert_eq!(Tag::parse("auto=0").auto_step, Some(1));
//! ```
//!
//! ```rust
//! use daokit_core::Tag;
//!
//! let tag = Tag::parse("column=user_id; auto=2");
//! assert_eq!(tag.column.as_deref(), Some("user_id"));
//! assert_eq!(tag.auto_step, Some(2));
//! ```

/// Default auto-increment step.
pub const DEFAULT_AUTO_STEP: i64 = 1;

/// Parsed field tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// Explicit column name from `column=`.
    pub column:    Option<String>,
    /// Auto-increment step; `Some` when `auto` is present.
    pub auto_step: Option<i64>
}

impl Tag {
    /// Parse a raw tag string. Never fails.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut tag = Self::default();

        for segment in raw.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = match segment.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (segment, None)
            };

            match key {
                "column" => {
                    if let Some(name) = value.filter(|v| !v.is_empty()) {
                        tag.column = Some(name.to_owned());
                    }
                }
                "auto" => {
                    let step = value
                        .and_then(|v| v.parse::<i64>().ok())
                        .filter(|step| *step > 0)
                        .unwrap_or(DEFAULT_AUTO_STEP);
                    tag.auto_step = Some(step);
                }
                _ => {}
            }
        }

        tag
    }

    /// Whether the field is marked auto-increment.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.auto_step.is_some()
    }
}
