// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field name to column name mapping.
//!
//! A [`NameMapper`] is an ordered list of [`Transform`]s applied to a field's
//! source name when the field carries no explicit `column=` tag.
//!
//! ```rust
//! use daokit_core::{NameMapper, Transform};
//!
//! let mapper = NameMapper::new()
//!     .then(Transform::Snake)
//!     .then(Transform::Prefix("f_".into()));
//! assert_eq!(mapper.map("userName"), "f_user_name");
//! ```

use convert_case::{Case, Casing};

/// A single step of a [`NameMapper`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Transform {
    /// `userName` → `user_name`.
    Snake,
    /// `user_name` → `userName`.
    Camel,
    /// `user_name` → `UserName`.
    Pascal,
    /// `user_name` → `user-name`.
    Kebab,
    /// ASCII upper case, no word splitting.
    Upper,
    /// ASCII lower case, no word splitting.
    Lower,
    /// Prepend a fixed string.
    Prefix(String),
    /// Append a fixed string.
    Suffix(String),
    /// Arbitrary function.
    #[cfg_attr(feature = "serde", serde(skip))]
    Custom(fn(&str) -> String)
}

impl Transform {
    /// Apply this step to a name.
    #[must_use]
    pub fn apply(&self, name: &str) -> String {
        match self {
            Self::Snake => name.to_case(Case::Snake),
            Self::Camel => name.to_case(Case::Camel),
            Self::Pascal => name.to_case(Case::Pascal),
            Self::Kebab => name.to_case(Case::Kebab),
            Self::Upper => name.to_ascii_uppercase(),
            Self::Lower => name.to_ascii_lowercase(),
            Self::Prefix(prefix) => format!("{prefix}{name}"),
            Self::Suffix(suffix) => format!("{name}{suffix}"),
            Self::Custom(f) => f(name)
        }
    }
}

/// Ordered pipeline of name transforms.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct NameMapper {
    transforms: Vec<Transform>
}

impl NameMapper {
    /// Empty pipeline; maps every name to itself.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            transforms: Vec::new()
        }
    }

    /// Single snake-case step. The default for DAOs.
    #[must_use]
    pub fn snake_case() -> Self {
        Self::new().then(Transform::Snake)
    }

    /// Append a step.
    #[must_use]
    pub fn then(mut self, transform: Transform) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Steps in application order.
    #[must_use]
    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    /// Run `name` through every step in order.
    #[must_use]
    pub fn map(&self, name: &str) -> String {
        self.transforms
            .iter()
            .fold(name.to_owned(), |acc, transform| transform.apply(&acc))
    }
}

impl FromIterator<Transform> for NameMapper {
    fn from_iter<I: IntoIterator<Item = Transform>>(iter: I) -> Self {
        Self {
            transforms: iter.into_iter().collect()
        }
    }
}
