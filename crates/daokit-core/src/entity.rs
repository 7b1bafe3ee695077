// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! The entity trait.

use crate::field::FieldDef;

/// A record type mapped to one table.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Debug, Default, Entity)]
/// #[dao(table = "users")]
/// pub struct User {
///     #[dao(tag = "auto")]
///     pub id: Option<i64>,
///     pub name: Option<String>,
/// }
/// ```
///
/// `Default` provides the blank instance every result row is scanned into.
pub trait Entity: Default + Send + Sync + Sized + 'static {
    /// Table the entity lives in.
    fn table() -> &'static str;

    /// Field accessor table in declaration order.
    fn fields() -> Vec<FieldDef<Self>>;
}
