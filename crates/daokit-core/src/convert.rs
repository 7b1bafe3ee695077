// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Custom field conversion.
//!
//! A field whose type is not itself [`Storable`] can still be mapped to a
//! column by declaring how it is stored. The derive macro picks this up from
//! `#[dao(convert)]`.
//!
//! ```rust,ignore
//! #[derive(Debug, Clone, PartialEq)]
//! enum Status { Active, Banned }
//!
//! impl Convert for Status {
//!     type Storage = i32;
//!
//!     fn to_storage_value(&self) -> i32 {
//!         match self { Self::Active => 1, Self::Banned => 2 }
//!     }
//!
//!     fn from_storage_value(value: i32) -> Option<Self> {
//!         match value { 1 => Some(Self::Active), 2 => Some(Self::Banned), _ => None }
//!     }
//! }
//! ```

use crate::value::Storable;

/// Bidirectional mapping between a field type and one storage primitive.
///
/// The storage type must be a scalar; slice storage is rejected when the
/// entity is registered.
pub trait Convert: Sized + Send + Sync + 'static {
    /// Primitive the value is stored as.
    type Storage: Storable;

    /// Produce the value written to the database.
    fn to_storage_value(&self) -> Self::Storage;

    /// Rebuild the field from a stored value.
    ///
    /// `None` leaves the field as it was before the row was scanned.
    fn from_storage_value(value: Self::Storage) -> Option<Self>;
}
