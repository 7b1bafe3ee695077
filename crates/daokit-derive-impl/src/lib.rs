// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rust_2018_idioms
)]
#![deny(unsafe_code)]

//! # Attribute Quick Reference
//!
//! ## Entity-Level `#[dao(...)]`
//!
//! ```rust,ignore
//! #[derive(Default, Entity)]
//! #[dao(table = "users")]   // Required: database table name
//! pub struct User { /* ... */ }
//! ```
//!
//! ## Field-Level `#[dao(...)]`
//!
//! ```rust,ignore
//! pub struct User {
//!     #[dao(tag = "auto")]              // Auto-increment id
//!     pub id: Option<i64>,
//!
//!     #[dao(tag = "column=user_name")]  // Explicit column name
//!     pub name: Option<String>,
//!
//!     #[dao(convert)]                   // Stored through `Convert`
//!     pub status: Option<Status>,
//!
//!     #[dao(embedded)]                  // Never a column
//!     pub audit: Audit,
//!
//!     pub tags: Option<Vec<String>>,    // Slice column
//! }
//! ```
//!
//! # Field Mapping
//!
//! | Field | Accessor table entry |
//! |-------|----------------------|
//! | `Option<T>` | `FieldDef::storable::<T>` |
//! | `Option<T>` + `convert` | `FieldDef::converted::<T>` |
//! | `embedded` | `FieldDef::embedded` |
//! | anything else | `FieldDef::unsupported` |
//! | not `pub` | entry marked `.unexported()` |
//!
//! Unsupported and unexported entries fail DAO construction unless invalid
//! fields are allowed; they are emitted rather than rejected at compile time
//! so that behavior stays a runtime choice.

mod entity;

use proc_macro::TokenStream;

/// Derive the `daokit::Entity` accessor table.
///
/// # Entity Attributes
///
/// | Attribute | Required | Description |
/// |-----------|----------|-------------|
/// | `table` | **Yes** | Database table name |
///
/// # Field Attributes
///
/// | Attribute | Description |
/// |-----------|-------------|
/// | `tag = "..."` | Raw tag: `column=<name>`, `auto`, `auto=<step>`, `;`-separated |
/// | `convert` | Field type implements `Convert` |
/// | `embedded` | Flattened field, never mapped |
///
/// # Example
///
/// ```rust,ignore
/// use daokit::Entity;
///
/// #[derive(Debug, Default, Entity)]
/// #[dao(table = "posts")]
/// pub struct Post {
///     #[dao(tag = "auto")]
///     pub id: Option<i64>,
///     pub title: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(dao))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive(input)
}
