// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Attribute parsing for the Entity derive macro.
//!
//! Entity-level `#[dao(table = "...")]` is parsed with [`darling`]'s
//! `FromDeriveInput`. Field-level `#[dao(...)]` mixes a key-value option with
//! marker options and is parsed manually with `parse_nested_meta`.
//!
//! # Data Structures
//!
//! ```text
//! EntityDef
//! ├── ident: Ident          (struct name)
//! ├── generics: Generics
//! ├── table: String         (database table name)
//! └── fields: Vec<FieldDef>
//!     └── FieldDef
//!         ├── ident: Ident      (field name)
//!         ├── ty: Type          (field type)
//!         ├── exported: bool    (declared `pub`)
//!         ├── tag: Option<String>
//!         ├── convert: bool
//!         └── embedded: bool
//! ```

mod entity;
mod field;

pub use entity::EntityDef;
pub use field::{FieldDef, FieldShape};
