// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # Crate Layout
//!
//! | Crate | Contents |
//! |-------|----------|
//! | `daokit-core` | Registry, builder, binder, DAO shell |
//! | `daokit-derive-impl` | `#[derive(Entity)]` |
//!
//! Generated code refers to items through this crate, so depend on `daokit`
//! rather than on the parts.

// Re-export derive macro
// Re-export all core types
pub use daokit_core::*;
pub use daokit_derive_impl::Entity;
