// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Convenient re-exports for common usage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use daokit_core::prelude::*;
//! ```

pub use crate::{
    BuildOutcome, Builder, Convert, Dao, DaoConfig, DaoError, Entity, ExecResult, Executor,
    FieldDef, IdProtocol, NameMapper, PlaceholderStyle, Registry, Rows, Separator, Storable,
    Value, async_trait
};
