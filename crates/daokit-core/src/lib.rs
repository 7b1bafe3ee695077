// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Core types for daokit.
//!
//! This crate holds everything the `Entity` derive's generated code relies
//! on, plus the machinery that turns an entity into SQL and rows back into
//! entities. It can be used standalone with hand-written accessor tables.
//!
//! # Overview
//!
//! | Piece | Role |
//! |-------|------|
//! | [`Entity`], [`FieldDef`] | Accessor table for one record type |
//! | [`Registry`] | Column metadata derived once per entity type |
//! | [`Builder`] | Statement text, placeholders and arguments with build state |
//! | [`ScanPlan`] | Result columns bound to entity fields |
//! | [`Dao`] | High-level operations over an [`Executor`] |
//!
//! # Flow
//!
//! ```text
//! Entity::fields() ──► Registry ──┬──► Builder ──► Statement ──► Executor
//!                                 │                                  │
//!                                 └──► ScanPlan ◄──── Rows ◄─────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use daokit_core::prelude::*;
//!
//! let dao = Dao::<User>::new(DaoConfig::default())?;
//! let mut user = User { name: Some("ann".into()), ..Default::default() };
//! dao.insert(&pool, &mut user).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod autoinc;
mod binder;
mod builder;
mod convert;
mod dao;
mod entity;
mod error;
mod executor;
mod field;
mod mapper;
mod registry;
mod separator;
mod statements;
mod tag;
mod value;

pub mod prelude;

/// Re-export async_trait for executor implementations.
pub use async_trait::async_trait;

pub use crate::{
    autoinc::{GeneratedId, IdProtocol},
    binder::{PostScanAction, ScanPlan, ScanTarget},
    builder::{BuildOutcome, BuildState, Builder, PlaceholderStyle, Statement},
    convert::Convert,
    dao::{Dao, DaoConfig},
    entity::Entity,
    error::{BindError, BuildError, DaoError, RegistryError},
    executor::{ExecResult, Executor, Rows},
    field::{FieldDef, FieldKind},
    mapper::{NameMapper, Transform},
    registry::{ColumnDescriptor, IdKind, Registry},
    separator::{COMMA, Separator},
    tag::{DEFAULT_AUTO_STEP, Tag},
    value::{ColumnType, Kind, Storable, Value, ValueError}
};
