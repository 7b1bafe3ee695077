// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Error types.
//!
//! | Error | Raised by | When |
//! |-------|-----------|------|
//! | [`RegistryError`] | [`Registry::register`](crate::Registry::register) | DAO construction |
//! | [`BuildError`] | build callbacks via [`Builder::set_error`](crate::Builder::set_error) | statement building |
//! | [`BindError`] | [`ScanPlan`](crate::ScanPlan), auto-increment resolver | row binding |
//! | [`DaoError`] | [`Dao`](crate::Dao) operations | any of the above, plus driver failures |

use std::error::Error as StdError;

use thiserror::Error;

use crate::value::{ColumnType, ValueError};

/// Entity registration failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The field type is neither storable nor convertible.
    #[error("field `{field}` has unsupported type `{type_name}`")]
    UnsupportedFieldKind {
        /// Field source name.
        field:     &'static str,
        /// Field type as written.
        type_name: &'static str
    },

    /// The field is private and invalid fields are not allowed.
    #[error("field `{field}` is not public")]
    UnexportedField {
        /// Field source name.
        field: &'static str
    },

    /// The field's converter stores something other than a scalar.
    #[error("field `{field}` converts to `{storage}`, converters must store a scalar")]
    InvalidConverter {
        /// Field source name.
        field:   &'static str,
        /// Declared storage type.
        storage: ColumnType
    },

    /// Two fields resolve to the same column name.
    #[error("column `{column}` is mapped by both `{first}` and `{second}`")]
    DuplicateColumn {
        /// Column name.
        column: String,
        /// First field mapping the column.
        first:  &'static str,
        /// Second field mapping the column.
        second: &'static str
    }
}

/// Failure to move values between rows and entities.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// A result row does not match the scan plan.
    #[error("row has {found} values for {expected} columns")]
    ColumnCount {
        /// Columns in the plan.
        expected: usize,
        /// Values in the row.
        found:    usize
    },

    /// A value could not be stored into its field.
    #[error("column `{column}`: {source}")]
    Value {
        /// Column being bound.
        column: String,
        /// Underlying conversion failure.
        #[source]
        source: ValueError
    }
}

/// Failure signalled by a build callback.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Plain message.
    #[error("{0}")]
    Message(String),

    /// Wrapped application error.
    #[error(transparent)]
    Other(Box<dyn StdError + Send + Sync>)
}

impl BuildError {
    /// Wrap any error.
    pub fn other(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<&str> for BuildError {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_owned())
    }
}

impl From<String> for BuildError {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

/// Failure of a DAO operation.
#[derive(Debug, Error)]
pub enum DaoError {
    /// Entity registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The build callback set an error; no SQL was issued.
    #[error("statement build failed: {0}")]
    Build(#[from] BuildError),

    /// A result row could not be bound.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The executor failed.
    #[error("driver error: {0}")]
    Driver(#[source] Box<dyn StdError + Send + Sync>),

    /// The executor returned a result the operation cannot interpret.
    #[error("unexpected result: {0}")]
    UnexpectedResult(String)
}

impl DaoError {
    /// Wrap an executor error.
    pub fn driver(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    /// Check if the failure came from the build callback.
    #[must_use]
    pub const fn is_build(&self) -> bool {
        matches!(self, Self::Build(_))
    }

    /// Check if the failure came from the executor.
    #[must_use]
    pub const fn is_driver(&self) -> bool {
        matches!(self, Self::Driver(_))
    }
}
