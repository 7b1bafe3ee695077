// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Executor contract.
//!
//! The DAO owns no connection. Every operation receives an [`Executor`]
//! that runs finished SQL against a database: a pooled connection, a
//! transaction, or an in-memory fake in tests.
//!
//! # Implementing
//!
//! ```rust,ignore
//! use daokit_core::{async_trait, ExecResult, Executor, Rows, Value};
//!
//! struct Conn(driver::Connection);
//!
//! #[async_trait]
//! impl Executor for Conn {
//!     type Error = driver::Error;
//!
//!     async fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, Self::Error> {
//!         let result = self.0.query(sql, args.iter().map(to_driver)).await?;
//!         Ok(Rows::new(result.columns(), result.rows().map(from_driver).collect()))
//!     }
//!
//!     async fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Self::Error> {
//!         let done = self.0.execute(sql, args.iter().map(to_driver)).await?;
//!         Ok(ExecResult::new(done.rows_affected()).with_last_insert_id(done.last_id()))
//!     }
//! }
//! ```
//!
//! Dropping the returned future cancels the call.

use async_trait::async_trait;

use crate::value::Value;

/// Materialized result set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rows {
    /// Column names in result order.
    pub columns: Vec<String>,
    /// Rows, each with one value per column.
    pub rows:    Vec<Vec<Value>>
}

impl Rows {
    /// Result set from column names and rows.
    pub fn new<I, S>(columns: I, rows: Vec<Vec<Value>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of a statement that returns no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Rows changed by the statement.
    pub rows_affected:  u64,
    /// Identifier generated by the statement; `None` when the driver cannot
    /// report one.
    pub last_insert_id: Option<i64>
}

impl ExecResult {
    /// Result with no generated identifier.
    #[must_use]
    pub const fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_insert_id: None
        }
    }

    /// Attach the driver-reported identifier.
    #[must_use]
    pub const fn with_last_insert_id(mut self, id: Option<i64>) -> Self {
        self.last_insert_id = id;
        self
    }
}

/// Runs SQL for the DAO.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Driver error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Run a statement that returns rows.
    async fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, Self::Error>;

    /// Run a statement that returns no rows.
    async fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Self::Error>;
}
