// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! DAO execution shell.
//!
//! A [`Dao`] pairs an entity's frozen [`Registry`] with runtime settings from
//! [`DaoConfig`]. Every operation follows the same sequence:
//!
//! 1. create a fresh [`Builder`] bound to the operation's entities
//! 2. run the caller's build callback (and any statement helpers)
//! 3. check the build state once: `Skip` returns an empty result, `Fail`
//!    returns the error, nothing reaches the executor in either case
//! 4. hand SQL and arguments to the [`Executor`]
//! 5. bind result rows or propagate generated ids
//!
//! # Operations
//!
//! | Operation | Statement | Result |
//! |-----------|-----------|--------|
//! | [`query`](Dao::query) | caller-built | `Vec<E>` |
//! | [`query_with`](Dao::query_with) | caller-built over bound entities | `Vec<E>` |
//! | [`query_one`](Dao::query_one) | caller-built | `Option<E>` |
//! | [`count`](Dao::count) | caller-built | `i64` |
//! | [`exec`](Dao::exec) | caller-built | rows affected |
//! | [`exec_with`](Dao::exec_with) | caller-built over bound entities | rows affected |
//! | [`insert`](Dao::insert) | `INSERT` of assigned-or-not columns | rows affected, id written back |
//! | [`insert_batch`](Dao::insert_batch) | multi-row `INSERT` | rows affected, ids written back |
//! | [`insert_sparse`](Dao::insert_sparse) | multi-row `INSERT` over present slots | rows affected, ids written back |
//! | [`update`](Dao::update) | `UPDATE t SET <assigned>` + caller `WHERE` | rows affected |
//! | [`update_batch`](Dao::update_batch) | `UPDATE ... CASE WHEN ...` | rows affected |
//! | [`delete`](Dao::delete) | `DELETE FROM t` + caller `WHERE` | rows affected |
//!
//! # Example
//!
//! ```rust,ignore
//! let dao: Dao<User> = Dao::new(DaoConfig::default().with_placeholder(PlaceholderStyle::dollar()))?;
//!
//! let mut user = User { name: Some("ann".into()), ..User::default() };
//! dao.insert(&conn, &mut user).await?;
//!
//! let active = dao
//!     .query(&conn, |b| {
//!         let columns = b.registry().joined_columns();
//!         b.write("SELECT ").write(columns).write(" FROM users WHERE active=");
//!         b.bind(true);
//!     })
//!     .await?;
//! ```

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    autoinc::{GeneratedId, IdProtocol},
    builder::{BuildOutcome, Builder, PlaceholderStyle, Statement},
    entity::Entity,
    error::DaoError,
    executor::{Executor, Rows},
    mapper::NameMapper,
    registry::Registry
};

/// Runtime DAO settings.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DaoConfig {
    /// Table name; defaults to [`Entity::table`].
    pub table:                Option<String>,
    /// Field-name to column-name pipeline; `None` registers tagged fields
    /// only.
    pub mapper:               Option<NameMapper>,
    /// Skip invalid fields instead of failing registration.
    pub allow_invalid_fields: bool,
    /// Placeholder syntax.
    pub placeholder:          PlaceholderStyle,
    /// How generated ids are learned after inserts.
    pub id_protocol:          IdProtocol,
    /// Panic instead of returning errors.
    pub must:                 bool
}

impl Default for DaoConfig {
    fn default() -> Self {
        Self {
            table:                None,
            mapper:               Some(NameMapper::snake_case()),
            allow_invalid_fields: false,
            placeholder:          PlaceholderStyle::Question,
            id_protocol:          IdProtocol::FirstId,
            must:                 false
        }
    }
}

impl DaoConfig {
    /// Override the table name.
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the name mapper.
    #[must_use]
    pub fn with_mapper(mut self, mapper: NameMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Register tagged fields only.
    #[must_use]
    pub fn without_mapper(mut self) -> Self {
        self.mapper = None;
        self
    }

    /// Skip invalid fields instead of failing.
    #[must_use]
    pub const fn with_allow_invalid_fields(mut self, allow: bool) -> Self {
        self.allow_invalid_fields = allow;
        self
    }

    /// Set the placeholder syntax.
    #[must_use]
    pub fn with_placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = style;
        self
    }

    /// Set the id propagation protocol.
    #[must_use]
    pub const fn with_id_protocol(mut self, protocol: IdProtocol) -> Self {
        self.id_protocol = protocol;
        self
    }

    /// Panic on any error.
    #[must_use]
    pub const fn with_must(mut self, must: bool) -> Self {
        self.must = must;
        self
    }
}

/// Data access object for entity `E`.
///
/// Cloning is cheap; clones share the registry.
pub struct Dao<E> {
    registry:    Arc<Registry<E>>,
    table:       String,
    placeholder: PlaceholderStyle,
    id_protocol: IdProtocol,
    must:        bool
}

impl<E> Clone for Dao<E> {
    fn clone(&self) -> Self {
        Self {
            registry:    Arc::clone(&self.registry),
            table:       self.table.clone(),
            placeholder: self.placeholder.clone(),
            id_protocol: self.id_protocol,
            must:        self.must
        }
    }
}

impl<E> std::fmt::Debug for Dao<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dao")
            .field("table", &self.table)
            .field("registry", &self.registry)
            .field("placeholder", &self.placeholder)
            .field("id_protocol", &self.id_protocol)
            .field("must", &self.must)
            .finish()
    }
}

impl<E: Entity> Dao<E> {
    /// Register `E` and build a DAO.
    ///
    /// # Errors
    ///
    /// [`DaoError::Registry`] when the entity has invalid fields.
    pub fn new(config: DaoConfig) -> Result<Self, DaoError> {
        let registry = Registry::<E>::register(config.mapper.as_ref(), config.allow_invalid_fields)?;
        Ok(Self {
            registry:    Arc::new(registry),
            table:       config.table.unwrap_or_else(|| E::table().to_owned()),
            placeholder: config.placeholder,
            id_protocol: config.id_protocol,
            must:        config.must
        })
    }

    /// Like [`Dao::new`], panicking on registration errors.
    ///
    /// # Panics
    ///
    /// When the entity has invalid fields.
    #[must_use]
    pub fn must_new(config: DaoConfig) -> Self {
        match Self::new(config) {
            Ok(dao) => dao,
            Err(err) => panic!("cannot create DAO for `{}`: {err}", E::table())
        }
    }

    /// Column registry.
    #[must_use]
    pub fn registry(&self) -> &Registry<E> {
        &self.registry
    }

    /// Table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Fresh builder bound to `entities`.
    pub fn builder<'a>(&'a self, entities: impl IntoIterator<Item = Option<&'a E>>) -> Builder<'a, E> {
        self.unbound().with_entities(entities)
    }

    fn unbound(&self) -> Builder<'_, E> {
        Builder::new(&self.registry)
            .with_table(&self.table)
            .with_placeholder(self.placeholder.clone())
    }

    fn build_unbound<F>(&self, build: F) -> BuildOutcome
    where
        F: FnOnce(&mut Builder<'_, E>)
    {
        let mut builder = self.unbound();
        build(&mut builder);
        builder.finish()
    }

    /// Run a build callback without executing anything.
    pub fn build<'a, F>(&'a self, entities: impl IntoIterator<Item = Option<&'a E>>, build: F) -> BuildOutcome
    where
        F: FnOnce(&mut Builder<'a, E>)
    {
        let mut builder = self.builder(entities);
        build(&mut builder);
        builder.finish()
    }

    /// Run a caller-built query and bind every row.
    ///
    /// # Errors
    ///
    /// Build, driver and binding failures.
    pub async fn query<X, F>(&self, ex: &X, build: F) -> Result<Vec<E>, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let result = self.query_rows(ex, self.build_unbound(build)).await;
        self.check(result)
    }

    /// Like [`Dao::query`], with `entities` bound to the builder.
    ///
    /// # Errors
    ///
    /// See [`Dao::query`].
    pub async fn query_with<'a, X, F>(
        &'a self,
        ex: &X,
        entities: impl IntoIterator<Item = Option<&'a E>>,
        build: F
    ) -> Result<Vec<E>, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'a, E>)
    {
        let outcome = self.build(entities, build);
        let result = self.query_rows(ex, outcome).await;
        self.check(result)
    }

    /// Run a caller-built query and bind the first row.
    ///
    /// # Errors
    ///
    /// See [`Dao::query`].
    pub async fn query_one<X, F>(&self, ex: &X, build: F) -> Result<Option<E>, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let result = self
            .query_rows(ex, self.build_unbound(build))
            .await
            .map(|rows| rows.into_iter().next());
        self.check(result)
    }

    /// Run a caller-built query returning a single number.
    ///
    /// # Errors
    ///
    /// [`DaoError::UnexpectedResult`] when the first cell is missing or not an
    /// integer.
    pub async fn count<X, F>(&self, ex: &X, build: F) -> Result<i64, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let result = self.count_rows(ex, self.build_unbound(build)).await;
        self.check(result)
    }

    /// Run a caller-built statement.
    ///
    /// # Errors
    ///
    /// Build and driver failures.
    pub async fn exec<X, F>(&self, ex: &X, build: F) -> Result<u64, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let outcome = self.build_unbound(build);
        let result = self.execute(ex, outcome).await;
        self.check(result)
    }

    /// Like [`Dao::exec`], with `entities` bound to the builder, so the
    /// callback can use [`Builder::entity`], [`Builder::columns`],
    /// [`Builder::each_entity`] and [`Builder::each_column`].
    ///
    /// ```rust,ignore
    /// dao.exec_with(&conn, users.iter().map(Some), |b| {
    ///     let columns = b.columns(false, &[]).join(",");
    ///     let table = b.table();
    ///     b.write("REPLACE INTO ").write(table).write("(").write(&columns).write(")");
    ///     b.each_entity(Separator::fix(" VALUES ", ",", "", false), None, |b, _, _, user| {
    ///         b.each_column(user, Separator::fix("(", ",", ")", true), &[], |b, _, _, value| {
    ///             b.bind(value);
    ///         });
    ///     });
    /// })
    /// .await?;
    /// ```
    ///
    /// # Errors
    ///
    /// See [`Dao::exec`].
    pub async fn exec_with<'a, X, F>(
        &'a self,
        ex: &X,
        entities: impl IntoIterator<Item = Option<&'a E>>,
        build: F
    ) -> Result<u64, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'a, E>)
    {
        let outcome = self.build(entities, build);
        let result = self.execute(ex, outcome).await;
        self.check(result)
    }

    /// Insert one entity and write its generated id back.
    ///
    /// # Errors
    ///
    /// Build, driver and id binding failures. A driver that cannot report an
    /// id is not an error.
    pub async fn insert<X: Executor>(&self, ex: &X, entity: &mut E) -> Result<u64, DaoError> {
        let result = self.insert_slots(ex, vec![Some(entity)], true).await;
        self.check(result)
    }

    /// Insert all entities in one statement and write generated ids back.
    ///
    /// When every entity already carries an id, the auto-increment column is
    /// inserted as given and nothing is written back. Otherwise the column is
    /// left out of the statement and every entity receives a generated id,
    /// replacing any value it held.
    ///
    /// # Errors
    ///
    /// See [`Dao::insert`].
    pub async fn insert_batch<X: Executor>(&self, ex: &X, entities: &mut [E]) -> Result<u64, DaoError> {
        let slots = entities.iter_mut().map(Some).collect();
        let result = self.insert_slots(ex, slots, false).await;
        self.check(result)
    }

    /// Insert the present slots in one statement; `None` slots are skipped
    /// and consume no generated id.
    ///
    /// # Errors
    ///
    /// See [`Dao::insert`].
    pub async fn insert_sparse<X: Executor>(&self, ex: &X, entities: &mut [Option<E>]) -> Result<u64, DaoError> {
        let slots = entities.iter_mut().map(Option::as_mut).collect();
        let result = self.insert_slots(ex, slots, false).await;
        self.check(result)
    }

    /// Update the assigned columns of `entity`; `filter` writes the `WHERE`
    /// clause.
    ///
    /// Returns `0` without touching the database when nothing is assigned.
    ///
    /// # Errors
    ///
    /// Build and driver failures.
    pub async fn update<X, F>(&self, ex: &X, entity: &E, filter: F) -> Result<u64, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let outcome = self.build([Some(entity)], |b| {
            let table = b.table();
            b.write("UPDATE ").write(table);
            b.write_update_set(&[]);
            if b.ok() {
                filter(b);
            }
        });
        let result = self.execute(ex, outcome).await;
        self.check(result)
    }

    /// Update many entities in one statement keyed by `key`.
    ///
    /// # Errors
    ///
    /// Build and driver failures.
    pub async fn update_batch<X: Executor>(&self, ex: &X, entities: &[E], key: &str) -> Result<u64, DaoError> {
        let outcome = self.build(entities.iter().map(Some), |b| {
            b.write_update_batch(key);
        });
        let result = self.execute(ex, outcome).await;
        self.check(result)
    }

    /// Delete rows; `filter` writes the `WHERE` clause.
    ///
    /// # Errors
    ///
    /// Build and driver failures.
    pub async fn delete<X, F>(&self, ex: &X, filter: F) -> Result<u64, DaoError>
    where
        X: Executor,
        F: FnOnce(&mut Builder<'_, E>)
    {
        let outcome = self.build_unbound(|b| {
            let table = b.table();
            b.write("DELETE FROM ").write(table);
            filter(b);
        });
        let result = self.execute(ex, outcome).await;
        self.check(result)
    }

    async fn query_rows<X: Executor>(&self, ex: &X, outcome: BuildOutcome) -> Result<Vec<E>, DaoError> {
        let Some(stmt) = self.statement(outcome)? else {
            return Ok(Vec::new());
        };
        let Rows {
            columns,
            rows
        } = ex
            .query(&stmt.sql, &stmt.args)
            .await
            .map_err(DaoError::driver)?;
        let plan = self.registry.bind_scan_targets(columns.as_slice());
        let entities = rows
            .into_iter()
            .map(|row| plan.scan_row(row))
            .collect::<Result<Vec<E>, _>>()?;
        Ok(entities)
    }

    async fn count_rows<X: Executor>(&self, ex: &X, outcome: BuildOutcome) -> Result<i64, DaoError> {
        let Some(stmt) = self.statement(outcome)? else {
            return Ok(0);
        };
        let rows = ex
            .query(&stmt.sql, &stmt.args)
            .await
            .map_err(DaoError::driver)?;
        let cell = rows.rows.first().and_then(|row| row.first());
        match cell {
            Some(value) => value.as_i64().ok_or_else(|| {
                DaoError::UnexpectedResult(format!("count returned `{}`", value.type_name()))
            }),
            None => Err(DaoError::UnexpectedResult("count returned no rows".to_owned()))
        }
    }

    async fn execute<X: Executor>(&self, ex: &X, outcome: BuildOutcome) -> Result<u64, DaoError> {
        let Some(stmt) = self.statement(outcome)? else {
            return Ok(0);
        };
        let done = ex
            .execute(&stmt.sql, &stmt.args)
            .await
            .map_err(DaoError::driver)?;
        Ok(done.rows_affected)
    }

    async fn insert_slots<X: Executor>(
        &self,
        ex: &X,
        mut slots: Vec<Option<&mut E>>,
        single: bool
    ) -> Result<u64, DaoError> {
        let returning = self.id_protocol == IdProtocol::Returning && self.registry.auto_column().is_some();
        let preset = self
            .registry
            .auto_assigned(slots.iter().flatten().map(|entity| &**entity));
        let outcome = self.build(slots.iter().map(|slot| slot.as_deref()), |b| {
            if single {
                b.write_insert(false);
            } else {
                b.write_insert_batch();
            }
            if returning {
                b.write_returning();
            }
        });
        let Some(stmt) = self.statement(outcome)? else {
            return Ok(0);
        };

        if returning {
            let rows = ex
                .query(&stmt.sql, &stmt.args)
                .await
                .map_err(DaoError::driver)?;
            if rows.is_empty() {
                warn!(table = %self.table, "insert returned no id rows");
            }
            self.registry
                .assign_returned_rows(slots.iter_mut().map(|slot| slot.as_deref_mut()), &rows)?;
            return Ok(rows.len() as u64);
        }

        let done = ex
            .execute(&stmt.sql, &stmt.args)
            .await
            .map_err(DaoError::driver)?;
        if self.registry.auto_column().is_some() && !preset {
            match done.last_insert_id {
                Some(id) => {
                    let generated = match self.id_protocol {
                        IdProtocol::LastId => GeneratedId::Last(id),
                        IdProtocol::FirstId | IdProtocol::Returning => GeneratedId::First(id)
                    };
                    self.registry
                        .assign_generated_ids(slots.iter_mut().map(|slot| slot.as_deref_mut()), generated)?;
                }
                None => warn!(table = %self.table, "driver reported no generated id, ids not propagated")
            }
        }
        Ok(done.rows_affected)
    }

    fn statement(&self, outcome: BuildOutcome) -> Result<Option<Statement>, DaoError> {
        match outcome {
            BuildOutcome::Run(stmt) => {
                debug!(table = %self.table, sql = %stmt.sql, args = stmt.args.len(), "executing statement");
                Ok(Some(stmt))
            }
            BuildOutcome::Skip => {
                debug!(table = %self.table, "build skipped, nothing to execute");
                Ok(None)
            }
            BuildOutcome::Fail(err) => Err(err.into())
        }
    }

    fn check<T>(&self, result: Result<T, DaoError>) -> Result<T, DaoError> {
        match result {
            Err(err) if self.must => panic!("{} operation failed: {err}", self.table),
            other => other
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, sync::Mutex};

    use async_trait::async_trait;
    use thiserror::Error;

    use super::*;
    use crate::{
        executor::ExecResult,
        field::FieldDef,
        separator::Separator,
        value::Value
    };

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Note {
        id:   Option<i64>,
        body: Option<String>,
        pins: Option<u32>
    }

    impl Entity for Note {
        fn table() -> &'static str {
            "notes"
        }

        fn fields() -> Vec<FieldDef<Self>> {
            vec![
                FieldDef::storable("id", |n: &Self| &n.id, |n: &mut Self| &mut n.id).tag("auto"),
                FieldDef::storable("body", |n: &Self| &n.body, |n: &mut Self| &mut n.body),
                FieldDef::storable("pins", |n: &Self| &n.pins, |n: &mut Self| &mut n.pins),
            ]
        }
    }

    #[derive(Debug, Error)]
    #[error("connection lost")]
    struct Lost;

    enum Reply {
        Rows(Rows),
        Done(ExecResult),
        Fail
    }

    #[derive(Default)]
    struct Recorder {
        calls:   Mutex<Vec<(String, Vec<Value>)>>,
        replies: Mutex<VecDeque<Reply>>
    }

    impl Recorder {
        fn reply(self, reply: Reply) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        fn calls(&self) -> Vec<(String, Vec<Value>)> {
            self.calls.lock().unwrap().clone()
        }

        fn next(&self, sql: &str, args: &[Value]) -> Option<Reply> {
            self.calls.lock().unwrap().push((sql.to_owned(), args.to_vec()));
            self.replies.lock().unwrap().pop_front()
        }
    }

    #[async_trait]
    impl Executor for Recorder {
        type Error = Lost;

        async fn query(&self, sql: &str, args: &[Value]) -> Result<Rows, Lost> {
            match self.next(sql, args) {
                Some(Reply::Rows(rows)) => Ok(rows),
                Some(Reply::Fail) => Err(Lost),
                _ => Ok(Rows::default())
            }
        }

        async fn execute(&self, sql: &str, args: &[Value]) -> Result<ExecResult, Lost> {
            match self.next(sql, args) {
                Some(Reply::Done(done)) => Ok(done),
                Some(Reply::Fail) => Err(Lost),
                _ => Ok(ExecResult::default())
            }
        }
    }

    fn dao() -> Dao<Note> {
        Dao::must_new(DaoConfig::default())
    }

    fn note(body: &str) -> Note {
        Note {
            body: Some(body.into()),
            ..Note::default()
        }
    }

    #[tokio::test]
    async fn query_binds_rows_in_result_order() {
        let ex = Recorder::default().reply(Reply::Rows(Rows::new(
            ["pins", "id", "extra"],
            vec![
                vec![Value::I64(2), Value::I64(1), Value::from("x")],
                vec![Value::Null, Value::I64(2), Value::Null],
            ]
        )));
        let notes = dao()
            .query(&ex, |b| {
                b.write("SELECT pins,id,extra FROM notes WHERE id>");
                b.bind(0_i64);
            })
            .await
            .unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, Some(1));
        assert_eq!(notes[0].pins, Some(2));
        assert_eq!(notes[1].pins, None);
        assert_eq!(ex.calls()[0].1, vec![Value::I64(0)]);
    }

    #[tokio::test]
    async fn query_one_takes_first_row() {
        let ex = Recorder::default().reply(Reply::Rows(Rows::new(
            ["body"],
            vec![vec![Value::from("a")], vec![Value::from("b")]]
        )));
        let found = dao()
            .query_one(&ex, |b| {
                b.write("SELECT body FROM notes");
            })
            .await
            .unwrap();
        assert_eq!(found.and_then(|n| n.body).as_deref(), Some("a"));
    }

    #[tokio::test]
    async fn build_error_never_reaches_executor() {
        let ex = Recorder::default();
        let err = dao()
            .query(&ex, |b| {
                b.write("SELECT 1");
                b.set_error("missing filter");
                b.set_ok(true);
            })
            .await
            .unwrap_err();
        assert!(err.is_build());
        assert!(ex.calls().is_empty());
    }

    #[tokio::test]
    async fn skip_returns_empty_results() {
        let ex = Recorder::default();
        let dao = dao();
        let notes = dao.query(&ex, |b| b.set_ok(false)).await.unwrap();
        assert!(notes.is_empty());
        assert_eq!(dao.count(&ex, |b| b.set_ok(false)).await.unwrap(), 0);
        assert_eq!(dao.exec(&ex, |b| b.set_ok(false)).await.unwrap(), 0);
        assert!(ex.calls().is_empty());
    }

    #[tokio::test]
    async fn count_reads_first_cell() {
        let ex = Recorder::default()
            .reply(Reply::Rows(Rows::new(["count"], vec![vec![Value::I64(12)]])))
            .reply(Reply::Rows(Rows::new(["count"], vec![vec![Value::from("many")]])));
        let dao = dao();
        let n = dao
            .count(&ex, |b| {
                b.write("SELECT COUNT(*) FROM notes");
            })
            .await
            .unwrap();
        assert_eq!(n, 12);
        let err = dao
            .count(&ex, |b| {
                b.write("SELECT 'many'");
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DaoError::UnexpectedResult(_)));
    }

    #[tokio::test]
    async fn driver_errors_surface() {
        let ex = Recorder::default().reply(Reply::Fail);
        let err = dao()
            .exec(&ex, |b| {
                b.write("DELETE FROM notes");
            })
            .await
            .unwrap_err();
        assert!(err.is_driver());
    }

    #[tokio::test]
    async fn insert_writes_back_first_id() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(1).with_last_insert_id(Some(55))));
        let mut n = note("hello");
        let affected = dao().insert(&ex, &mut n).await.unwrap();
        assert_eq!(affected, 1);
        assert_eq!(n.id, Some(55));
        assert_eq!(ex.calls()[0].0, "INSERT INTO notes(body,pins) VALUES (?,?)");
    }

    #[tokio::test]
    async fn insert_batch_first_id_sequence() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(3).with_last_insert_id(Some(100))));
        let mut notes = vec![note("a"), note("b"), note("c")];
        dao().insert_batch(&ex, &mut notes).await.unwrap();
        let ids: Vec<_> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, [Some(100), Some(101), Some(102)]);
        assert_eq!(
            ex.calls()[0].0,
            "INSERT INTO notes(body,pins) VALUES (?,?),(?,?),(?,?)"
        );
    }

    #[tokio::test]
    async fn insert_batch_last_id_sequence() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(2).with_last_insert_id(Some(11))));
        let dao: Dao<Note> = Dao::must_new(DaoConfig::default().with_id_protocol(IdProtocol::LastId));
        let mut notes = vec![note("a"), note("b")];
        dao.insert_batch(&ex, &mut notes).await.unwrap();
        assert_eq!((notes[0].id, notes[1].id), (Some(10), Some(11)));
    }

    #[tokio::test]
    async fn insert_batch_keeps_preset_ids() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(2).with_last_insert_id(Some(100))));
        let mut notes = vec![
            Note {
                id: Some(5),
                ..note("a")
            },
            Note {
                id: Some(6),
                ..note("b")
            },
        ];
        dao().insert_batch(&ex, &mut notes).await.unwrap();
        assert_eq!((notes[0].id, notes[1].id), (Some(5), Some(6)));
        let calls = ex.calls();
        assert_eq!(calls[0].0, "INSERT INTO notes(id,body,pins) VALUES (?,?,?),(?,?,?)");
        assert_eq!(calls[0].1[0], Value::I64(5));
    }

    #[tokio::test]
    async fn insert_batch_with_partial_ids_uses_generated_ids() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(2).with_last_insert_id(Some(100))));
        let mut notes = vec![
            Note {
                id: Some(5),
                ..note("a")
            },
            note("b"),
        ];
        dao().insert_batch(&ex, &mut notes).await.unwrap();
        assert_eq!((notes[0].id, notes[1].id), (Some(100), Some(101)));
        assert_eq!(ex.calls()[0].0, "INSERT INTO notes(body,pins) VALUES (?,?),(?,?)");
    }

    #[tokio::test]
    async fn insert_with_preset_id_is_not_overwritten() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(1).with_last_insert_id(Some(99))));
        let mut n = Note {
            id: Some(42),
            ..note("a")
        };
        dao().insert(&ex, &mut n).await.unwrap();
        assert_eq!(n.id, Some(42));
        assert_eq!(ex.calls()[0].0, "INSERT INTO notes(id,body,pins) VALUES (?,?,?)");
    }

    #[tokio::test]
    async fn query_with_binds_entities() {
        let ex = Recorder::default().reply(Reply::Rows(Rows::new(["id"], vec![vec![Value::I64(1)]])));
        let (a, b) = (
            Note {
                id: Some(1),
                ..note("a")
            },
            Note {
                id: Some(2),
                ..note("b")
            },
        );
        let dao = dao();
        let found = dao
            .query_with(&ex, [Some(&a), None, Some(&b)], |q| {
                let registry = q.registry();
                let id = registry.column("id");
                q.write("SELECT id FROM notes WHERE id");
                q.each_entity(Separator::fix(" IN (", ",", ")", false), None, |q, _, _, n| {
                    q.bind(id.map_or(Value::Null, |column| registry.read(n, column)));
                });
            })
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        let calls = ex.calls();
        assert_eq!(calls[0].0, "SELECT id FROM notes WHERE id IN (?,?)");
        assert_eq!(calls[0].1, [Value::I64(1), Value::I64(2)]);
    }

    #[tokio::test]
    async fn insert_sparse_skips_holes() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(2).with_last_insert_id(Some(7))));
        let mut slots = vec![Some(note("a")), None, Some(note("c"))];
        dao().insert_sparse(&ex, &mut slots).await.unwrap();
        assert_eq!(slots[0].as_ref().and_then(|n| n.id), Some(7));
        assert!(slots[1].is_none());
        assert_eq!(slots[2].as_ref().and_then(|n| n.id), Some(8));
        assert_eq!(ex.calls()[0].1.len(), 4);
    }

    #[tokio::test]
    async fn insert_without_reported_id_still_succeeds() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(1)));
        let mut n = note("a");
        assert_eq!(dao().insert(&ex, &mut n).await.unwrap(), 1);
        assert_eq!(n.id, None);
    }

    #[tokio::test]
    async fn insert_returning_scans_ids() {
        let ex = Recorder::default().reply(Reply::Rows(Rows::new(
            ["id"],
            vec![vec![Value::I64(3)], vec![Value::I64(4)]]
        )));
        let dao: Dao<Note> = Dao::must_new(
            DaoConfig::default()
                .with_id_protocol(IdProtocol::Returning)
                .with_placeholder(PlaceholderStyle::dollar())
        );
        let mut notes = vec![note("a"), note("b")];
        assert_eq!(dao.insert_batch(&ex, &mut notes).await.unwrap(), 2);
        assert_eq!((notes[0].id, notes[1].id), (Some(3), Some(4)));
        assert_eq!(
            ex.calls()[0].0,
            "INSERT INTO notes(body,pins) VALUES ($1,$2),($3,$4) RETURNING id"
        );
    }

    #[tokio::test]
    async fn update_sets_assigned_columns() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(1)));
        let n = Note {
            id:   Some(9),
            body: None,
            pins: Some(3)
        };
        let affected = dao()
            .update(&ex, &n, |b| {
                b.write_where_eq("id", 9_i64);
            })
            .await
            .unwrap();
        assert_eq!(affected, 1);
        assert_eq!(ex.calls()[0].0, "UPDATE notes SET pins=? WHERE id=?");
    }

    #[tokio::test]
    async fn update_with_nothing_assigned_is_skipped() {
        let ex = Recorder::default();
        let n = Note {
            id: Some(9),
            ..Note::default()
        };
        let affected = dao()
            .update(&ex, &n, |b| {
                b.write_where_eq("id", 9_i64);
            })
            .await
            .unwrap();
        assert_eq!(affected, 0);
        assert!(ex.calls().is_empty());
    }

    #[tokio::test]
    async fn update_batch_single_statement() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(2)));
        let notes = vec![
            Note {
                id: Some(1),
                ..note("a")
            },
            Note {
                id: Some(2),
                ..note("b")
            },
        ];
        dao().update_batch(&ex, &notes, "id").await.unwrap();
        let calls = ex.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "UPDATE notes SET body=CASE id WHEN ? THEN ? WHEN ? THEN ? ELSE body END WHERE id IN (?,?)"
        );
    }

    #[tokio::test]
    async fn delete_prefixes_table() {
        let ex = Recorder::default().reply(Reply::Done(ExecResult::new(4)));
        let affected = dao()
            .delete(&ex, |b| {
                b.write(" WHERE pins=");
                b.bind(0_u32);
            })
            .await
            .unwrap();
        assert_eq!(affected, 4);
        assert_eq!(ex.calls()[0].0, "DELETE FROM notes WHERE pins=?");
    }

    #[tokio::test]
    #[should_panic(expected = "connection lost")]
    async fn must_mode_panics() {
        let ex = Recorder::default().reply(Reply::Fail);
        let dao: Dao<Note> = Dao::must_new(DaoConfig::default().with_must(true));
        let _ = dao
            .exec(&ex, |b| {
                b.write("SELECT 1");
            })
            .await;
    }

    #[test]
    fn table_override() {
        let dao: Dao<Note> = Dao::must_new(DaoConfig::default().with_table("archived_notes"));
        assert_eq!(dao.table(), "archived_notes");
        assert_eq!(dao.registry().joined_columns(), "id,body,pins");
    }

    #[test]
    fn without_mapper_registers_tagged_fields_only() {
        let dao: Dao<Note> = Dao::must_new(DaoConfig::default().without_mapper());
        assert!(dao.registry().is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_deserializes_with_defaults() {
        let config: DaoConfig = serde_json::from_str(
            r#"{"table":"people","placeholder":{"ordinal":"$"},"id_protocol":"last_id","mapper":["snake",{"prefix":"p_"}]}"#
        )
        .unwrap();
        assert_eq!(config.table.as_deref(), Some("people"));
        assert_eq!(config.placeholder, PlaceholderStyle::dollar());
        assert_eq!(config.id_protocol, IdProtocol::LastId);
        assert!(!config.must);
        let mapper = config.mapper.unwrap();
        assert_eq!(mapper.map("UserName"), "p_user_name");
    }
}
