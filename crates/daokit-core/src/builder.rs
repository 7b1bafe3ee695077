// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Statement builder.
//!
//! A [`Builder`] accumulates SQL text and its positional arguments for one
//! operation. It is created fresh for every call, filled by a build callback,
//! and consumed with [`Builder::finish`].
//!
//! # Arguments
//!
//! Text is appended verbatim. Nothing is escaped; only values may come from
//! untrusted input and those always travel through the argument list. The
//! argument order is the placeholder order.
//!
//! # Build State
//!
//! ```text
//!            set_ok(false)            set_error(e)
//! Continue ───────────────▶ Skip ───────────────▶ Fail(e)
//!     ▲                      │                      ▲
//!     └──── set_ok(true) ────┘                      │
//!     └─────────────────── set_error(e) ────────────┘
//! ```
//!
//! `Fail` is terminal: `set_ok` never leaves it. `Skip` means "nothing to do"
//! and is not an error; the operation returns an empty result without issuing
//! SQL.
//!
//! # Example
//!
//! ```rust,ignore
//! let outcome = dao.build(std::iter::empty(), |b| {
//!     let columns = b.registry().joined_columns();
//!     b.write("SELECT ").write(columns).write(" FROM users WHERE id IN ");
//!     b.repeat(ids.len(), Separator::fix("(", ",", ")", false), None, |b, _, i| {
//!         b.bind(ids[i]);
//!     });
//! });
//! ```

use crate::{
    error::BuildError,
    registry::{ColumnDescriptor, Registry},
    separator::{Emission, Separator},
    value::Value
};

/// Placeholder syntax written by [`Builder::placeholder`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PlaceholderStyle {
    /// `?` for every argument.
    #[default]
    Question,
    /// Prefix followed by the argument ordinal, e.g. `$1`, `$2`.
    Ordinal(String)
}

impl PlaceholderStyle {
    /// Postgres-style `$n`.
    #[must_use]
    pub fn dollar() -> Self {
        Self::Ordinal("$".to_owned())
    }
}

/// Three-way result of a build callback.
#[derive(Debug, Default)]
pub enum BuildState {
    /// Healthy; the statement will run.
    #[default]
    Continue,
    /// Nothing to do; no SQL is issued and no error is reported.
    Skip,
    /// The build failed; no SQL is issued and the error is returned.
    Fail(BuildError)
}

/// Finished SQL text and its arguments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    /// SQL text.
    pub sql:  String,
    /// Arguments in placeholder order.
    pub args: Vec<Value>
}

/// What the execution shell should do with a finished builder.
#[derive(Debug)]
pub enum BuildOutcome {
    /// Issue the statement.
    Run(Statement),
    /// Return an empty result.
    Skip,
    /// Return the error.
    Fail(BuildError)
}

/// Fluent SQL and argument accumulator.
pub struct Builder<'a, E> {
    registry:    &'a Registry<E>,
    table:       &'a str,
    entities:    Vec<Option<&'a E>>,
    placeholder: PlaceholderStyle,
    sql:         String,
    args:        Vec<Value>,
    counter:     usize,
    state:       BuildState
}

impl<'a, E> Builder<'a, E> {
    /// Empty builder over a registry.
    #[must_use]
    pub fn new(registry: &'a Registry<E>) -> Self {
        Self {
            registry,
            table: "",
            entities: Vec::new(),
            placeholder: PlaceholderStyle::default(),
            sql: String::new(),
            args: Vec::new(),
            counter: 0,
            state: BuildState::Continue
        }
    }

    /// Set the table name used by statement helpers.
    #[must_use]
    pub fn with_table(mut self, table: &'a str) -> Self {
        self.table = table;
        self
    }

    /// Bind entities. `None` entries are holes that iteration skips.
    #[must_use]
    pub fn with_entities(mut self, entities: impl IntoIterator<Item = Option<&'a E>>) -> Self {
        self.entities = entities.into_iter().collect();
        self
    }

    /// Bind a single entity.
    #[must_use]
    pub fn with_entity(self, entity: &'a E) -> Self {
        self.with_entities([Some(entity)])
    }

    /// Set the placeholder syntax.
    #[must_use]
    pub fn with_placeholder(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder = style;
        self
    }

    /// Append text verbatim.
    pub fn write(&mut self, text: &str) -> &mut Self {
        self.sql.push_str(text);
        self
    }

    /// Append text and then arguments, in call order.
    pub fn write_args<I, V>(&mut self, text: &str, args: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>
    {
        self.sql.push_str(text);
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append one argument without text.
    pub fn arg(&mut self, value: impl Into<Value>) -> &mut Self {
        self.args.push(value.into());
        self
    }

    /// Advance the placeholder counter and return `prefix` + counter.
    ///
    /// The counter starts at 1 and is shared by every write on this builder,
    /// nested ones included.
    pub fn next_placeholder(&mut self, prefix: &str) -> String {
        self.counter += 1;
        format!("{prefix}{}", self.counter)
    }

    /// Write one placeholder in the configured style.
    pub fn placeholder(&mut self) -> &mut Self {
        match &self.placeholder {
            PlaceholderStyle::Question => self.sql.push('?'),
            PlaceholderStyle::Ordinal(prefix) => {
                self.counter += 1;
                self.sql.push_str(prefix);
                self.sql.push_str(&self.counter.to_string());
            }
        }
        self
    }

    /// Write a placeholder and push its argument.
    pub fn bind(&mut self, value: impl Into<Value>) -> &mut Self {
        self.placeholder();
        self.arg(value)
    }

    /// SQL written so far.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Arguments pushed so far.
    #[must_use]
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Fail the build. Permanent.
    pub fn set_error(&mut self, err: impl Into<BuildError>) {
        self.state = BuildState::Fail(err.into());
    }

    /// Toggle between continuing and skipping. No effect after a failure.
    pub fn set_ok(&mut self, ok: bool) {
        if matches!(self.state, BuildState::Fail(_)) {
            return;
        }
        self.state = if ok {
            BuildState::Continue
        } else {
            BuildState::Skip
        };
    }

    /// Whether the statement will run.
    #[must_use]
    pub const fn ok(&self) -> bool {
        matches!(self.state, BuildState::Continue)
    }

    /// The failure, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&BuildError> {
        match &self.state {
            BuildState::Fail(err) => Some(err),
            _ => None
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &BuildState {
        &self.state
    }

    /// Registry of the entity type.
    #[must_use]
    pub const fn registry(&self) -> &'a Registry<E> {
        self.registry
    }

    /// Table name.
    #[must_use]
    pub const fn table(&self) -> &'a str {
        self.table
    }

    /// Primary entity: the first bound slot.
    #[must_use]
    pub fn entity(&self) -> Option<&'a E> {
        self.entity_at(0)
    }

    /// Bound entity at `index`; `None` for holes and out-of-range indexes.
    #[must_use]
    pub fn entity_at(&self, index: usize) -> Option<&'a E> {
        self.entities.get(index).copied().flatten()
    }

    /// All bound slots.
    #[must_use]
    pub fn entities(&self) -> &[Option<&'a E>] {
        &self.entities
    }

    /// Iterate `0..count`, emitting every index accepted by `filter`.
    ///
    /// `body` receives the 1-based emission number and the index. Returns the
    /// number of emissions.
    pub fn repeat<F>(
        &mut self,
        count: usize,
        sep: Separator<'_>,
        filter: Option<&dyn Fn(usize) -> bool>,
        mut body: F
    ) -> usize
    where
        F: FnMut(&mut Self, usize, usize)
    {
        let mut emission = Emission::begin(&sep, &mut self.sql);
        for i in 0..count {
            if filter.is_some_and(|keep| !keep(i)) {
                continue;
            }
            let n = emission.next(&mut self.sql);
            body(self, n, i);
        }
        emission.finish(&mut self.sql)
    }

    /// Iterate bound entities, skipping holes and entities rejected by
    /// `filter`.
    ///
    /// `body` receives the emission number, the slot index and the entity.
    pub fn each_entity<F>(
        &mut self,
        sep: Separator<'_>,
        filter: Option<&dyn Fn(&E) -> bool>,
        mut body: F
    ) -> usize
    where
        F: FnMut(&mut Self, usize, usize, &'a E)
    {
        let mut emission = Emission::begin(&sep, &mut self.sql);
        for i in 0..self.entities.len() {
            let Some(entity) = self.entities[i] else {
                continue;
            };
            if filter.is_some_and(|keep| !keep(entity)) {
                continue;
            }
            let n = emission.next(&mut self.sql);
            body(self, n, i, entity);
        }
        emission.finish(&mut self.sql)
    }

    /// Iterate registered columns not listed in `exclude`.
    ///
    /// `body` receives the emission number, the column and the entity's
    /// current value for it (`Null` when unset).
    pub fn each_column<F>(
        &mut self,
        entity: &E,
        sep: Separator<'_>,
        exclude: &[&str],
        mut body: F
    ) -> usize
    where
        F: FnMut(&mut Self, usize, &'a ColumnDescriptor, Value)
    {
        let registry = self.registry;
        let mut emission = Emission::begin(&sep, &mut self.sql);
        for column in registry.columns() {
            if exclude.contains(&column.name()) {
                continue;
            }
            let value = registry.read(entity, column);
            let n = emission.next(&mut self.sql);
            body(self, n, column, value);
        }
        emission.finish(&mut self.sql)
    }

    /// Column names not listed in `exclude`; with `only_assigned`, only
    /// those set on the primary entity.
    ///
    /// Empty when no primary entity is bound.
    #[must_use]
    pub fn columns(&self, only_assigned: bool, exclude: &[&str]) -> Vec<&'a str> {
        let registry = self.registry;
        let Some(entity) = self.entity() else {
            return Vec::new();
        };
        registry
            .columns()
            .iter()
            .filter(|column| !exclude.contains(&column.name()))
            .filter(|column| !only_assigned || !registry.read(entity, column).is_null())
            .map(ColumnDescriptor::name)
            .collect()
    }

    /// Consume the builder.
    #[must_use]
    pub fn finish(self) -> BuildOutcome {
        match self.state {
            BuildState::Continue => BuildOutcome::Run(Statement {
                sql:  self.sql,
                args: self.args
            }),
            BuildState::Skip => BuildOutcome::Skip,
            BuildState::Fail(err) => BuildOutcome::Fail(err)
        }
    }
}
