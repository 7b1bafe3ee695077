// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Statement helpers built on the [`Builder`] primitives.
//!
//! | Helper | Emits |
//! |--------|-------|
//! | [`write_insert`](Builder::write_insert) | `INSERT INTO t(a,b) VALUES (?,?)` |
//! | [`write_insert_batch`](Builder::write_insert_batch) | `INSERT INTO t(a,b) VALUES (?,?),(?,?)` |
//! | [`write_update_set`](Builder::write_update_set) | ` SET a=?,b=?` |
//! | [`write_update_batch`](Builder::write_update_batch) | `UPDATE t SET a=CASE id WHEN ? THEN ? ... END WHERE id IN (...)` |
//! | [`write_where_eq`](Builder::write_where_eq) | ` WHERE a=?` |
//! | [`write_returning`](Builder::write_returning) | ` RETURNING id` |
//!
//! The auto-increment column never appears in `SET` lists. A single insert
//! includes it when the entity already carries a value; a batch insert only
//! when every bound entity does.

use crate::{
    builder::Builder,
    separator::{COMMA, Separator},
    value::Value
};

impl<E> Builder<'_, E> {
    /// `INSERT INTO <table>(<cols>) VALUES (<placeholders>)` for the primary
    /// entity.
    ///
    /// With `only_assigned`, unset columns are left out. Zero columns still
    /// produce `INSERT INTO t() VALUES ()`. Fails the build when no entity is
    /// bound.
    pub fn write_insert(&mut self, only_assigned: bool) -> &mut Self {
        let Some(entity) = self.entity() else {
            self.set_error("insert requires a bound entity");
            return self;
        };
        let registry = self.registry();
        let exclude: Vec<&str> = registry
            .columns()
            .iter()
            .filter(|column| {
                (only_assigned || column.is_auto_increment()) && registry.read(entity, column).is_null()
            })
            .map(|column| column.name())
            .collect();

        let table = self.table();
        self.write("INSERT INTO ").write(table);
        let mut values = Vec::new();
        self.each_column(entity, Separator::fix("(", ",", "", true), &exclude, |b, _, column, value| {
            b.write(column.name());
            values.push(value);
        });
        self.write(") VALUES (");
        for (i, value) in values.into_iter().enumerate() {
            if i > 0 {
                self.write(",");
            }
            self.bind(value);
        }
        self.write(")")
    }

    /// Multi-row `INSERT` over every bound entity.
    ///
    /// The column list is every registered column; the auto-increment column
    /// is included only when every bound entity has it set. Unset values are
    /// bound as `NULL`. Skips the build when no entity is bound.
    pub fn write_insert_batch(&mut self) -> &mut Self {
        if self.entities().iter().all(Option::is_none) {
            self.set_ok(false);
            return self;
        }
        let registry = self.registry();
        let exclude: Vec<&str> = if registry.auto_assigned(self.entities().iter().flatten().copied()) {
            Vec::new()
        } else {
            registry.auto_columns().iter().map(String::as_str).collect()
        };
        let names: Vec<&str> = registry
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| !exclude.contains(name))
            .collect();

        let table = self.table();
        self.write("INSERT INTO ")
            .write(table)
            .write("(")
            .write(&names.join(","))
            .write(")");
        self.each_entity(Separator::fix(" VALUES ", ",", "", false), None, |b, _, _, entity| {
            b.write("(");
            b.each_column(entity, COMMA, &exclude, |b, _, _, value| {
                b.bind(value);
            });
            b.write(")");
        });
        self
    }

    /// ` SET a=?,b=?` over the assigned columns of the primary entity.
    ///
    /// Auto-increment columns and `exclude` are left out. Skips the build
    /// when nothing is assigned; fails it when no entity is bound.
    pub fn write_update_set(&mut self, exclude: &[&str]) -> &mut Self {
        let Some(entity) = self.entity() else {
            self.set_error("update requires a bound entity");
            return self;
        };
        let registry = self.registry();
        let mut excluded: Vec<&str> = exclude.to_vec();
        excluded.extend(registry.auto_columns().iter().map(String::as_str));

        let assigned = self.columns(true, &excluded);
        if assigned.is_empty() {
            self.set_ok(false);
            return self;
        }
        self.repeat(assigned.len(), Separator::fix(" SET ", ",", "", false), None, |b, _, i| {
            let name = assigned[i];
            let value = registry
                .column(name)
                .map_or(Value::Null, |column| registry.read(entity, column));
            b.write(name).write("=");
            b.bind(value);
        });
        self
    }

    /// Single-statement update of every bound entity, keyed by `key`.
    ///
    /// ```text
    /// UPDATE t SET a=CASE id WHEN ? THEN ? WHEN ? THEN ? ELSE a END,... WHERE id IN (?,?)
    /// ```
    ///
    /// Each entity contributes its assigned columns; entities with an unset
    /// key are left out. Auto-increment columns are never set. Skips the
    /// build when there is nothing to update; fails it when `key` is not a
    /// registered column.
    pub fn write_update_batch(&mut self, key: &str) -> &mut Self {
        let registry = self.registry();
        let Some(key_column) = registry.column(key) else {
            self.set_error(format!("unknown key column `{key}`"));
            return self;
        };
        let mut excluded: Vec<&str> = vec![key_column.name()];
        excluded.extend(registry.auto_columns().iter().map(String::as_str));

        let rows: Vec<(Value, Vec<(&str, Value)>)> = self
            .entities()
            .iter()
            .flatten()
            .filter_map(|entity| {
                let key_value = registry.read(entity, key_column);
                (!key_value.is_null()).then(|| (key_value, registry.column_values(entity, true, &excluded)))
            })
            .collect();
        let columns: Vec<&str> = registry
            .column_names()
            .iter()
            .map(String::as_str)
            .filter(|name| rows.iter().any(|(_, values)| values.iter().any(|(c, _)| c == name)))
            .collect();
        if columns.is_empty() {
            self.set_ok(false);
            return self;
        }

        let table = self.table();
        self.write("UPDATE ").write(table);
        self.repeat(columns.len(), Separator::fix(" SET ", ",", "", false), None, |b, _, i| {
            let column = columns[i];
            b.write(column).write("=CASE ").write(key);
            for (key_value, values) in &rows {
                if let Some((_, value)) = values.iter().find(|(c, _)| *c == column) {
                    b.write(" WHEN ");
                    b.bind(key_value.clone());
                    b.write(" THEN ");
                    b.bind(value.clone());
                }
            }
            b.write(" ELSE ").write(column).write(" END");
        });
        self.write(" WHERE ").write(key);
        self.repeat(rows.len(), Separator::fix(" IN (", ",", ")", false), None, |b, _, i| {
            b.bind(rows[i].0.clone());
        });
        self
    }

    /// ` WHERE <column>=<placeholder>`.
    pub fn write_where_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.write(" WHERE ").write(column).write("=");
        self.bind(value)
    }

    /// ` RETURNING <auto column>`. Writes nothing without an auto-increment
    /// column.
    pub fn write_returning(&mut self) -> &mut Self {
        if let Some(column) = self.registry().auto_column() {
            self.write(" RETURNING ").write(column.name());
        }
        self
    }
}
