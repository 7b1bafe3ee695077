// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Binding between result rows and entities.
//!
//! # Scan Plans
//!
//! A [`ScanPlan`] is computed once per result set from its column names.
//! Result order is authoritative: the plan has one [`ScanTarget`] per result
//! column, in result order, whatever the registry order is.
//!
//! | Result column | Target | Effect |
//! |---------------|--------|--------|
//! | unknown | [`ScanTarget::Discard`] | value dropped |
//! | plain field | [`ScanTarget::Field`] | stored during the scan |
//! | converted field | [`ScanTarget::Converted`] | deferred to a [`PostScanAction`] |
//!
//! Deferred actions run in result order once the whole row is scanned.
//!
//! ```rust,ignore
//! let plan = registry.bind_scan_targets(&rows.columns);
//! for row in rows.rows {
//!     users.push(plan.scan_row(row)?);
//! }
//! ```

use crate::{
    error::BindError,
    registry::{ColumnDescriptor, Registry},
    value::{ColumnType, Value}
};

/// Where one result column goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTarget {
    /// Directly into the field behind registry column `position`.
    Field {
        /// Position in [`Registry::columns`].
        position: usize
    },
    /// Through the field's converter after the row is scanned.
    Converted {
        /// Position in [`Registry::columns`].
        position: usize,
        /// Intermediate storage type.
        storage:  ColumnType
    },
    /// Dropped.
    Discard
}

/// Converter application deferred until the row is fully scanned.
#[derive(Debug, Clone, PartialEq)]
pub struct PostScanAction {
    position: usize,
    value:    Value
}

/// Per-result-set binding plan.
#[derive(Debug)]
pub struct ScanPlan<'r, E> {
    registry: &'r Registry<E>,
    targets:  Vec<ScanTarget>
}

impl<E> Registry<E> {
    /// Plan how to bind rows with the given result columns.
    pub fn bind_scan_targets<S: AsRef<str>>(&self, columns: &[S]) -> ScanPlan<'_, E> {
        let targets = columns
            .iter()
            .map(|name| {
                let Some(position) = self.position(name.as_ref()) else {
                    return ScanTarget::Discard;
                };
                match self.columns()[position].converter() {
                    Some(storage) => ScanTarget::Converted {
                        position,
                        storage
                    },
                    None => ScanTarget::Field {
                        position
                    }
                }
            })
            .collect();
        ScanPlan {
            registry: self,
            targets
        }
    }

    /// Column/value pairs of an entity, in registry order.
    ///
    /// Columns listed in `exclude` are left out, and with `only_assigned` so
    /// are unset ones.
    pub fn column_values(&self, entity: &E, only_assigned: bool, exclude: &[&str]) -> Vec<(&str, Value)> {
        self.columns()
            .iter()
            .filter(|column| !exclude.contains(&column.name()))
            .map(|column| (column.name(), self.read(entity, column)))
            .filter(|(_, value)| !only_assigned || !value.is_null())
            .collect()
    }
}

impl<E> ScanPlan<'_, E> {
    /// Targets in result-column order.
    #[must_use]
    pub fn targets(&self) -> &[ScanTarget] {
        &self.targets
    }

    /// Number of result columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the result set has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Scan one row, storing plain fields and returning deferred converter
    /// actions in result order.
    ///
    /// # Errors
    ///
    /// [`BindError::ColumnCount`] when the row width differs from the plan,
    /// [`BindError::Value`] when a value does not fit its field.
    pub fn scan(&self, entity: &mut E, row: Vec<Value>) -> Result<Vec<PostScanAction>, BindError> {
        if row.len() != self.targets.len() {
            return Err(BindError::ColumnCount {
                expected: self.targets.len(),
                found:    row.len()
            });
        }
        let mut actions = Vec::new();
        for (target, value) in self.targets.iter().zip(row) {
            match *target {
                ScanTarget::Field {
                    position
                } => self.registry.write(entity, self.column(position), value)?,
                ScanTarget::Converted {
                    position, ..
                } => actions.push(PostScanAction {
                    position,
                    value
                }),
                ScanTarget::Discard => {}
            }
        }
        Ok(actions)
    }

    /// Run deferred converter actions in order.
    ///
    /// # Errors
    ///
    /// [`BindError::Value`] when a value is not of the converter's storage
    /// type.
    pub fn apply(&self, entity: &mut E, actions: Vec<PostScanAction>) -> Result<(), BindError> {
        for action in actions {
            self.registry
                .write(entity, self.column(action.position), action.value)?;
        }
        Ok(())
    }

    /// Scan a row into an existing entity.
    ///
    /// # Errors
    ///
    /// See [`ScanPlan::scan`].
    pub fn scan_into(&self, entity: &mut E, row: Vec<Value>) -> Result<(), BindError> {
        let actions = self.scan(entity, row)?;
        self.apply(entity, actions)
    }

    /// Scan a row into a fresh entity.
    ///
    /// # Errors
    ///
    /// See [`ScanPlan::scan`].
    pub fn scan_row(&self, row: Vec<Value>) -> Result<E, BindError>
    where
        E: Default
    {
        let mut entity = E::default();
        self.scan_into(&mut entity, row)?;
        Ok(entity)
    }

    fn column(&self, position: usize) -> &ColumnDescriptor {
        &self.registry.columns()[position]
    }
}
