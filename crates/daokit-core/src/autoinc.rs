// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Auto-increment resolver.
//!
//! Writes database-generated identifiers back into the entities that were
//! inserted.
//!
//! # Protocols
//!
//! | Protocol | Driver reports | Entity `i` receives |
//! |----------|----------------|---------------------|
//! | [`IdProtocol::FirstId`] | first generated id | `first + i * step` |
//! | [`IdProtocol::LastId`] | last generated id | `last - (count - 1 - i) * step` |
//! | [`IdProtocol::Returning`] | one row per inserted entity | row `i` |
//!
//! `i` counts bound entities only; `None` slots in a sparse batch neither
//! consume an id nor a returned row. For a single entity `FirstId(x)` and
//! `LastId(x)` assign the same value.
//!
//! Ids are converted to the field's native type with
//! [`IdKind::convert`](crate::IdKind::convert); narrower integer fields
//! truncate.

use crate::{error::BindError, executor::Rows, registry::Registry};

/// How generated identifiers are learned after an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum IdProtocol {
    /// The driver reports the first id of a multi-row insert.
    #[default]
    FirstId,
    /// The driver reports the last id of a multi-row insert.
    LastId,
    /// The statement returns the generated ids as rows.
    Returning
}

/// Identifier reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedId {
    /// First id of the statement.
    First(i64),
    /// Last id of the statement.
    Last(i64)
}

impl GeneratedId {
    /// Ids for `count` rows inserted in order.
    #[must_use]
    pub fn sequence(self, step: i64, count: usize) -> Vec<i64> {
        (0..count)
            .map(|i| {
                let i = i as i64;
                match self {
                    Self::First(first) => first.wrapping_add(i.wrapping_mul(step)),
                    Self::Last(last) => {
                        let back = (count as i64).wrapping_sub(1).wrapping_sub(i);
                        last.wrapping_sub(back.wrapping_mul(step))
                    }
                }
            })
            .collect()
    }
}

impl<E> Registry<E> {
    /// Whether every entity already carries a value in the auto-increment
    /// column. `false` without an auto column or without entities.
    #[must_use]
    pub fn auto_assigned<'e, I>(&self, entities: I) -> bool
    where
        I: IntoIterator<Item = &'e E>,
        E: 'e
    {
        let Some(column) = self.auto_column() else {
            return false;
        };
        let mut seen = false;
        for entity in entities {
            if self.read(entity, column).is_null() {
                return false;
            }
            seen = true;
        }
        seen
    }

    /// Assign ids derived from one driver-reported id.
    ///
    /// Returns the number of entities updated; zero when the entity has no
    /// auto-increment column.
    ///
    /// # Errors
    ///
    /// [`BindError::Value`] when the converted id does not fit the field.
    pub fn assign_generated_ids<'e, I>(&self, entities: I, generated: GeneratedId) -> Result<usize, BindError>
    where
        I: IntoIterator<Item = Option<&'e mut E>>,
        E: 'e
    {
        let (Some(column), Some(kind)) = (self.auto_column(), self.id_kind()) else {
            return Ok(0);
        };
        let targets: Vec<&mut E> = entities.into_iter().flatten().collect();
        let count = targets.len();
        let ids = generated.sequence(self.auto_step(), count);
        for (entity, id) in targets.into_iter().zip(ids) {
            self.write(entity, column, kind.convert(id))?;
        }
        Ok(count)
    }

    /// Scan returned id rows into entities in input order.
    ///
    /// Rows beyond the entity count are ignored. Returns the number of
    /// entities updated.
    ///
    /// # Errors
    ///
    /// [`BindError`] when a row cannot be bound.
    pub fn assign_returned_rows<'e, I>(&self, entities: I, rows: &Rows) -> Result<usize, BindError>
    where
        I: IntoIterator<Item = Option<&'e mut E>>,
        E: 'e
    {
        let plan = self.bind_scan_targets(rows.columns.as_slice());
        let mut assigned = 0;
        for (entity, row) in entities.into_iter().flatten().zip(&rows.rows) {
            plan.scan_into(entity, row.clone())?;
            assigned += 1;
        }
        Ok(assigned)
    }
}
