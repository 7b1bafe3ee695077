// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Column registry.
//!
//! A [`Registry`] is compiled once per entity type from its field accessor
//! table and never changes afterwards. It answers which columns exist, in
//! which order, which field backs each column, and how auto-increment ids are
//! written back.
//!
//! # Registration Rules
//!
//! Fields are visited in declaration order:
//!
//! 1. Embedded fields are skipped.
//! 2. Private fields fail with [`RegistryError::UnexportedField`], or are
//!    skipped when invalid fields are allowed.
//! 3. The column name is the tag's `column=` value, else the mapped field
//!    name. A field with neither is skipped silently; this is how transient
//!    fields stay out of SQL.
//! 4. Unsupported types fail with [`RegistryError::UnsupportedFieldKind`] and
//!    converters storing a slice fail with
//!    [`RegistryError::InvalidConverter`], or are skipped when invalid fields
//!    are allowed.
//! 5. `auto` tags are honored only when the column type has an [`IdKind`];
//!    on any other type the tag is ignored.
//!
//! Column order is the declaration order of the registered fields.

use std::{collections::HashMap, fmt};

use tracing::trace;

use crate::{
    entity::Entity,
    error::{BindError, RegistryError},
    field::{FieldDef, FieldKind},
    mapper::NameMapper,
    tag::{DEFAULT_AUTO_STEP, Tag},
    value::{ColumnType, Kind, Value}
};

/// Compiled metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    name:        String,
    field_index: usize,
    column_type: ColumnType,
    converted:   bool,
    auto_step:   Option<i64>
}

impl ColumnDescriptor {
    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the backing field in the entity's accessor table.
    #[must_use]
    pub const fn field_index(&self) -> usize {
        self.field_index
    }

    /// Storage type of the column.
    #[must_use]
    pub const fn column_type(&self) -> ColumnType {
        self.column_type
    }

    /// Converter storage type, when the field goes through [`Convert`](crate::Convert).
    #[must_use]
    pub const fn converter(&self) -> Option<ColumnType> {
        if self.converted {
            Some(self.column_type)
        } else {
            None
        }
    }

    /// Whether the column is an honored auto-increment column.
    #[must_use]
    pub const fn is_auto_increment(&self) -> bool {
        self.auto_step.is_some()
    }

    /// Auto-increment step, if the column is auto-increment.
    #[must_use]
    pub const fn auto_step(&self) -> Option<i64> {
        self.auto_step
    }
}

/// Native representation of an auto-increment identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// `i8`.
    I8,
    /// `i16`.
    I16,
    /// `i32`.
    I32,
    /// `i64`.
    I64,
    /// `u8`.
    U8,
    /// `u16`.
    U16,
    /// `u32`.
    U32,
    /// `u64`.
    U64,
    /// `f32`.
    F32,
    /// `f64`.
    F64,
    /// Decimal string.
    String
}

impl IdKind {
    /// Identifier kind for a column type, if ids can be written into it.
    #[must_use]
    pub const fn from_column_type(ty: ColumnType) -> Option<Self> {
        match ty {
            ColumnType::Scalar(kind) => match kind {
                Kind::I8 => Some(Self::I8),
                Kind::I16 => Some(Self::I16),
                Kind::I32 => Some(Self::I32),
                Kind::I64 => Some(Self::I64),
                Kind::U8 => Some(Self::U8),
                Kind::U16 => Some(Self::U16),
                Kind::U32 => Some(Self::U32),
                Kind::U64 => Some(Self::U64),
                Kind::F32 => Some(Self::F32),
                Kind::F64 => Some(Self::F64),
                Kind::String => Some(Self::String),
                Kind::Bool | Kind::Timestamp => None
            },
            ColumnType::Slice(_) => None
        }
    }

    /// Convert a raw 64-bit id.
    ///
    /// Narrower integer kinds truncate; this is defined behavior, not an
    /// error. Strings get the base-10 representation.
    #[must_use]
    pub fn convert(self, id: i64) -> Value {
        match self {
            Self::I8 => Value::I8(id as i8),
            Self::I16 => Value::I16(id as i16),
            Self::I32 => Value::I32(id as i32),
            Self::I64 => Value::I64(id),
            Self::U8 => Value::U8(id as u8),
            Self::U16 => Value::U16(id as u16),
            Self::U32 => Value::U32(id as u32),
            Self::U64 => Value::U64(id as u64),
            Self::F32 => Value::F32(id as f32),
            Self::F64 => Value::F64(id as f64),
            Self::String => Value::String(id.to_string())
        }
    }
}

/// Immutable column registry for entity type `E`.
///
/// `Registry` is `Send + Sync` and is shared by reference; nothing mutates it
/// after [`Registry::register`] returns.
pub struct Registry<E> {
    fields:       Vec<FieldDef<E>>,
    columns:      Vec<ColumnDescriptor>,
    names:        Vec<String>,
    joined:       String,
    positions:    HashMap<String, usize>,
    auto_columns: Vec<String>,
    auto:         Option<(usize, IdKind)>
}

impl<E: Entity> Registry<E> {
    /// Register `E` from its accessor table.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] for invalid fields unless `allow_invalid`
    /// is set, in which case those fields are skipped.
    pub fn register(mapper: Option<&NameMapper>, allow_invalid: bool) -> Result<Self, RegistryError> {
        Self::from_fields(E::fields(), mapper, allow_invalid)
    }
}

impl<E> Registry<E> {
    /// Register an explicit accessor table.
    ///
    /// # Errors
    ///
    /// See [`Registry::register`].
    pub fn from_fields(
        fields: Vec<FieldDef<E>>,
        mapper: Option<&NameMapper>,
        allow_invalid: bool
    ) -> Result<Self, RegistryError> {
        let mut columns: Vec<ColumnDescriptor> = Vec::new();
        let mut positions = HashMap::new();
        let mut has_auto = false;

        for (field_index, field) in fields.iter().enumerate() {
            if field.is_embedded() {
                continue;
            }

            if !field.is_exported() {
                if allow_invalid {
                    continue;
                }
                return Err(RegistryError::UnexportedField {
                    field: field.name()
                });
            }

            let tag = field.raw_tag().map(Tag::parse).unwrap_or_default();
            let name = tag
                .column
                .clone()
                .or_else(|| mapper.map(|m| m.map(field.name())))
                .filter(|name| !name.is_empty());
            let Some(name) = name else {
                trace!(field = field.name(), "field has no column name, skipped");
                continue;
            };

            let (column_type, converted) = match field.kind() {
                FieldKind::Plain(ty) => (ty, false),
                FieldKind::Converted(ty) if !ty.is_slice() => (ty, true),
                FieldKind::Converted(storage) => {
                    if allow_invalid {
                        continue;
                    }
                    return Err(RegistryError::InvalidConverter {
                        field: field.name(),
                        storage
                    });
                }
                FieldKind::Unsupported(type_name) => {
                    if allow_invalid {
                        continue;
                    }
                    return Err(RegistryError::UnsupportedFieldKind {
                        field: field.name(),
                        type_name
                    });
                }
            };

            if let Some(&position) = positions.get(&name) {
                let first: &ColumnDescriptor = &columns[position];
                return Err(RegistryError::DuplicateColumn {
                    column: name,
                    first:  fields[first.field_index].name(),
                    second: field.name()
                });
            }

            // Only the first auto-tagged id column keeps its step; later ones
            // register as plain columns.
            let auto_step = tag
                .auto_step
                .filter(|_| !has_auto && IdKind::from_column_type(column_type).is_some());
            has_auto |= auto_step.is_some();

            positions.insert(name.clone(), columns.len());
            columns.push(ColumnDescriptor {
                name,
                field_index,
                column_type,
                converted,
                auto_step
            });
        }

        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let joined = names.join(",");
        let auto_columns: Vec<String> = columns
            .iter()
            .filter(|c| c.is_auto_increment())
            .map(|c| c.name.clone())
            .collect();
        let auto = columns.iter().enumerate().find_map(|(position, c)| {
            c.auto_step?;
            IdKind::from_column_type(c.column_type).map(|kind| (position, kind))
        });

        trace!(
            columns = %joined,
            auto = ?auto_columns,
            "registry compiled"
        );

        Ok(Self {
            fields,
            columns,
            names,
            joined,
            positions,
            auto_columns,
            auto
        })
    }

    /// Registered columns in order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Registered column names in order.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Column names joined with `,`.
    #[must_use]
    pub fn joined_columns(&self) -> &str {
        &self.joined
    }

    /// Number of registered columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.positions.get(name).map(|&position| &self.columns[position])
    }

    /// Position of a column in [`Registry::columns`].
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Field index backing a column.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.column(name).map(ColumnDescriptor::field_index)
    }

    /// Converter storage type of a column, if it has a converter.
    #[must_use]
    pub fn converter(&self, name: &str) -> Option<ColumnType> {
        self.column(name).and_then(ColumnDescriptor::converter)
    }

    /// Accessor table entry by field index.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&FieldDef<E>> {
        self.fields.get(index)
    }

    /// Name of the honored auto-increment column, if any; at most one entry.
    #[must_use]
    pub fn auto_columns(&self) -> &[String] {
        &self.auto_columns
    }

    /// The auto-increment column ids are propagated into; the first one
    /// declared.
    #[must_use]
    pub fn auto_column(&self) -> Option<&ColumnDescriptor> {
        self.auto.map(|(position, _)| &self.columns[position])
    }

    /// Step between consecutive generated ids.
    #[must_use]
    pub fn auto_step(&self) -> i64 {
        self.auto_column()
            .and_then(ColumnDescriptor::auto_step)
            .unwrap_or(DEFAULT_AUTO_STEP)
    }

    /// Native kind of the auto-increment column.
    #[must_use]
    pub fn id_kind(&self) -> Option<IdKind> {
        self.auto.map(|(_, kind)| kind)
    }

    /// Whether `name` is an auto-increment column.
    #[must_use]
    pub fn is_auto_column(&self, name: &str) -> bool {
        self.auto_columns.iter().any(|c| c == name)
    }

    /// Read a column's current value from an entity.
    pub fn read(&self, entity: &E, column: &ColumnDescriptor) -> Value {
        self.fields[column.field_index].read(entity)
    }

    /// Store a value into a column's field.
    ///
    /// # Errors
    ///
    /// Returns [`BindError::Value`] when the value does not fit the field.
    pub fn write(&self, entity: &mut E, column: &ColumnDescriptor, value: Value) -> Result<(), BindError> {
        self.fields[column.field_index]
            .write(entity, value)
            .map_err(|source| BindError::Value {
                column: column.name.clone(),
                source
            })
    }
}

impl<E> fmt::Debug for Registry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("columns", &self.columns)
            .field("auto_columns", &self.auto_columns)
            .finish_non_exhaustive()
    }
}
