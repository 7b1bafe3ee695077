// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Field accessor table.
//!
//! An entity describes its fields as a list of [`FieldDef`]s in declaration
//! order. Each definition carries the field's source name, its optional tag,
//! how its type maps to storage, and a getter/setter pair working in
//! [`Value`]s. The registry indexes columns into this list, so the position
//! of a definition is its field index.
//!
//! The derive macro emits this table; writing it by hand looks like:
//!
//! ```rust
//! use daokit_core::{Entity, FieldDef};
//!
//! #[derive(Debug, Default)]
//! struct User {
//!     id:   Option<i64>,
//!     name: Option<String>
//! }
//!
//! impl Entity for User {
//!     fn table() -> &'static str {
//!         "users"
//!     }
//!
//!     fn fields() -> Vec<FieldDef<Self>> {
//!         vec![
//!             FieldDef::storable("id", |u: &Self| &u.id, |u: &mut Self| &mut u.id).tag("auto"),
//!             FieldDef::storable("name", |u: &Self| &u.name, |u: &mut Self| &mut u.name),
//!         ]
//!     }
//! }
//! ```

use std::fmt;

use crate::{
    convert::Convert,
    value::{ColumnType, Storable, Value, ValueError}
};

type Getter<E> = Box<dyn Fn(&E) -> Value + Send + Sync>;
type Setter<E> = Box<dyn Fn(&mut E, Value) -> Result<(), ValueError> + Send + Sync>;

/// How a field's type maps to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// `Option<S>` with `S: Storable`.
    Plain(ColumnType),
    /// `Option<C>` with `C: Convert`; the column type is the storage type.
    Converted(ColumnType),
    /// Anything else; holds the type as written in the source.
    Unsupported(&'static str)
}

impl FieldKind {
    /// Column type, if the field is storable at all.
    #[must_use]
    pub const fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Plain(ty) | Self::Converted(ty) => Some(*ty),
            Self::Unsupported(_) => None
        }
    }
}

struct Access<E> {
    get: Getter<E>,
    set: Setter<E>
}

/// One field of an entity.
pub struct FieldDef<E> {
    name:     &'static str,
    tag:      Option<&'static str>,
    exported: bool,
    embedded: bool,
    kind:     FieldKind,
    access:   Option<Access<E>>
}

impl<E: 'static> FieldDef<E> {
    /// Field holding `Option<S>` for a storable `S`.
    ///
    /// `None` reads as [`Value::Null`]; writing `Null` resets the field.
    pub fn storable<S: Storable>(
        name: &'static str,
        get: fn(&E) -> &Option<S>,
        get_mut: fn(&mut E) -> &mut Option<S>
    ) -> Self {
        let access = Access {
            get: Box::new(move |entity: &E| get(entity).clone().map_or(Value::Null, S::into_value)),
            set: Box::new(move |entity: &mut E, value: Value| {
                *get_mut(entity) = if value.is_null() {
                    None
                } else {
                    Some(S::from_value(value)?)
                };
                Ok(())
            })
        };
        Self::new(name, FieldKind::Plain(S::TYPE), Some(access))
    }

    /// Field holding `Option<C>` for a type with a [`Convert`] capability.
    ///
    /// Writing `Null`, or a value the converter maps to `None`, leaves the
    /// field untouched.
    pub fn converted<C: Convert>(
        name: &'static str,
        get: fn(&E) -> &Option<C>,
        get_mut: fn(&mut E) -> &mut Option<C>
    ) -> Self {
        let access = Access {
            get: Box::new(move |entity: &E| {
                get(entity)
                    .as_ref()
                    .map_or(Value::Null, |field| field.to_storage_value().into_value())
            }),
            set: Box::new(move |entity: &mut E, value: Value| {
                if value.is_null() {
                    return Ok(());
                }
                let stored = C::Storage::from_value(value)?;
                if let Some(field) = C::from_storage_value(stored) {
                    *get_mut(entity) = Some(field);
                }
                Ok(())
            })
        };
        Self::new(name, FieldKind::Converted(C::Storage::TYPE), Some(access))
    }

    /// Field whose type cannot be stored.
    pub fn unsupported(name: &'static str, type_name: &'static str) -> Self {
        Self::new(name, FieldKind::Unsupported(type_name), None)
    }

    /// Embedded (flattened) field. Never mapped to a column.
    pub fn embedded(name: &'static str, type_name: &'static str) -> Self {
        let mut def = Self::unsupported(name, type_name);
        def.embedded = true;
        def
    }

    fn new(name: &'static str, kind: FieldKind, access: Option<Access<E>>) -> Self {
        Self {
            name,
            tag: None,
            exported: true,
            embedded: false,
            kind,
            access
        }
    }
}

impl<E> FieldDef<E> {
    /// Attach a raw tag, e.g. `"column=user_id;auto"`.
    #[must_use]
    pub fn tag(mut self, tag: &'static str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Mark the field as not part of the entity's public surface.
    #[must_use]
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Source name of the field.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw tag, if any.
    #[must_use]
    pub const fn raw_tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// Whether the field is public.
    #[must_use]
    pub const fn is_exported(&self) -> bool {
        self.exported
    }

    /// Whether the field is embedded.
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Storage mapping of the field.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read the field. Unsupported fields read as `Null`.
    pub fn read(&self, entity: &E) -> Value {
        self.access
            .as_ref()
            .map_or(Value::Null, |access| (access.get)(entity))
    }

    /// Write the field. Unsupported fields ignore the write.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when `value` cannot be read as the field type.
    pub fn write(&self, entity: &mut E, value: Value) -> Result<(), ValueError> {
        match &self.access {
            Some(access) => (access.set)(entity, value),
            None => Ok(())
        }
    }
}

impl<E> fmt::Debug for FieldDef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("exported", &self.exported)
            .field("embedded", &self.embedded)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
