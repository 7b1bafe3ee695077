// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Storage value model.
//!
//! Everything that crosses the boundary between an entity and the driver is a
//! [`Value`]: statement arguments, result cells and auto-increment ids. The
//! set of types a field may hold is closed and described by [`Kind`] and
//! [`ColumnType`].
//!
//! # Supported Types
//!
//! | Kind | Rust type | Slice form |
//! |------|-----------|------------|
//! | `Bool` | `bool` | `Vec<bool>` |
//! | `I8`..`I64` | `i8`..`i64` | `Vec<i8>`..`Vec<i64>` |
//! | `U8`..`U64` | `u8`..`u64` | `Vec<u8>`..`Vec<u64>` |
//! | `F32`, `F64` | `f32`, `f64` | `Vec<f32>`, `Vec<f64>` |
//! | `String` | `String` | `Vec<String>` |
//! | `Timestamp` | `DateTime<Utc>` | `Vec<DateTime<Utc>>` |
//!
//! # Coercion
//!
//! Drivers rarely report the exact width a field was declared with, so
//! reading a value back is lenient where it is lossless to be:
//!
//! - any integer converts to any other integer width if it fits
//! - integers and `f32` widen into floating point fields
//! - `bool` fields accept the integers `0` and `1`

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Primitive kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// `bool`.
    Bool,
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
    /// `String`.
    String,
    /// `DateTime<Utc>`.
    Timestamp
}

impl Kind {
    /// Rust spelling of the kind, used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "String",
            Self::Timestamp => "DateTime<Utc>"
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a column: a single primitive or a slice of primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// A single value.
    Scalar(Kind),
    /// A list of values of one kind.
    Slice(Kind)
}

impl ColumnType {
    /// Element kind, regardless of shape.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Scalar(kind) | Self::Slice(kind) => *kind
        }
    }

    /// Whether this is the slice shape.
    #[must_use]
    pub const fn is_slice(&self) -> bool {
        matches!(self, Self::Slice(_))
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::Slice(kind) => write!(f, "Vec<{kind}>")
        }
    }
}

/// A single storage value.
///
/// `Null` stands for an unset optional field on the way out and for SQL
/// `NULL` on the way in.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 8-bit signed integer.
    I8(i8),
    /// 16-bit signed integer.
    I16(i16),
    /// 32-bit signed integer.
    I32(i32),
    /// 64-bit signed integer.
    I64(i64),
    /// 8-bit unsigned integer.
    U8(u8),
    /// 16-bit unsigned integer.
    U16(u16),
    /// 32-bit unsigned integer.
    U32(u32),
    /// 64-bit unsigned integer.
    U64(u64),
    /// Single precision float.
    F32(f32),
    /// Double precision float.
    F64(f64),
    /// Text.
    String(String),
    /// UTC timestamp.
    Timestamp(DateTime<Utc>),
    /// Slice of values, all of one kind.
    List(Vec<Value>)
}

impl Value {
    /// Check for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::String(_) => "String",
            Self::Timestamp(_) => "DateTime<Utc>",
            Self::List(_) => "list"
        }
    }

    /// Read any integer variant as `i64`, if it fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().and_then(|wide| i64::try_from(wide).ok())
    }

    fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::I64(v) => Some(v.into()),
            Self::U8(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::U64(v) => Some(v.into()),
            _ => None
        }
    }

    fn as_float(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => self.as_integer().map(|wide| wide as f64)
        }
    }
}

/// Failure to read a [`Value`] into a Rust type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// The value variant cannot represent the target type at all.
    #[error("cannot read {found} as {expected}")]
    TypeMismatch {
        /// Type the field expects.
        expected: ColumnType,
        /// Variant that was supplied.
        found:    &'static str
    },

    /// The value has the right shape but does not fit the target width.
    #[error("value {value} is out of range for {expected}")]
    OutOfRange {
        /// Kind the field expects.
        expected: Kind,
        /// Rendered offending value.
        value:    String
    }
}

fn mismatch(expected: ColumnType, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        found: found.type_name()
    }
}

/// A Rust type that maps onto exactly one [`ColumnType`].
///
/// Implemented for every supported primitive and for `Vec` of each of them.
/// Entity fields hold `Option<S>` for some `S: Storable`.
pub trait Storable: Sized + Clone + Send + Sync + 'static {
    /// Column type this Rust type is stored as.
    const TYPE: ColumnType;

    /// Convert into a storage value.
    fn into_value(self) -> Value;

    /// Read back from a storage value.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError`] when the value cannot represent `Self`.
    /// `Null` is always a mismatch; optional handling happens at the field.
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

macro_rules! storable_integer {
    ($($ty:ty => $kind:ident),+ $(,)?) => {$(
        impl Storable for $ty {
            const TYPE: ColumnType = ColumnType::Scalar(Kind::$kind);

            fn into_value(self) -> Value {
                Value::$kind(self)
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                let wide = value.as_integer().ok_or_else(|| mismatch(Self::TYPE, &value))?;
                <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                    expected: Kind::$kind,
                    value:    wide.to_string()
                })
            }
        }
    )+};
}

storable_integer!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64
);

impl Storable for f32 {
    const TYPE: ColumnType = ColumnType::Scalar(Kind::F32);

    fn into_value(self) -> Value {
        Value::F32(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value
            .as_float()
            .map(|v| v as f32)
            .ok_or_else(|| mismatch(Self::TYPE, &value))
    }
}

impl Storable for f64 {
    const TYPE: ColumnType = ColumnType::Scalar(Kind::F64);

    fn into_value(self) -> Value {
        Value::F64(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        value.as_float().ok_or_else(|| mismatch(Self::TYPE, &value))
    }
}

impl Storable for bool {
    const TYPE: ColumnType = ColumnType::Scalar(Kind::Bool);

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => match other.as_integer() {
                Some(0) => Ok(false),
                Some(1) => Ok(true),
                Some(wide) => Err(ValueError::OutOfRange {
                    expected: Kind::Bool,
                    value:    wide.to_string()
                }),
                None => Err(mismatch(Self::TYPE, &other))
            }
        }
    }
}

impl Storable for String {
    const TYPE: ColumnType = ColumnType::Scalar(Kind::String);

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::String(v) => Ok(v),
            other => Err(mismatch(Self::TYPE, &other))
        }
    }
}

impl Storable for DateTime<Utc> {
    const TYPE: ColumnType = ColumnType::Scalar(Kind::Timestamp);

    fn into_value(self) -> Value {
        Value::Timestamp(self)
    }

    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Timestamp(v) => Ok(v),
            other => Err(mismatch(Self::TYPE, &other))
        }
    }
}

macro_rules! storable_slice {
    ($($ty:ty),+ $(,)?) => {$(
        impl Storable for Vec<$ty> {
            const TYPE: ColumnType = ColumnType::Slice(<$ty as Storable>::TYPE.kind());

            fn into_value(self) -> Value {
                Value::List(self.into_iter().map(Storable::into_value).collect())
            }

            fn from_value(value: Value) -> Result<Self, ValueError> {
                match value {
                    Value::List(items) => items.into_iter().map(<$ty>::from_value).collect(),
                    other => Err(mismatch(Self::TYPE, &other))
                }
            }
        }
    )+};
}

storable_slice!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    DateTime<Utc>
);

macro_rules! value_from {
    ($($ty:ty),+ $(,)?) => {$(
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Storable::into_value(v)
            }
        }
    )+};
}

value_from!(
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    f32,
    f64,
    String,
    DateTime<Utc>
);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}
