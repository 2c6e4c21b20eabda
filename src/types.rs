#![forbid(unsafe_code)]

//! Core value types for fieldrules
//!
//! Checkers never see a record's fields directly. They see a `Value`
//! snapshot, and clippers write back through the `FieldValue` trait, which
//! is implemented for the scalar types a record field usually has.

use crate::error::ValueError;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Declared kind of a field, independent of its current content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Bool,
    Int,
    Uint,
    Float,
    Str,
    Record,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Uint => "uint",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Record => "record",
        }
    }

    /// Parses text into a value of this kind
    ///
    /// Used by the `default` clipper to turn its parameter into something
    /// the field can hold.
    pub fn parse(&self, input: &str) -> Result<Value, ValueError> {
        let parse_err = || ValueError::Parse {
            input: input.to_string(),
            kind: self.as_str(),
        };
        let trimmed = input.trim();
        match self {
            ValueKind::Bool => trimmed.parse().map(Value::Bool).map_err(|_| parse_err()),
            ValueKind::Int => trimmed.parse().map(Value::Int).map_err(|_| parse_err()),
            ValueKind::Uint => trimmed.parse().map(Value::Uint).map_err(|_| parse_err()),
            ValueKind::Float => trimmed.parse().map(Value::Float).map_err(|_| parse_err()),
            ValueKind::Str => Ok(Value::Str(input.to_string())),
            ValueKind::Record => Err(parse_err()),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a field value as seen by checkers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Absent value (an empty `Option`)
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// A present nested record; its own fields are validated separately
    Record,
}

impl Value {
    /// True for the zero value of the field's type
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(i) => *i == 0,
            Value::Uint(u) => *u == 0,
            Value::Float(f) => *f == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::Record => false,
        }
    }

    /// True for an absent value or an empty string
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric view of the value
    ///
    /// Strings that parse as numbers are accepted, so a digits-only text
    /// field can carry a range rule.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Uint(u) => Some(*u as f64),
            Value::Float(f) => Some(*f),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Exact numeric view of the value
    ///
    /// Integers stay integers, so comparisons near `u64::MAX` do not round.
    /// Strings are read as integers first, then as finite floats.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(i) => Some(Number::Int(i128::from(*i))),
            Value::Uint(u) => Some(Number::Int(i128::from(*u))),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Record => "record",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::Record => f.write_str("{..}"),
        }
    }
}

/// A number as read from a value or a rule parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(b)),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl FromStr for Number {
    type Err = ValueError;

    /// Parses an integer, or failing that a finite float
    ///
    /// `NaN` and the infinities are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(i) = s.parse::<i128>() {
            return Ok(Number::Int(i));
        }
        match s.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Number::Float(f)),
            _ => Err(ValueError::Parse {
                input: s.to_string(),
                kind: "number",
            }),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Read and write access to one record field
///
/// Implemented for `String`, `bool`, the integer and float primitives, and
/// `Option<T>` of those. Record authors implement it for their own newtypes
/// when a field needs rules.
pub trait FieldValue {
    /// Declared kind of the field
    fn kind(&self) -> ValueKind;

    /// Current content as a snapshot
    fn to_value(&self) -> Value;

    /// Overwrites the field with `value`
    ///
    /// # Errors
    ///
    /// Returns `ValueError` when `value` cannot be represented by the field.
    fn set_value(&mut self, value: Value) -> Result<(), ValueError>;
}

fn mismatch(expected: ValueKind, found: &Value) -> ValueError {
    ValueError::TypeMismatch {
        expected: expected.as_str(),
        found: found.type_name(),
    }
}

impl FieldValue for String {
    fn kind(&self) -> ValueKind {
        ValueKind::Str
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn set_value(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Str(s) => {
                *self = s;
                Ok(())
            }
            other => Err(mismatch(ValueKind::Str, &other)),
        }
    }
}

impl FieldValue for bool {
    fn kind(&self) -> ValueKind {
        ValueKind::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn set_value(&mut self, value: Value) -> Result<(), ValueError> {
        match value {
            Value::Bool(b) => {
                *self = b;
                Ok(())
            }
            other => Err(mismatch(ValueKind::Bool, &other)),
        }
    }
}

macro_rules! impl_integer {
    ($kind:expr, $variant:ident, $wide:ty; $($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn kind(&self) -> ValueKind {
                    $kind
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self as $wide)
                }

                fn set_value(&mut self, value: Value) -> Result<(), ValueError> {
                    let converted = match &value {
                        Value::Int(i) => <$ty>::try_from(*i).ok(),
                        Value::Uint(u) => <$ty>::try_from(*u).ok(),
                        other => return Err(mismatch($kind, other)),
                    };
                    *self = converted.ok_or_else(|| ValueError::OutOfRange(value.to_string()))?;
                    Ok(())
                }
            }
        )*
    };
}

impl_integer!(ValueKind::Int, Int, i64; i8, i16, i32, i64, isize);
impl_integer!(ValueKind::Uint, Uint, u64; u8, u16, u32, u64, usize);

macro_rules! impl_float {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn kind(&self) -> ValueKind {
                    ValueKind::Float
                }

                fn to_value(&self) -> Value {
                    Value::Float(*self as f64)
                }

                fn set_value(&mut self, value: Value) -> Result<(), ValueError> {
                    *self = match value {
                        Value::Float(f) => f as $ty,
                        Value::Int(i) => i as $ty,
                        Value::Uint(u) => u as $ty,
                        other => return Err(mismatch(ValueKind::Float, &other)),
                    };
                    Ok(())
                }
            }
        )*
    };
}

impl_float!(f32, f64);

impl<T: FieldValue + Default> FieldValue for Option<T> {
    fn kind(&self) -> ValueKind {
        match self {
            Some(inner) => inner.kind(),
            None => T::default().kind(),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn set_value(&mut self, value: Value) -> Result<(), ValueError> {
        if value == Value::Null {
            *self = None;
            return Ok(());
        }
        let mut inner = T::default();
        inner.set_value(value)?;
        *self = Some(inner);
        Ok(())
    }
}
