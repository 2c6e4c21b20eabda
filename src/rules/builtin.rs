#![forbid(unsafe_code)]

//! Built-in parametrized checkers
//!
//! These rules read their parameters from the invocation: presence,
//! numeric range, string length, enum membership, and the two clippers
//! that inject defaults and trim whitespace.

use crate::engine::parser::{Bounds, Invocation};
use crate::error::{RuleError, ValueError};
use crate::rules::{Check, CheckFailure, Checker, Clip};
use crate::types::{FieldValue, Number, Value};

/// Constructor for a built-in checker
type BuiltinConstructor = fn(&Invocation) -> Result<Checker, RuleError>;

/// Built-in rule names and their constructors
const BUILTIN_CHECKERS: &[(&str, BuiltinConstructor)] = &[
    ("require", |_| Ok(Checker::check(Require))),
    ("number", |inv| Ok(Checker::check(NumberRange::from_invocation(inv)?))),
    ("string", |inv| Ok(Checker::check(StringLength::from_invocation(inv)?))),
    ("enum", |inv| Ok(Checker::check(OneOf::from_invocation(inv)?))),
    ("default", |inv| Ok(Checker::clip(DefaultValue::from_invocation(inv)?))),
    ("trim", |_| Ok(Checker::clip(TrimSpace))),
    ("trimSpace", |_| Ok(Checker::clip(TrimSpace))),
];

/// Builds the built-in checker named by the invocation
///
/// Returns `None` if the name is not a built-in rule.
pub fn resolve(inv: &Invocation) -> Option<Result<Checker, RuleError>> {
    BUILTIN_CHECKERS
        .iter()
        .find(|(name, _)| *name == inv.name())
        .map(|(_, constructor)| constructor(inv))
}

/// Names of all built-in rules
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN_CHECKERS.iter().map(|(name, _)| *name)
}

/// Rejects absent values and empty strings
#[derive(Debug, Clone, Copy)]
pub struct Require;

impl Check for Require {
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        if value.is_empty() {
            Err(CheckFailure::invalid("must not be empty"))
        } else {
            Ok(())
        }
    }
}

/// Numeric range: `number,min=A,max=B`
///
/// Integer values are compared exactly against integer bounds; floats and
/// fractional bounds compare as `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberRange {
    pub min: Number,
    pub max: Option<Number>,
}

impl NumberRange {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, RuleError> {
        Ok(Self::from_bounds(inv.bounds()?))
    }

    pub fn from_bounds(bounds: Bounds<Number>) -> Self {
        Self {
            min: bounds.min.unwrap_or(Number::Int(0)),
            max: bounds.effective_max(Number::Int(0)),
        }
    }
}

impl Check for NumberRange {
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        let Some(n) = value.as_number() else {
            return Err(CheckFailure::invalid("must be a number"));
        };

        if n < self.min {
            return Err(CheckFailure::invalid(format!(
                "must be at least {}",
                self.min
            )));
        }

        if let Some(max) = self.max
            && n > max
        {
            return Err(CheckFailure::invalid(format!("must be at most {}", max)));
        }

        Ok(())
    }
}

/// String length: `string,min=A,max=B`
///
/// Length is counted in Unicode scalar values (`chars`), not bytes, and
/// must be strictly greater than `min`. An empty string fails on its own
/// account, whatever `min` is. Bounds may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringLength {
    pub min: i64,
    pub max: Option<i64>,
}

impl StringLength {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, RuleError> {
        let bounds: Bounds<i64> = inv.bounds()?;
        Ok(Self {
            min: bounds.min.unwrap_or(0),
            max: bounds.effective_max(0),
        })
    }
}

impl Check for StringLength {
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        let s = match value {
            Value::Str(s) => s,
            Value::Null => return Err(CheckFailure::invalid("must not be empty")),
            _ => return Err(CheckFailure::invalid("must be a string")),
        };

        let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
        if len == 0 {
            return Err(CheckFailure::invalid("must not be empty"));
        }

        if len <= self.min {
            return Err(CheckFailure::invalid(format!(
                "is too short: must be longer than {} characters",
                self.min
            )));
        }

        if let Some(max) = self.max
            && len > max
        {
            return Err(CheckFailure::invalid(format!(
                "is too long: must be at most {} characters",
                max
            )));
        }

        Ok(())
    }
}

/// Enum membership: `enum=a,b,c`
///
/// Absence is not a membership violation, so empty values pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf {
    pub allowed: Vec<String>,
}

impl OneOf {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, RuleError> {
        let allowed: Vec<String> = inv.list().into_iter().map(str::to_string).collect();
        if allowed.is_empty() {
            return Err(RuleError::InvalidParam {
                rule: inv.name().to_string(),
                message: "expected at least one allowed value".to_string(),
            });
        }
        Ok(Self { allowed })
    }
}

impl Check for OneOf {
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        if value.is_empty() {
            return Ok(());
        }

        let actual = value.to_string();
        if self.allowed.iter().any(|allowed| *allowed == actual) {
            Ok(())
        } else {
            Err(CheckFailure::invalid(format!(
                "must be one of [{}]",
                self.allowed.join(", ")
            )))
        }
    }
}

/// Default injection clipper: `default=X`
///
/// Writes `X`, parsed into the field's kind, when the field holds its zero
/// value. Fields that already hold something are left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultValue {
    pub raw: String,
}

impl DefaultValue {
    pub fn from_invocation(inv: &Invocation) -> Result<Self, RuleError> {
        if inv.params().is_empty() {
            return Err(RuleError::InvalidParam {
                rule: inv.name().to_string(),
                message: "expected a default value".to_string(),
            });
        }
        Ok(Self {
            raw: inv.params().to_string(),
        })
    }
}

impl Clip for DefaultValue {
    fn clip(&self, slot: &mut dyn FieldValue) -> Result<(), ValueError> {
        if !slot.to_value().is_zero() {
            return Ok(());
        }
        let value = slot.kind().parse(&self.raw)?;
        slot.set_value(value)
    }
}

/// Whitespace trimming clipper: `trim` / `trimSpace`
///
/// Non-string fields are left untouched.
#[derive(Debug, Clone, Copy)]
pub struct TrimSpace;

impl Clip for TrimSpace {
    fn clip(&self, slot: &mut dyn FieldValue) -> Result<(), ValueError> {
        if let Value::Str(s) = slot.to_value() {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                slot.set_value(Value::Str(trimmed.to_string()))?;
            }
        }
        Ok(())
    }
}
