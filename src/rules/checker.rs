#![forbid(unsafe_code)]

//! Core checker traits and related types for executing rules

use crate::engine::parser::Invocation;
use crate::error::{RuleError, ValueError};
use crate::types::{FieldValue, Value};
use std::fmt;
use std::sync::Arc;

/// Why a read-only checker rejected a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// The value violates the rule
    Invalid(String),

    /// The checker could not interpret its own parameters
    Malformed(String),
}

impl CheckFailure {
    pub fn invalid(message: impl Into<String>) -> Self {
        CheckFailure::Invalid(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            CheckFailure::Invalid(m) | CheckFailure::Malformed(m) => m,
        }
    }
}

/// A read-only checker
///
/// Checkers are pure functions of the value they are handed. A normal
/// validation failure is a returned `CheckFailure`, never a panic.
pub trait Check: Send + Sync {
    fn check(&self, value: &Value) -> Result<(), CheckFailure>;
}

/// A mutating checker ("clipper")
///
/// Clippers rewrite the field in place and always succeed as far as the
/// data is concerned. The only reportable error is an internal one, such
/// as a default value that cannot be parsed into the field's kind.
pub trait Clip: Send + Sync {
    fn clip(&self, slot: &mut dyn FieldValue) -> Result<(), ValueError>;
}

impl<F> Check for F
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync,
{
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        self(value).map_err(CheckFailure::Invalid)
    }
}

/// A resolved checker bound to one invocation
///
/// A checker lives exactly as long as the invocation it was built for.
pub enum Checker {
    Check(Box<dyn Check>),
    Clip(Box<dyn Clip>),
}

impl Checker {
    pub fn check(check: impl Check + 'static) -> Self {
        Checker::Check(Box::new(check))
    }

    pub fn clip(clip: impl Clip + 'static) -> Self {
        Checker::Clip(Box::new(clip))
    }

    pub fn is_clipper(&self) -> bool {
        matches!(self, Checker::Clip(_))
    }
}

impl fmt::Debug for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checker::Check(_) => f.write_str("Checker::Check(..)"),
            Checker::Clip(_) => f.write_str("Checker::Clip(..)"),
        }
    }
}

/// Factory turning an invocation into a checker
pub type CheckerFactory = Arc<dyn Fn(&Invocation) -> Result<Checker, RuleError> + Send + Sync>;
