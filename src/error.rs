//! Error types for fieldrules
//!
//! This module defines the error types used throughout fieldrules, following
//! a hierarchical structure: component errors for rule resolution, field
//! value access and configuration, plus the report types returned by a
//! validation run.

use serde::Serialize;
use std::fmt;

/// Rule resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// No resolver knows the rule name
    #[error("Unknown rule: {0}")]
    Unknown(String),

    /// Rule parameters could not be interpreted
    #[error("Invalid parameter for rule '{rule}': {message}")]
    InvalidParam { rule: String, message: String },

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(String),
}

/// Errors raised when reading or writing a field value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
    /// The value kind does not fit the field
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The value does not fit into the field's numeric range
    #[error("Value {0} is out of range for the field type")]
    OutOfRange(String),

    /// A textual value could not be parsed into the field's kind
    #[error("Cannot parse '{input}' as {kind}")]
    Parse { input: String, kind: &'static str },
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration syntax
    #[error("Invalid configuration syntax: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration parsed but is not usable
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// A configured rule could not be built
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),
}

/// What went wrong with a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// A checker ran and the value violates its constraint
    Invalid,
    /// No checker could be resolved for the rule name
    Unresolved,
    /// The checker could not interpret its parameters
    Malformed,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Invalid => "invalid",
            ErrorKind::Unresolved => "unresolved",
            ErrorKind::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// A single failure reported for one field
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{field}: {message}")]
pub struct FieldError {
    /// Dotted path of the field (`address.city` for nested records)
    pub field: String,

    /// Stringified snapshot of the value when the rule ran
    pub value: String,

    /// Name of the rule that produced this error
    pub rule: String,

    /// Failure category
    pub kind: ErrorKind,

    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    /// True when the data itself violated a constraint
    pub fn is_invalid(&self) -> bool {
        self.kind == ErrorKind::Invalid
    }

    /// True when the rule could not be evaluated at all
    pub fn is_rule_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Unresolved | ErrorKind::Malformed)
    }
}

/// All failures from one validation run, in the order they were found
///
/// Never empty: a clean run returns `Ok(())` instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub(crate) fn from_vec(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(ValidationErrors(errors))
        }
    }

    /// The first failure encountered
    pub fn first(&self) -> &FieldError {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A set returned by `verify` always holds at least one failure
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Failures attributed to the given field path
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.0.iter().filter(move |e| e.field == field)
    }

    /// Number of failures of the given kind
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.0.iter().filter(|e| e.kind == kind).count()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
