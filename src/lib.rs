#![forbid(unsafe_code)]

//! fieldrules: declarative per-field rule checking for structured records
//!
//! Each field of a record carries a rule expression such as
//! `"trim|string,min=2,max=20"`. The engine resolves every rule name to a
//! checker (user registry, built-ins, pattern table, then record methods),
//! runs them in order and reports every violation.

pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod rules;
pub mod schema;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, ErrorKind, FieldError, RuleError, ValidationErrors, ValueError};

// Re-export core types for convenient access
pub use config::ValidatorConfig;
pub use engine::{Invocation, Mode, Resolver, Validator};
pub use rules::{Check, CheckFailure, Checker, Clip, Registry};
pub use schema::{Record, Schema, SchemaBuilder};
pub use types::{FieldValue, Number, Value, ValueKind};

/// Validate a record in collect-all mode with the global registry
///
/// # Errors
///
/// Returns every failure found, in traversal order.
pub fn verify<R: Record>(record: &mut R) -> Result<(), ValidationErrors> {
    Validator::new().verify(record)
}

/// Register a checker factory in the global registry
///
/// An existing entry under `name` is replaced.
pub fn register<F>(name: impl Into<String>, factory: F)
where
    F: Fn(&Invocation) -> Result<Checker, RuleError> + Send + Sync + 'static,
{
    Registry::global().register(name, factory);
}

/// Register a closure checker in the global registry
pub fn register_fn<F>(name: impl Into<String>, check: F)
where
    F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
{
    Registry::global().register_fn(name, check);
}

/// Register a closure clipper in the global registry
pub fn register_clip<F>(name: impl Into<String>, clip: F)
where
    F: Fn(&mut dyn FieldValue) -> Result<(), ValueError> + Send + Sync + 'static,
{
    Registry::global().register_clip(name, clip);
}
