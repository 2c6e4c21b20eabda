#![forbid(unsafe_code)]

//! Validation engine for running field rules against records
//!
//! This module provides the `Validator`, which walks a record's schema,
//! resolves each field's rule expression and runs the resulting checkers.
//!
//! Execution order is fixed:
//! - fields run in declaration order
//! - a nested record is walked depth-first before its own field's rules
//! - invocations in one expression run left-to-right as written, so a
//!   clipper affects every checker written after it on the same field

use crate::config::ValidatorConfig;
use crate::engine::parser::{Invocation, parse_expression};
use crate::engine::resolver::{self, Resolver};
use crate::error::{ConfigError, ErrorKind, FieldError, RuleError, ValidationErrors};
use crate::rules::{CheckFailure, Checker, Registry};
use crate::schema::{FieldSpec, Record, Schema, Slot};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::ControlFlow;
use std::sync::Arc;

/// Error aggregation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Run every invocation on every field and report all failures
    #[default]
    CollectAll,
    /// Stop at the first failure of any kind
    FailFast,
}

/// Validation engine
///
/// The engine:
/// - Resolves rule names through an ordered resolver pipeline
/// - Falls back to record methods registered on the schema
/// - Reports unresolved rules separately from invalid data
/// - Validates independent records in parallel with `verify_all`
pub struct Validator {
    resolvers: Vec<Box<dyn Resolver>>,
    mode: Mode,
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolvers: Vec<&str> = self.resolvers.iter().map(|r| r.name()).collect();
        f.debug_struct("Validator")
            .field("resolvers", &resolvers)
            .field("mode", &self.mode)
            .finish()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Creates a collect-all validator backed by the global registry
    pub fn new() -> Self {
        Self::with_registry(Registry::global())
    }

    /// Creates a collect-all validator backed by the given registry
    pub fn with_registry(registry: Arc<Registry>) -> Self {
        Self {
            resolvers: resolver::default_pipeline(registry),
            mode: Mode::default(),
        }
    }

    /// Creates a validator from configuration
    ///
    /// Configured pattern rules are registered in the global registry.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a configured pattern cannot be compiled.
    pub fn from_config(config: &ValidatorConfig) -> Result<Self, ConfigError> {
        let registry = Registry::global();
        config.register_patterns(&registry)?;
        Ok(Self::with_registry(registry).mode(config.validator.mode))
    }

    /// Sets the aggregation mode
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for `mode(Mode::FailFast)`
    pub fn fail_fast(self) -> Self {
        self.mode(Mode::FailFast)
    }

    /// Appends a resolver after the default pipeline
    ///
    /// Appended resolvers are consulted before record methods.
    pub fn resolver(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn current_mode(&self) -> Mode {
        self.mode
    }

    /// Validate one record
    ///
    /// Clippers may rewrite fields of `record` in place.
    ///
    /// # Errors
    ///
    /// Returns every failure in collect-all mode, or only the first one in
    /// fail-fast mode.
    pub fn verify<R: Record>(&self, record: &mut R) -> Result<(), ValidationErrors> {
        let mut run = Run {
            resolvers: &self.resolvers,
            mode: self.mode,
            path: Vec::new(),
            errors: Vec::new(),
        };
        let _ = run.walk_record(record);

        match ValidationErrors::from_vec(run.errors) {
            None => Ok(()),
            Some(errors) => Err(errors),
        }
    }

    /// Validate independent records in parallel
    ///
    /// Results are returned in input order, one per record.
    pub fn verify_all<R: Record + Send>(
        &self,
        records: &mut [R],
    ) -> Vec<Result<(), ValidationErrors>> {
        records
            .par_iter_mut()
            .map(|record| self.verify(record))
            .collect()
    }
}

/// State of one validation call
pub(crate) struct Run<'v> {
    resolvers: &'v [Box<dyn Resolver>],
    mode: Mode,
    path: Vec<&'static str>,
    errors: Vec<FieldError>,
}

impl Run<'_> {
    pub(crate) fn walk_record<R: Record>(&mut self, record: &mut R) -> ControlFlow<()> {
        let schema = R::schema();

        for field in schema.fields() {
            if let Slot::Nested(Some(nested)) = field.slot(record) {
                self.path.push(field.name());
                let flow = nested.walk(self);
                self.path.pop();
                flow?;
            }

            let Some(invocations) = parse_expression(field.rules()) else {
                continue;
            };

            for inv in &invocations {
                self.run_invocation(record, schema, field, inv)?;
            }
        }

        ControlFlow::Continue(())
    }

    fn run_invocation<R: Record>(
        &mut self,
        record: &mut R,
        schema: &Schema<R>,
        field: &FieldSpec<R>,
        inv: &Invocation,
    ) -> ControlFlow<()> {
        tracing::trace!(field = field.name(), rule = inv.name(), "running rule");

        let outcome = match resolver::resolve(self.resolvers, inv) {
            Some(Ok(checker)) => execute(checker, field.slot(record)),
            Some(Err(e)) => Err((ErrorKind::Malformed, e.to_string())),
            None => match schema.method(inv.name()) {
                Some(method) => method(record).map_err(|message| (ErrorKind::Invalid, message)),
                None => {
                    tracing::debug!(field = field.name(), rule = inv.name(), "unresolved rule");
                    Err((
                        ErrorKind::Unresolved,
                        RuleError::Unknown(inv.name().to_string()).to_string(),
                    ))
                }
            },
        };

        let Err((kind, message)) = outcome else {
            return ControlFlow::Continue(());
        };

        let value = field.slot(record).value().to_string();
        self.errors.push(FieldError {
            field: self.field_path(field.name()),
            value,
            rule: inv.name().to_string(),
            kind,
            message,
        });

        match self.mode {
            Mode::FailFast => ControlFlow::Break(()),
            Mode::CollectAll => ControlFlow::Continue(()),
        }
    }

    fn field_path(&self, name: &str) -> String {
        let mut path = self.path.join(".");
        if !path.is_empty() {
            path.push('.');
        }
        path.push_str(name);
        path
    }
}

/// Run one resolved checker against a field
fn execute(checker: Checker, slot: Slot<'_>) -> Result<(), (ErrorKind, String)> {
    match checker {
        Checker::Check(check) => check.check(&slot.value()).map_err(|failure| match failure {
            CheckFailure::Invalid(message) => (ErrorKind::Invalid, message),
            CheckFailure::Malformed(message) => (ErrorKind::Malformed, message),
        }),
        Checker::Clip(clip) => match slot {
            Slot::Mutable(target) => clip
                .clip(target)
                .map_err(|e| (ErrorKind::Malformed, e.to_string())),
            Slot::ReadOnly(_) | Slot::Nested(_) => Ok(()),
        },
    }
}
