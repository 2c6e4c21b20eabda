#![forbid(unsafe_code)]

//! Rule resolution strategies
//!
//! A rule name is resolved by trying each `Resolver` in order until one
//! claims it. The default pipeline is:
//!
//! 1. the user registry (so registrations shadow everything below)
//! 2. the built-in parametrized checkers (`require`, `number`, `string`, ...)
//! 3. the static pattern table (`email`, `mobile`, `time`, ...)
//!
//! Record methods registered on the schema are the final step; the engine
//! consults them itself since they need the record.

use crate::engine::parser::Invocation;
use crate::error::RuleError;
use crate::rules::{Checker, Registry, RuleTable, builtin};
use std::sync::Arc;

/// One step of the resolution pipeline
pub trait Resolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Build a checker for the invocation
    ///
    /// Returns `None` if this resolver does not know the rule name, and
    /// `Some(Err(_))` if it does but the parameters are unusable.
    fn resolve(&self, inv: &Invocation) -> Option<Result<Checker, RuleError>>;
}

/// Resolves names registered by the host application
#[derive(Debug, Clone)]
pub struct RegistryResolver {
    registry: Arc<Registry>,
}

impl RegistryResolver {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }
}

impl Resolver for RegistryResolver {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn resolve(&self, inv: &Invocation) -> Option<Result<Checker, RuleError>> {
        let factory = self.registry.lookup(inv.name())?;
        Some(factory(inv))
    }
}

/// Resolves the built-in parametrized checkers
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinResolver;

impl Resolver for BuiltinResolver {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn resolve(&self, inv: &Invocation) -> Option<Result<Checker, RuleError>> {
        builtin::resolve(inv)
    }
}

/// Resolves names from the static pattern table
#[derive(Debug, Clone, Copy)]
pub struct RuleTableResolver {
    table: &'static RuleTable,
}

impl RuleTableResolver {
    pub fn new(table: &'static RuleTable) -> Self {
        Self { table }
    }
}

impl Default for RuleTableResolver {
    fn default() -> Self {
        Self::new(RuleTable::builtin())
    }
}

impl Resolver for RuleTableResolver {
    fn name(&self) -> &'static str {
        "rule-table"
    }

    fn resolve(&self, inv: &Invocation) -> Option<Result<Checker, RuleError>> {
        let rule = self.table.get(inv.name())?;
        Some(Ok(Checker::check(rule.clone())))
    }
}

/// The default pipeline: registry, built-ins, pattern table
pub fn default_pipeline(registry: Arc<Registry>) -> Vec<Box<dyn Resolver>> {
    vec![
        Box::new(RegistryResolver::new(registry)),
        Box::new(BuiltinResolver),
        Box::new(RuleTableResolver::default()),
    ]
}

/// Try each resolver in order
pub fn resolve(
    resolvers: &[Box<dyn Resolver>],
    inv: &Invocation,
) -> Option<Result<Checker, RuleError>> {
    resolvers.iter().find_map(|resolver| {
        let resolved = resolver.resolve(inv)?;
        tracing::trace!(rule = inv.name(), resolver = resolver.name(), "resolved rule");
        Some(resolved)
    })
}
