#![forbid(unsafe_code)]

//! Checker registry for user-defined rules
//!
//! The Registry is responsible for:
//! - Storing user checker factories by rule name
//! - Overwriting an entry when a name is registered again (last writer wins)
//! - Serving lookups to concurrent validations
//!
//! A process-wide instance is available through `Registry::global()` and the
//! free functions in the crate root. Validators can also be handed their own
//! instance to avoid shared state.

use crate::engine::parser::Invocation;
use crate::error::{RuleError, ValueError};
use crate::rules::{Checker, CheckerFactory, Clip};
use crate::types::{FieldValue, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(|| Arc::new(Registry::new()));

/// Registry mapping rule names to checker factories
///
/// Lookups take a read lock and clone the factory handle, so a checker never
/// runs while the lock is held. Registration takes the write lock; a reader
/// sees an entry either fully or not at all.
#[derive(Default)]
pub struct Registry {
    checkers: RwLock<HashMap<String, CheckerFactory>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("checkers", &self.names())
            .finish()
    }
}

impl Registry {
    /// Create a new empty Registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    /// Register a checker factory under `name`
    ///
    /// Registering an existing name replaces the previous factory. This is
    /// the supported way to override a rule, including the built-ins.
    pub fn register<F>(&self, name: impl Into<String>, factory: F)
    where
        F: Fn(&Invocation) -> Result<Checker, RuleError> + Send + Sync + 'static,
    {
        let name = name.into();
        let previous = self.checkers.write().insert(name.clone(), Arc::new(factory));
        if previous.is_some() {
            tracing::debug!(rule = %name, "replaced registered checker");
        } else {
            tracing::debug!(rule = %name, "registered checker");
        }
    }

    /// Register a read-only checker from a closure
    ///
    /// The closure receives the value snapshot and returns `Err(message)`
    /// on a validation failure. Invocation parameters are ignored.
    pub fn register_fn<F>(&self, name: impl Into<String>, check: F)
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        let check = Arc::new(check);
        self.register(name, move |_: &Invocation| {
            let check = Arc::clone(&check);
            Ok(Checker::check(move |value: &Value| (*check)(value)))
        });
    }

    /// Register a clipper from a closure
    pub fn register_clip<F>(&self, name: impl Into<String>, clip: F)
    where
        F: Fn(&mut dyn FieldValue) -> Result<(), ValueError> + Send + Sync + 'static,
    {
        let clip = Arc::new(clip);
        self.register(name, move |_: &Invocation| {
            Ok(Checker::clip(ClipFn(Arc::clone(&clip))))
        });
    }

    /// Get the factory registered under `name`
    pub fn lookup(&self, name: &str) -> Option<CheckerFactory> {
        self.checkers.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checkers.read().contains_key(name)
    }

    /// Registered rule names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.checkers.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.checkers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.read().is_empty()
    }
}

/// Adapter turning a shared closure into a `Clip`
struct ClipFn<F>(Arc<F>);

impl<F> Clip for ClipFn<F>
where
    F: Fn(&mut dyn FieldValue) -> Result<(), ValueError> + Send + Sync,
{
    fn clip(&self, slot: &mut dyn FieldValue) -> Result<(), ValueError> {
        (*self.0)(slot)
    }
}
