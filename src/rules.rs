#![forbid(unsafe_code)]

//! Checker definitions, built-in rules and the user registry

pub mod builtin;
mod checker;
pub mod regex_rule;
pub mod registry;

// Re-export core types
pub use checker::{Check, CheckFailure, Checker, CheckerFactory, Clip};
pub use regex_rule::{PatternRule, Polarity, RuleTable};
pub use registry::Registry;
