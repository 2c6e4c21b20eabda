#![forbid(unsafe_code)]

//! Regex-based rules
//!
//! This module provides `PatternRule`, which matches a field's stringified
//! value against a regular expression, and `RuleTable`, the static set of
//! well-known pattern rules (`email`, `mobile`, `time`, ...).

use crate::error::RuleError;
use crate::rules::{Check, CheckFailure};
use crate::types::Value;
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Whether a value must match the pattern or must stay clear of it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Match,
    Reject,
}

/// A rule that checks a value against a compiled regular expression
///
/// Empty values pass: absence is the business of `require`. Cloning is
/// cheap, the compiled program is shared.
#[derive(Clone)]
pub struct PatternRule {
    name: String,
    pattern: Regex,
    polarity: Polarity,
    message: String,
}

impl std::fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("polarity", &self.polarity)
            .field("message", &self.message)
            .finish()
    }
}

impl PatternRule {
    /// Compile a pattern rule
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidRegex` if the pattern does not compile.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        polarity: Polarity,
        message: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let name = name.into();
        let pattern = Regex::new(pattern).map_err(|e| {
            RuleError::InvalidRegex(format!(
                "Failed to compile pattern '{}' for rule '{}': {}",
                pattern, name, e
            ))
        })?;

        Ok(PatternRule {
            name,
            pattern,
            polarity,
            message: message.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True if `text` satisfies the rule
    pub fn accepts(&self, text: &str) -> bool {
        let matched = self.pattern.is_match(text);
        match self.polarity {
            Polarity::Match => matched,
            Polarity::Reject => !matched,
        }
    }
}

impl Check for PatternRule {
    fn check(&self, value: &Value) -> Result<(), CheckFailure> {
        if value.is_empty() {
            return Ok(());
        }
        if self.accepts(&value.to_string()) {
            Ok(())
        } else {
            Err(CheckFailure::invalid(self.message.clone()))
        }
    }
}

/// Built-in pattern definitions: name, pattern, polarity, message
const BUILTIN_PATTERNS: &[(&str, &str, Polarity, &str)] = &[
    (
        "email",
        r"^\w+([-+.]\w+)*@\w+([-.]\w+)*\.\w+([-.]\w+)*$",
        Polarity::Match,
        "must be a valid email address",
    ),
    (
        "url",
        r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s]+$",
        Polarity::Match,
        "must be a valid URL",
    ),
    (
        "ip",
        r"^((2[0-4]\d|25[0-5]|[01]?\d\d?)\.){3}(2[0-4]\d|25[0-5]|[01]?\d\d?)$",
        Polarity::Match,
        "must be a valid IPv4 address",
    ),
    (
        "chinese",
        r"^[\x{4e00}-\x{9fa5}]+$",
        Polarity::Match,
        "must contain only Chinese characters",
    ),
    (
        "mobile",
        r"^((\(\d{2,3}\))|(\d{3}-))?1[3-9]\d{9}$",
        Polarity::Match,
        "must be a valid mobile number",
    ),
    (
        "qq",
        r"^[1-9][0-9]{4,}$",
        Polarity::Match,
        "must be a valid QQ number",
    ),
    (
        "account",
        r"^[a-zA-Z][a-zA-Z0-9_]{1,20}$",
        Polarity::Match,
        "must start with a letter and contain only letters, digits and underscores",
    ),
    (
        "chars",
        r"^[a-zA-Z0-9_,\x{4e00}-\x{9fa5}%|-]{1,200}$",
        Polarity::Match,
        "contains characters that are not allowed",
    ),
    (
        "app_id",
        r"^[a-zA-Z0-9_]+\.[a-zA-Z0-9_]+\.[a-zA-Z0-9_]+$",
        Polarity::Match,
        "must be a dotted identifier like a.b.c",
    ),
    ("int", r"^\d+$", Polarity::Match, "must be an integer"),
    (
        "time",
        r"^[0-9]{4}-[0-9]{2}-[0-9]{1,2}\s+[0-9]{1,2}:[0-9]{1,2}:[0-9]{1,2}$",
        Polarity::Match,
        "must be a date-time like 2006-01-02 15:04:05",
    ),
    (
        "sql",
        r"(?i)(')|(--)|(/\*(?s:.)*?\*/)|\b(select|update|and|or|delete|insert|truncate|char|chr|into|substr|ascii|declare|exec|count|master|drop|execute)\b",
        Polarity::Reject,
        "must not contain SQL keywords or comment markers",
    ),
];

/// Static table of well-known pattern rules
///
/// Compiled once on first use and read-only afterwards.
#[derive(Debug)]
pub struct RuleTable {
    rules: HashMap<&'static str, PatternRule>,
}

static BUILTIN_TABLE: LazyLock<RuleTable> = LazyLock::new(RuleTable::compile);

impl RuleTable {
    /// The process-wide table of built-in pattern rules
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN_TABLE
    }

    fn compile() -> Self {
        let mut rules = HashMap::with_capacity(BUILTIN_PATTERNS.len());
        for (name, pattern, polarity, message) in BUILTIN_PATTERNS {
            match PatternRule::new(*name, pattern, *polarity, *message) {
                Ok(rule) => {
                    rules.insert(*name, rule);
                }
                Err(e) => tracing::error!(rule = *name, error = %e, "skipping built-in pattern"),
            }
        }
        RuleTable { rules }
    }

    /// Get a pattern rule by name
    pub fn get(&self, name: &str) -> Option<&PatternRule> {
        self.rules.get(name)
    }

    /// Rule names in the table, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.rules.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
