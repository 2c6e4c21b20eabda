//! Parsing and validation for fieldrules.toml configuration files

use crate::engine::executor::Mode;
use crate::engine::parser::Invocation;
use crate::error::ConfigError;
use crate::rules::{Checker, PatternRule, Polarity, Registry, RuleTable, builtin};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Main configuration struct for fieldrules.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Engine settings
    #[serde(default)]
    pub validator: ValidatorSection,

    /// Additional pattern rules, registered as user checkers
    #[serde(default, rename = "pattern")]
    pub patterns: Vec<PatternDefinition>,
}

impl ValidatorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: ValidatorConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();

        for definition in &self.patterns {
            if definition.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "Pattern rule with an empty name".to_string(),
                ));
            }

            if definition.name.contains(['|', ',', '=']) {
                return Err(ConfigError::Validation(format!(
                    "Pattern rule name '{}' must not contain '|', ',' or '='",
                    definition.name
                )));
            }

            if !seen.insert(definition.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "Duplicate pattern rule '{}'",
                    definition.name
                )));
            }

            // Compile once here so a bad pattern fails at load time
            definition.compile()?;
        }

        Ok(())
    }

    /// Register every configured pattern rule in `registry`
    ///
    /// Pattern rules shadow built-in rules of the same name.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Rule` if a pattern does not compile.
    pub fn register_patterns(&self, registry: &Registry) -> Result<(), ConfigError> {
        for definition in &self.patterns {
            let rule = definition.compile()?;
            let name = definition.name.as_str();
            if builtin::names().any(|builtin| builtin == name) || RuleTable::builtin().get(name).is_some() {
                tracing::warn!(rule = name, "configured pattern shadows a built-in rule");
            }
            tracing::debug!(rule = %definition.name, pattern = %definition.pattern, "registering configured pattern");
            registry.register(definition.name.clone(), move |_: &Invocation| {
                Ok(Checker::check(rule.clone()))
            });
        }
        Ok(())
    }
}

/// Engine settings section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidatorSection {
    /// Error aggregation mode
    #[serde(default)]
    pub mode: Mode,
}

/// A pattern rule declared in configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDefinition {
    /// Rule name used in field rule expressions
    pub name: String,

    /// Regular expression
    pub pattern: String,

    /// Failure message
    #[serde(default = "default_message")]
    pub message: String,

    /// When true, a value matching the pattern is rejected
    #[serde(default)]
    pub reject: bool,
}

fn default_message() -> String {
    "does not match the required pattern".to_string()
}

impl PatternDefinition {
    fn compile(&self) -> Result<PatternRule, ConfigError> {
        let polarity = if self.reject {
            Polarity::Reject
        } else {
            Polarity::Match
        };
        Ok(PatternRule::new(
            self.name.clone(),
            &self.pattern,
            polarity,
            self.message.clone(),
        )?)
    }
}
