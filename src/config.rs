//! Configuration file parsing and validation

pub mod validator_toml;

pub use validator_toml::{PatternDefinition, ValidatorConfig, ValidatorSection};
