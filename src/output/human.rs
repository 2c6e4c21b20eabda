#![forbid(unsafe_code)]

//! Human-readable output formatter

use crate::error::{ErrorKind, ValidationErrors};
use std::fmt::Write;

/// Plain-text formatter, one line per error plus a summary
pub struct HumanFormatter;

impl HumanFormatter {
    pub fn new() -> Self {
        HumanFormatter
    }

    pub fn format(&self, result: &Result<(), ValidationErrors>) -> String {
        let errors = match result {
            Ok(()) => return "ok: no violations\n".to_string(),
            Err(errors) => errors,
        };

        let mut output = String::new();
        for error in errors {
            let tag = match error.kind {
                ErrorKind::Invalid => "",
                ErrorKind::Unresolved => " [unresolved]",
                ErrorKind::Malformed => " [malformed]",
            };
            let _ = writeln!(
                output,
                "{}: {} ({}, value \"{}\"){}",
                error.field, error.message, error.rule, error.value, tag
            );
        }

        let rule_errors = errors.iter().filter(|e| e.is_rule_error()).count();
        let _ = write!(output, "{} violation(s)", errors.len());
        if rule_errors > 0 {
            let _ = write!(output, ", {} rule(s) could not be evaluated", rule_errors);
        }
        output.push('\n');

        output
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}
