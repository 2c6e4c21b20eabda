#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line in a deterministic order:
//! 1. All error records, in the order the engine reported them
//! 2. One status record

use crate::error::{ErrorKind, ValidationErrors};
use serde::Serialize;

/// JSONL output formatter
pub struct JsonlFormatter;

impl JsonlFormatter {
    /// Creates a new JsonlFormatter
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Format a validation outcome as JSONL
    pub fn format(&self, result: &Result<(), ValidationErrors>) -> String {
        let mut output = String::new();

        let errors: Vec<_> = match result {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().collect(),
        };

        for error in &errors {
            let record = ErrorRecord {
                record_type: "error",
                field: &error.field,
                rule: &error.rule,
                kind: error.kind,
                value: &error.value,
                message: &error.message,
            };
            if let Ok(json) = serde_json::to_string(&record) {
                output.push_str(&json);
                output.push('\n');
            }
        }

        let count = |kind: ErrorKind| errors.iter().filter(|e| e.kind == kind).count() as u64;
        let status = StatusRecord {
            record_type: "status",
            passed: errors.is_empty(),
            total_errors: errors.len() as u64,
            invalid: count(ErrorKind::Invalid),
            unresolved: count(ErrorKind::Unresolved),
            malformed: count(ErrorKind::Malformed),
        };

        if let Ok(json) = serde_json::to_string(&status) {
            output.push_str(&json);
            output.push('\n');
        }

        output
    }
}

impl Default for JsonlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Error record for JSONL output
#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    field: &'a str,
    rule: &'a str,
    kind: ErrorKind,
    value: &'a str,
    message: &'a str,
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    passed: bool,
    total_errors: u64,
    invalid: u64,
    unresolved: u64,
    malformed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    fn create_test_error(field: &str, rule: &str, kind: ErrorKind) -> FieldError {
        FieldError {
            field: field.to_string(),
            value: "v".to_string(),
            rule: rule.to_string(),
            kind,
            message: "failed".to_string(),
        }
    }

    #[test]
    fn test_format_passed() {
        let output = JsonlFormatter::new().format(&Ok(()));
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 1);

        let status: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(status["type"], "status");
        assert_eq!(status["passed"], true);
        assert_eq!(status["total_errors"], 0);
    }

    #[test]
    fn test_format_errors_then_status() {
        let errors = ValidationErrors::from_vec(vec![
            create_test_error("name", "require", ErrorKind::Invalid),
            create_test_error("age", "fooRule", ErrorKind::Unresolved),
        ])
        .unwrap();

        let output = JsonlFormatter::default().format(&Err(errors));
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["type"], "error");
        assert_eq!(lines[0]["field"], "name");
        assert_eq!(lines[0]["kind"], "invalid");
        assert_eq!(lines[1]["rule"], "fooRule");
        assert_eq!(lines[1]["kind"], "unresolved");
        assert_eq!(lines[2]["type"], "status");
        assert_eq!(lines[2]["passed"], false);
        assert_eq!(lines[2]["invalid"], 1);
        assert_eq!(lines[2]["unresolved"], 1);
        assert_eq!(lines[2]["malformed"], 0);
    }
}
