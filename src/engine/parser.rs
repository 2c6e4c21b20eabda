#![forbid(unsafe_code)]

//! Rule expression parsing
//!
//! A rule expression is a chain of invocations separated by `|`. Each
//! invocation is a rule name followed by an optional parameter blob:
//!
//! ```text
//! string,min=2,max=5|require
//! enum=1,2,3
//! default=18|number,min=18
//! ```
//!
//! Parameter interpretation is left to the checker that receives the
//! invocation, since rules read their parameters differently.

use crate::error::RuleError;
use std::str::FromStr;

/// Expression value meaning "do not validate this field"
pub const SKIP: &str = "-";

/// Separator between chained invocations
pub const CHAIN_DELIMITER: char = '|';

/// One rule invocation from a rule expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    name: String,
    params: String,
}

impl Invocation {
    pub fn new(name: impl Into<String>, params: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: params.into(),
        }
    }

    /// Parses a single segment of a rule expression
    ///
    /// The rule name ends at the first `,`. When the head before that comma
    /// contains `=`, the name ends at the `=` instead and everything after it
    /// is the parameter blob, so `enum=1,2,3` names rule `enum`.
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        let head_end = segment.find(',').unwrap_or(segment.len());

        let (name, params) = match segment[..head_end].find('=') {
            Some(eq) => (&segment[..eq], &segment[eq + 1..]),
            None if head_end < segment.len() => (&segment[..head_end], &segment[head_end + 1..]),
            None => (segment, ""),
        };

        Self::new(name.trim(), params.trim())
    }

    /// The rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw parameter blob, possibly empty
    pub fn params(&self) -> &str {
        &self.params
    }

    /// Parameters as a plain comma list
    pub fn list(&self) -> Vec<&str> {
        self.params
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    }

    /// Value of a `key=value` parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.split(',').find_map(|item| {
            let (k, v) = item.split_once('=')?;
            (k.trim() == key).then(|| v.trim())
        })
    }

    /// Parses `min=` and `max=` parameters
    ///
    /// Keys may appear in any order and unknown keys are ignored. A missing
    /// `min` is left unset and a missing `max` means no upper bound.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::InvalidParam` if a bound is present but not a
    /// valid `T`.
    pub fn bounds<T: FromStr>(&self) -> Result<Bounds<T>, RuleError> {
        Ok(Bounds {
            min: self.parse_param("min")?,
            max: self.parse_param("max")?,
        })
    }

    fn parse_param<T: FromStr>(&self, key: &str) -> Result<Option<T>, RuleError> {
        match self.param(key) {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| RuleError::InvalidParam {
                rule: self.name.clone(),
                message: format!("{} must be a number, got '{}'", key, raw),
            }),
        }
    }
}

/// Optional lower and upper bounds read from `min=` / `max=`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    /// The upper bound, if one applies
    ///
    /// A `max` below `min` is treated as "no upper bound", so
    /// `min=5,max=0` only enforces the lower bound.
    pub fn effective_max(&self, default_min: T) -> Option<T> {
        let min = self.min.unwrap_or(default_min);
        self.max.filter(|max| *max >= min)
    }
}

/// Splits a rule expression into invocations
///
/// Returns `None` when the field should be skipped: an empty expression or
/// the `-` sentinel. Empty segments (`a||b`) are dropped.
pub fn parse_expression(expr: &str) -> Option<Vec<Invocation>> {
    let expr = expr.trim();
    if expr.is_empty() || expr == SKIP {
        return None;
    }

    let invocations: Vec<Invocation> = expr
        .split(CHAIN_DELIMITER)
        .filter(|segment| !segment.trim().is_empty())
        .map(Invocation::parse)
        .collect();

    if invocations.is_empty() {
        None
    } else {
        Some(invocations)
    }
}
